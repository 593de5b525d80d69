mod config;
mod error;
mod handler;
mod publisher;
mod recognition;
mod runtime;
mod server;
#[cfg(test)]
mod testing;
mod types;
mod watch;

use crate::config::Config;
use crate::handler::RequestHandler;
use crate::publisher::ApiGateway;
use crate::recognition::Rekognition;
use crate::types::ImageReference;
use aws_config::BehaviorVersion;
use aws_sdk_rekognition::config::Region;
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::process;
use std::sync::Arc;

#[macro_use]
extern crate failure;

#[derive(Parser)]
#[command(name = "plate-reader")]
#[command(about = "Reads license plates from uploaded images for WebSocket clients")]
#[command(version)]
struct Cli {
    /// Without a command, polls the Lambda runtime API when
    /// AWS_LAMBDA_RUNTIME_API is set and serves locally otherwise.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Serve POST /invoke on LISTEN_ADDR
    Serve,
    /// Submit an image over the WebSocket API at SOCKET_URL and print the result
    Watch {
        /// Bucket holding the image
        bucket: String,
        /// Object key of the image
        key: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting plate-reader");

    if let Err(e) = run(cli.command).await {
        error!("{}", e);
        process::exit(1);
    }
    info!("Exiting main");
}

async fn run(command: Option<Commands>) -> Result<(), failure::Error> {
    let config = Config::from_env()?;
    match command {
        None => match &config.runtime_api {
            Some(runtime_api) => runtime::run(&build_handler(&config).await, runtime_api).await,
            None => serve(&config).await,
        },
        Some(Commands::Serve) => serve(&config).await,
        Some(Commands::Watch { bucket, key }) => {
            let socket_url = config
                .socket_url
                .as_ref()
                .ok_or_else(|| format_err!("SOCKET_URL must be set to watch"))?;
            let image = ImageReference { bucket, key };
            let envelope = watch::run(socket_url, config.socket_route.as_deref(), &image).await?;
            println!("{}", envelope.message);
            if !envelope.success {
                return Err(format_err!("Recognition failed"));
            }
        }
    }
    Ok(())
}

async fn serve(config: &Config) {
    let handler = Arc::new(build_handler(config).await);
    server::run(handler, config.listen_addr).await
}

/// Builds the AWS clients once; every invocation served by this process
/// shares them.
async fn build_handler(config: &Config) -> RequestHandler<Rekognition, ApiGateway> {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()))
        .load()
        .await;
    info!(
        "Using region {} and callback endpoint {}",
        config.region, config.callback_url
    );
    RequestHandler::new(
        Rekognition::new(&sdk_config),
        ApiGateway::new(&sdk_config, &config.callback_url),
    )
}
