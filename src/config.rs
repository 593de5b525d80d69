use std::env;
use std::net::SocketAddr;
use url::Url;

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_CALLBACK_URL: &str =
    "https://mwtqeze40m.execute-api.us-east-1.amazonaws.com/dev-vehicle/";
const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8402";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub region: String,
    /// API Gateway Management endpoint (`https://`, not `wss://`).
    pub callback_url: Url,
    pub listen_addr: SocketAddr,
    /// `host:port` of the Lambda runtime API, when running inside Lambda.
    pub runtime_api: Option<String>,
    pub socket_url: Option<Url>,
    pub socket_route: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Config, failure::Error> {
        Config::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Config, failure::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let callback_url = var("CALLBACK_URL").unwrap_or_else(|| DEFAULT_CALLBACK_URL.to_string());
        let callback_url = Url::parse(&callback_url)
            .map_err(|e| format_err!("Invalid CALLBACK_URL {}: {}", callback_url, e))?;
        if !matches!(callback_url.scheme(), "https" | "http") {
            return Err(format_err!(
                "CALLBACK_URL must be an http(s) endpoint, got {}",
                callback_url
            ));
        }

        let listen_addr = var("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_string());
        let listen_addr = listen_addr
            .parse::<SocketAddr>()
            .map_err(|e| format_err!("Invalid LISTEN_ADDR {}: {}", listen_addr, e))?;

        let socket_url = match var("SOCKET_URL") {
            Some(s) => Some(
                Url::parse(&s).map_err(|e| format_err!("Invalid SOCKET_URL {}: {}", s, e))?,
            ),
            None => None,
        };

        Ok(Config {
            region: var("AWS_REGION_NAME").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            callback_url,
            listen_addr,
            runtime_api: var("AWS_LAMBDA_RUNTIME_API"),
            socket_url,
            socket_route: var("SOCKET_ROUTE"),
        })
    }
}
