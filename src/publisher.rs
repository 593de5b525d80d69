use crate::error::HandlerError;
use crate::types::Envelope;
use aws_config::SdkConfig;
use aws_sdk_apigatewaymanagement::error::DisplayErrorContext;
use aws_sdk_apigatewaymanagement::primitives::Blob;
use futures::future::BoxFuture;
use futures::FutureExt;
use log::info;
use url::Url;

/// Pushes payloads to open client connections.
pub trait ConnectionGateway: Send + Sync {
    fn post_to_connection<'a>(
        &'a self,
        connection_id: &'a str,
        data: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), failure::Error>>;
}

/// API Gateway Management API client bound to one callback endpoint.
/// Requests are SigV4-signed for the region in the shared SDK config.
pub struct ApiGateway {
    client: aws_sdk_apigatewaymanagement::Client,
}

impl ApiGateway {
    pub fn new(sdk_config: &SdkConfig, callback_url: &Url) -> ApiGateway {
        let config = aws_sdk_apigatewaymanagement::config::Builder::from(sdk_config)
            .endpoint_url(endpoint_url(callback_url))
            .build();
        ApiGateway {
            client: aws_sdk_apigatewaymanagement::Client::from_conf(config),
        }
    }

    async fn post(&self, connection_id: &str, data: Vec<u8>) -> Result<(), failure::Error> {
        self.client
            .post_to_connection()
            .connection_id(connection_id)
            .data(Blob::new(data))
            .send()
            .await
            .map_err(|e| format_err!("PostToConnection failed: {}", DisplayErrorContext(&e)))?;
        Ok(())
    }
}

/// The SDK appends `/@connections/{id}`, so a trailing slash would produce
/// an empty path segment.
fn endpoint_url(callback_url: &Url) -> &str {
    callback_url.as_str().trim_end_matches('/')
}

impl ConnectionGateway for ApiGateway {
    fn post_to_connection<'a>(
        &'a self,
        connection_id: &'a str,
        data: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), failure::Error>> {
        self.post(connection_id, data).boxed()
    }
}

/// Sends `{"success": true, "message": data}` to `connection_id`. One
/// attempt; any gateway error becomes a `DeliveryFailure`.
pub async fn publish<G: ConnectionGateway + ?Sized>(
    gateway: &G,
    connection_id: &str,
    data: &str,
) -> Result<(), HandlerError> {
    let payload = Envelope::success(data).to_json();
    info!("Publishing {} to connection {}", payload, connection_id);
    gateway
        .post_to_connection(connection_id, payload.into_bytes())
        .await
        .map_err(|cause| HandlerError::DeliveryFailure {
            connection_id: connection_id.to_string(),
            cause,
        })
}
