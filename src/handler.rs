use crate::error::HandlerError;
use crate::publisher::{self, ConnectionGateway};
use crate::recognition::{self, TextDetector};
use crate::types::{Envelope, InboundEvent, InvocationResponse, MessageBody};
use failure::Fail;
use log::{error, info};

/// Entry point for one inbound event. Holds the long-lived clients; each
/// call to `handle` is independent.
pub struct RequestHandler<D, G> {
    detector: D,
    gateway: G,
}

impl<D: TextDetector, G: ConnectionGateway> RequestHandler<D, G> {
    pub fn new(detector: D, gateway: G) -> RequestHandler<D, G> {
        RequestHandler { detector, gateway }
    }

    /// Runs the whole flow for a raw event. Never fails: any error is logged
    /// and reported as a 500 with a generic envelope.
    pub async fn handle(&self, event: &[u8]) -> InvocationResponse {
        match self.process(event).await {
            Ok(plate) => InvocationResponse::new(200, &Envelope::success(plate)),
            Err(e) => {
                error!("Error occurred. {}", e);
                if let Some(cause) = Fail::cause(&e) {
                    error!("Caused by: {:?}", cause);
                }
                InvocationResponse::new(500, &Envelope::failed())
            }
        }
    }

    async fn process(&self, event: &[u8]) -> Result<String, HandlerError> {
        info!("event: {}", String::from_utf8_lossy(event));
        let event: InboundEvent =
            serde_json::from_slice(event).map_err(HandlerError::MalformedRequest)?;
        let body: MessageBody =
            serde_json::from_str(&event.body).map_err(HandlerError::MalformedRequest)?;
        let image = body.message;
        let connection_id = event.request_context.connection_id;
        info!(
            "bucket: {}, key: {}, connection_id: {:?}",
            image.bucket, image.key, connection_id
        );

        let plate = recognition::extract_number_plate(&self.detector, &image).await?;
        info!("Recognized {}", plate);

        if let Some(connection_id) = &connection_id {
            publisher::publish(&self.gateway, connection_id, &plate).await?;
        }
        Ok(plate)
    }
}
