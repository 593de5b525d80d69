use crate::types::{Envelope, ImageReference};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Submits `image` over the WebSocket API and waits for the envelope the
/// handler pushes back on the same connection.
pub async fn run(
    socket_url: &Url,
    route: Option<&str>,
    image: &ImageReference,
) -> Result<Envelope, failure::Error> {
    info!("Connecting to {}", socket_url);
    let (mut connection, _) = tokio_tungstenite::connect_async(socket_url.as_str()).await?;
    connection
        .send(Message::text(request_message(route, image).to_string()))
        .await?;
    info!("Submitted {}/{}, waiting for result", image.bucket, image.key);

    while let Some(message) = connection.next().await {
        match message? {
            Message::Text(s) => return parse_envelope(&s),
            Message::Close(close_frame) => {
                warn!("Websocket close message: {:?}", close_frame);
                break;
            }
            other => debug!("Ignoring websocket message: {:?}", other),
        }
    }
    Err(format_err!("Websocket closed before a result arrived"))
}

fn request_message(route: Option<&str>, image: &ImageReference) -> Value {
    let mut message = json!({
        "message": {
            "bucket": image.bucket,
            "key": image.key,
        }
    });
    if let Some(route) = route {
        message["action"] = json!(route);
    }
    message
}

fn parse_envelope(s: &str) -> Result<Envelope, failure::Error> {
    serde_json::from_str(s).map_err(|_| format_err!("Unexpected websocket message: {}", s))
}
