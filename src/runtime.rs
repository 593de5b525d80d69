use crate::handler::RequestHandler;
use crate::publisher::ConnectionGateway;
use crate::recognition::TextDetector;
use bytes::Bytes;
use log::{error, info};
use serde_json::json;
use std::time::Duration;

const API_VERSION: &str = "2018-06-01";
const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";

struct Invocation {
    request_id: String,
    event: Bytes,
}

/// Polls the Lambda runtime API for events forever, one at a time.
pub async fn run<D, G>(handler: &RequestHandler<D, G>, runtime_api: &str)
where
    D: TextDetector,
    G: ConnectionGateway,
{
    info!("Polling runtime API at {}", runtime_api);
    let client = reqwest::Client::new();
    loop {
        if let Err(e) = process_next(&client, runtime_api, handler).await {
            error!("Error processing invocation: {}", e);
            info!("Waiting 1 second before polling the runtime API again...");
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }
}

async fn process_next<D, G>(
    client: &reqwest::Client,
    runtime_api: &str,
    handler: &RequestHandler<D, G>,
) -> Result<(), failure::Error>
where
    D: TextDetector,
    G: ConnectionGateway,
{
    let response = client
        .get(runtime_url(runtime_api, "invocation/next"))
        .send()
        .await?
        .error_for_status()?;
    let request_id = response
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| format_err!("Missing {} header", REQUEST_ID_HEADER))?;
    let invocation = match response.bytes().await {
        Ok(event) => Invocation { request_id, event },
        Err(e) => {
            let e = failure::Error::from(e);
            post_error(client, runtime_api, &request_id, &e).await?;
            return Err(e);
        }
    };

    info!("Handling invocation {}", invocation.request_id);
    let result = handler.handle(&invocation.event).await;
    client
        .post(runtime_url(
            runtime_api,
            &format!("invocation/{}/response", invocation.request_id),
        ))
        .json(&result)
        .send()
        .await?
        .error_for_status()?;
    info!(
        "Invocation {} finished with status {}",
        invocation.request_id, result.status_code
    );
    Ok(())
}

async fn post_error(
    client: &reqwest::Client,
    runtime_api: &str,
    request_id: &str,
    e: &failure::Error,
) -> Result<(), failure::Error> {
    client
        .post(runtime_url(
            runtime_api,
            &format!("invocation/{}/error", request_id),
        ))
        .json(&json!({
            "errorMessage": e.to_string(),
            "errorType": "InvalidEvent",
        }))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

fn runtime_url(runtime_api: &str, path: &str) -> String {
    format!("http://{}/{}/runtime/{}", runtime_api, API_VERSION, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDetector, FakeGateway};
    use serde_json::Value;
    use tokio::sync::mpsc;
    use warp::Filter;

    #[test]
    fn builds_runtime_urls() {
        assert_eq!(
            runtime_url("127.0.0.1:9001", "invocation/next"),
            "http://127.0.0.1:9001/2018-06-01/runtime/invocation/next"
        );
    }

    /// Serves one canned event and forwards posted responses to a channel.
    fn fake_runtime_api(event: Value) -> (String, mpsc::UnboundedReceiver<(String, Value)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let next = warp::get()
            .and(warp::path!("2018-06-01" / "runtime" / "invocation" / "next"))
            .map(move || {
                warp::reply::with_header(event.to_string(), REQUEST_ID_HEADER, "req-1")
            });
        let response = warp::post()
            .and(warp::path!(
                "2018-06-01" / "runtime" / "invocation" / String / "response"
            ))
            .and(warp::body::json())
            .map(move |request_id: String, body: Value| {
                tx.send((request_id, body)).unwrap();
                warp::reply()
            });
        let (addr, server) =
            warp::serve(next.or(response)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        (addr.to_string(), rx)
    }

    #[tokio::test]
    async fn posts_handler_response_for_request_id() {
        let (runtime_api, mut rx) = fake_runtime_api(json!({
            "body": r#"{"message":{"bucket":"imgs","key":"car1.jpg"}}"#,
            "requestContext": {},
        }));
        let handler = RequestHandler::new(
            FakeDetector::returning(&["GJ05XY12"]),
            FakeGateway::accepting(),
        );

        process_next(&reqwest::Client::new(), &runtime_api, &handler)
            .await
            .unwrap();

        let (request_id, body) = rx.recv().await.unwrap();
        assert_eq!(request_id, "req-1");
        assert_eq!(body["statusCode"], 200);
        assert_eq!(
            serde_json::from_str::<Value>(body["body"].as_str().unwrap()).unwrap(),
            json!({"success": true, "message": "GJ05XY12"})
        );
    }

    #[tokio::test]
    async fn unreachable_runtime_api_is_an_error() {
        let handler =
            RequestHandler::new(FakeDetector::returning(&[]), FakeGateway::accepting());
        // Port 9 (discard) is not listening on loopback.
        let result = process_next(&reqwest::Client::new(), "127.0.0.1:9", &handler).await;
        assert!(result.is_err());
    }
}
