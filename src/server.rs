use crate::handler::RequestHandler;
use crate::publisher::ConnectionGateway;
use crate::recognition::TextDetector;
use bytes::Bytes;
use log::info;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use uuid::Uuid;
use warp::Filter;

const MAX_EVENT_BYTES: u64 = 256 * 1024;

/// Serves `POST /invoke` for running outside Lambda. The request body is a
/// raw inbound event; the reply is the invocation response.
pub async fn run<D, G>(handler: Arc<RequestHandler<D, G>>, addr: SocketAddr)
where
    D: TextDetector + 'static,
    G: ConnectionGateway + 'static,
{
    info!("Listening for invocations on {}", addr);
    warp::serve(routes(handler)).run(addr).await;
}

fn routes<D, G>(
    handler: Arc<RequestHandler<D, G>>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone
where
    D: TextDetector + 'static,
    G: ConnectionGateway + 'static,
{
    warp::post()
        .and(warp::path!("invoke"))
        .and(warp::body::content_length_limit(MAX_EVENT_BYTES))
        .and(warp::body::bytes())
        .and(warp::any().map(move || handler.clone()))
        .and_then(|event: Bytes, handler: Arc<RequestHandler<D, G>>| async move {
            let request_id = Uuid::new_v4();
            info!("Handling invocation {}", request_id);
            let response = handler.handle(&event).await;
            info!(
                "Invocation {} finished with status {}",
                request_id, response.status_code
            );
            Ok::<_, Infallible>(warp::reply::json(&response))
        })
}
