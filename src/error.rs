use failure::Fail;

/// Everything that turns an invocation into a failed response.
#[derive(Debug, Fail)]
pub enum HandlerError {
    /// Event or body did not parse, or lacked `message.bucket`/`message.key`.
    #[fail(display = "Malformed request: {}", _0)]
    MalformedRequest(#[cause] serde_json::Error),
    /// The text detection call failed or returned an unusable response.
    #[fail(display = "Text detection failed: {}", _0)]
    RecognitionServiceFailure(#[cause] failure::Error),
    /// The gateway rejected or could not deliver the result.
    #[fail(
        display = "Unable to deliver result to connection {}: {}",
        connection_id, cause
    )]
    DeliveryFailure {
        connection_id: String,
        #[cause]
        cause: failure::Error,
    },
}
