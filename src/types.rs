use serde::{Deserialize, Serialize};
use serde_json::json;

/// One object in external storage, addressed the way the recognition
/// service expects it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    pub bucket: String,
    pub key: String,
}

/// Event delivered by the invoking runtime for one client message.
#[derive(Debug, Deserialize)]
pub struct InboundEvent {
    /// JSON-encoded `MessageBody`.
    pub body: String,
    #[serde(rename = "requestContext")]
    pub request_context: RequestContext,
}

#[derive(Debug, Default, Deserialize)]
pub struct RequestContext {
    #[serde(rename = "connectionId", default)]
    pub connection_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: ImageReference,
}

/// What the client receives, both over its connection and as the
/// invocation body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,
    pub message: String,
}

impl Envelope {
    pub fn success(message: impl Into<String>) -> Envelope {
        Envelope {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed() -> Envelope {
        Envelope {
            success: false,
            message: "Failed".to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        json!({ "success": self.success, "message": self.message }).to_string()
    }
}

/// Returned to the invoking runtime; `body` holds a serialized `Envelope`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl InvocationResponse {
    pub fn new(status_code: u16, envelope: &Envelope) -> InvocationResponse {
        InvocationResponse {
            status_code,
            body: envelope.to_json(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_connection_id_deserializes_as_none() {
        let event: InboundEvent =
            serde_json::from_str(r#"{"body": "{}", "requestContext": {}}"#).unwrap();
        assert_eq!(event.request_context.connection_id, None);

        let event: InboundEvent =
            serde_json::from_str(r#"{"body": "{}", "requestContext": {"connectionId": null}}"#)
                .unwrap();
        assert_eq!(event.request_context.connection_id, None);
    }

    #[test]
    fn response_serializes_with_runtime_field_names() {
        let response = InvocationResponse::new(500, &Envelope::failed());
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 500);
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(value["body"].as_str().unwrap()).unwrap(),
            json!({"success": false, "message": "Failed"})
        );
    }
}
