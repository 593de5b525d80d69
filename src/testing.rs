//! In-process stand-ins for the recognition service and the gateway.

use crate::publisher::ConnectionGateway;
use crate::recognition::TextDetector;
use crate::types::ImageReference;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use std::sync::Mutex;

pub struct FakeDetector {
    result: Result<Vec<String>, String>,
    requests: Mutex<Vec<ImageReference>>,
}

impl FakeDetector {
    pub fn returning(texts: &[&str]) -> FakeDetector {
        FakeDetector {
            result: Ok(texts.iter().map(|t| t.to_string()).collect()),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn failing(message: &str) -> FakeDetector {
        FakeDetector {
            result: Err(message.to_string()),
            requests: Mutex::new(vec![]),
        }
    }

    pub fn requests(&self) -> Vec<ImageReference> {
        self.requests.lock().unwrap().clone()
    }
}

impl TextDetector for FakeDetector {
    fn detect_text<'a>(
        &'a self,
        image: &'a ImageReference,
    ) -> BoxFuture<'a, Result<Vec<String>, failure::Error>> {
        self.requests.lock().unwrap().push(image.clone());
        let result = match &self.result {
            Ok(texts) => Ok(texts.clone()),
            Err(message) => Err(format_err!("{}", message)),
        };
        future::ready(result).boxed()
    }
}

pub struct FakeGateway {
    error: Option<String>,
    posted: Mutex<Vec<(String, Vec<u8>)>>,
}

impl FakeGateway {
    pub fn accepting() -> FakeGateway {
        FakeGateway {
            error: None,
            posted: Mutex::new(vec![]),
        }
    }

    pub fn failing(message: &str) -> FakeGateway {
        FakeGateway {
            error: Some(message.to_string()),
            posted: Mutex::new(vec![]),
        }
    }

    /// Every delivery attempt, successful or not.
    pub fn posted(&self) -> Vec<(String, Vec<u8>)> {
        self.posted.lock().unwrap().clone()
    }
}

impl ConnectionGateway for FakeGateway {
    fn post_to_connection<'a>(
        &'a self,
        connection_id: &'a str,
        data: Vec<u8>,
    ) -> BoxFuture<'a, Result<(), failure::Error>> {
        self.posted
            .lock()
            .unwrap()
            .push((connection_id.to_string(), data));
        let result = match &self.error {
            Some(message) => Err(format_err!("{}", message)),
            None => Ok(()),
        };
        future::ready(result).boxed()
    }
}
