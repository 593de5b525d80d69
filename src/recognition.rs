use crate::error::HandlerError;
use crate::types::ImageReference;
use aws_config::SdkConfig;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::operation::detect_text::DetectTextOutput;
use aws_sdk_rekognition::types::{Image, S3Object};
use futures::future::BoxFuture;
use futures::FutureExt;
use log::debug;

/// Result reported when no detection passes validation.
pub const NOT_FOUND: &str = "Unable to find number";

const PLATE_LENGTH: usize = 8;

/// Source of raw text detections for an image.
pub trait TextDetector: Send + Sync {
    /// Returns the raw text of every detection, in the order the service
    /// reported them. A response without a detection list yields an empty
    /// `Vec`.
    fn detect_text<'a>(
        &'a self,
        image: &'a ImageReference,
    ) -> BoxFuture<'a, Result<Vec<String>, failure::Error>>;
}

pub struct Rekognition {
    client: aws_sdk_rekognition::Client,
}

impl Rekognition {
    pub fn new(sdk_config: &SdkConfig) -> Rekognition {
        Rekognition {
            client: aws_sdk_rekognition::Client::new(sdk_config),
        }
    }

    async fn detect(&self, image: &ImageReference) -> Result<Vec<String>, failure::Error> {
        let s3_object = S3Object::builder()
            .bucket(&image.bucket)
            .name(&image.key)
            .build();
        let output = self
            .client
            .detect_text()
            .image(Image::builder().s3_object(s3_object).build())
            .send()
            .await
            .map_err(|e| {
                format_err!(
                    "DetectText failed for {}/{}: {}",
                    image.bucket,
                    image.key,
                    DisplayErrorContext(&e)
                )
            })?;
        debug!("DetectText response: {:?}", output);
        texts(&output)
    }
}

/// Raw text of each detection in response order. An absent list is empty; a
/// detection without text makes the whole response unusable.
fn texts(output: &DetectTextOutput) -> Result<Vec<String>, failure::Error> {
    output
        .text_detections()
        .iter()
        .map(|detection| {
            detection
                .detected_text()
                .map(str::to_string)
                .ok_or_else(|| format_err!("Missing DetectedText in {:?}", detection))
        })
        .collect()
}

impl TextDetector for Rekognition {
    fn detect_text<'a>(
        &'a self,
        image: &'a ImageReference,
    ) -> BoxFuture<'a, Result<Vec<String>, failure::Error>> {
        self.detect(image).boxed()
    }
}

/// Trims `text` and accepts it as a plate candidate iff exactly eight
/// characters (Unicode scalar values) remain. No charset check is made.
pub fn validate(text: &str) -> Option<&str> {
    let text = text.trim();
    if text.chars().count() == PLATE_LENGTH {
        Some(text)
    } else {
        None
    }
}

/// Picks the first detection that passes `validate`, keeping the service's
/// response order, or `NOT_FOUND` when none does.
pub async fn extract_number_plate<D: TextDetector + ?Sized>(
    detector: &D,
    image: &ImageReference,
) -> Result<String, HandlerError> {
    let detections = detector
        .detect_text(image)
        .await
        .map_err(HandlerError::RecognitionServiceFailure)?;
    let candidates: Vec<&str> = detections.iter().filter_map(|t| validate(t)).collect();
    debug!("Plate candidates: {:?}", candidates);
    Ok(candidates
        .first()
        .map_or_else(|| NOT_FOUND.to_string(), |plate| plate.to_string()))
}
