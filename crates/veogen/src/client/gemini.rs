/// Gemini / Veo REST backend
///
/// Talks to the Generative Language API: prompt rewriting via
/// `generateContent`, still images via `predict`, video jobs via
/// `predictLongRunning` plus the operations endpoint, and a direct
/// credential-scoped GET for the finished media.
use async_trait::async_trait;
use log::debug;
use serde_json::{json, Value};
use std::time::Duration;

use super::{GenerationBackend, ImagePayload, JobPoll, OperationHandle};
use crate::error::GenerationError;
use crate::planner::RequestPayload;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const ENHANCE_MODEL: &str = "gemini-2.5-pro";
const IMAGE_MODEL: &str = "imagen-4.0-generate-001";

/// Fixed instruction template for the one-shot prompt rewrite.
const ENHANCE_TEMPLATE: &str = "Analyze the user's prompt and enhance it into a professional, \
cinematic shot list for a video generation model. The output must be a single, detailed \
paragraph in English. Break down the user's idea into subject, action, environment, and mood. \
Then, combine these elements with advanced cinematic techniques like specific camera angles \
(e.g., low-angle shot, aerial view), camera movements (e.g., dolly in, crane shot), lighting \
styles (e.g., golden hour, rim lighting), and visual styles (e.g., photorealistic, \
hyper-detailed, 8K).";

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Production backend over reqwest.
pub struct GeminiClient {
    config: ClientConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: ClientConfig) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::Remote(e.to_string()))?;
        Ok(Self { config, client })
    }

    fn model_url(&self, model: &str, verb: &str) -> String {
        format!("{}/models/{}:{}", self.config.base_url, model, verb)
    }

    async fn post_json(
        &self,
        url: &str,
        credential: &str,
        body: &Value,
    ) -> Result<Value, GenerationError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", credential)
            .json(body)
            .send()
            .await
            .map_err(|e| GenerationError::Remote(e.to_string()))?;
        Self::json_or_error(response).await
    }

    async fn get_json(&self, url: &str, credential: &str) -> Result<Value, GenerationError> {
        let response = self
            .client
            .get(url)
            .header("x-goog-api-key", credential)
            .send()
            .await
            .map_err(|e| GenerationError::Remote(e.to_string()))?;
        Self::json_or_error(response).await
    }

    async fn json_or_error(response: reqwest::Response) -> Result<Value, GenerationError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Remote(format!("{} - {}", status, body)));
        }
        response
            .json()
            .await
            .map_err(|e| GenerationError::Remote(e.to_string()))
    }

    fn image_value(image: &ImagePayload) -> Value {
        json!({
            "bytesBase64Encoded": image.data,
            "mimeType": image.media_type,
        })
    }
}

#[async_trait]
impl GenerationBackend for GeminiClient {
    async fn enhance_prompt(
        &self,
        credential: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let body = json!({
            "contents": [{
                "parts": [{
                    "text": format!("{ENHANCE_TEMPLATE} User prompt: \"{prompt}\""),
                }],
            }],
            "generationConfig": { "responseMimeType": "text/plain" },
        });
        let url = self.model_url(ENHANCE_MODEL, "generateContent");
        let value = self.post_json(&url, credential, &body).await?;

        value
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .ok_or_else(|| GenerationError::Remote("enhance returned no text".to_string()))
    }

    async fn generate_image(
        &self,
        credential: &str,
        prompt: &str,
    ) -> Result<ImagePayload, GenerationError> {
        let body = json!({
            "instances": [{ "prompt": prompt }],
            "parameters": { "sampleCount": 1 },
        });
        let url = self.model_url(IMAGE_MODEL, "predict");
        let value = self.post_json(&url, credential, &body).await?;

        let Some(data) = value
            .pointer("/predictions/0/bytesBase64Encoded")
            .and_then(Value::as_str)
        else {
            return Err(GenerationError::EmptyResult);
        };
        let media_type = value
            .pointer("/predictions/0/mimeType")
            .and_then(Value::as_str)
            .unwrap_or("image/png");

        Ok(ImagePayload {
            data: data.to_string(),
            media_type: media_type.to_string(),
        })
    }

    async fn create_video_job(
        &self,
        credential: &str,
        payload: &RequestPayload,
    ) -> Result<OperationHandle, GenerationError> {
        let mut instance = json!({ "prompt": payload.prompt });
        if let Some(frame) = &payload.start_frame {
            instance["image"] = Self::image_value(frame);
        }
        if let Some(frame) = &payload.end_frame {
            instance["lastFrame"] = Self::image_value(frame);
        }

        let mut parameters = json!({
            "aspectRatio": payload.aspect_ratio,
            "resolution": payload.resolution,
            "sampleCount": payload.sample_count,
        });
        if !payload.reference_images.is_empty() {
            parameters["referenceImages"] = payload
                .reference_images
                .iter()
                .map(|image| {
                    json!({
                        "image": Self::image_value(image),
                        "referenceType": "asset",
                    })
                })
                .collect::<Vec<_>>()
                .into();
        }

        let body = json!({ "instances": [instance], "parameters": parameters });
        let url = self.model_url(&payload.model, "predictLongRunning");
        let value = self.post_json(&url, credential, &body).await?;

        value
            .get("name")
            .and_then(Value::as_str)
            .map(|name| OperationHandle(name.to_string()))
            .ok_or_else(|| {
                GenerationError::Remote("job submission returned no operation name".to_string())
            })
    }

    async fn poll_video_job(
        &self,
        credential: &str,
        handle: &OperationHandle,
    ) -> Result<JobPoll, GenerationError> {
        let url = format!("{}/{}", self.config.base_url, handle.0);
        let value = self.get_json(&url, credential).await?;

        let done = value.get("done").and_then(Value::as_bool).unwrap_or(false);
        let media_uri = value
            .pointer("/response/generateVideoResponse/generatedSamples/0/video/uri")
            .and_then(Value::as_str)
            .map(str::to_string);
        debug!("operation {} done={}", handle.0, done);

        Ok(JobPoll { done, media_uri })
    }

    async fn fetch_media(&self, credential: &str, uri: &str) -> Result<Vec<u8>, GenerationError> {
        let separator = if uri.contains('?') { '&' } else { '?' };
        let url = format!("{uri}{separator}key={credential}");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| GenerationError::Remote(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GenerationError::Remote(format!(
                "media fetch failed: {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::Remote(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
