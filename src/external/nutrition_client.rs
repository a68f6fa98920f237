// ABOUTME: Nutrition estimation client for OpenAI-compatible vision chat completion APIs
// ABOUTME: Sends a food photo with a fixed prompt and parses four macro-nutrient fields
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Nutrition estimation passthrough
//!
//! A food photo (base64, optionally as a `data:` URL) is forwarded to an
//! OpenAI-compatible `/chat/completions` endpoint as an `image_url` content
//! part together with a fixed instruction. The text reply is expected to be
//! a JSON object, possibly wrapped in a fenced code block.
//!
//! Each attempt is bounded by the configured timeout. Timeouts, connection
//! failures, HTTP 429 and 5xx are retried with exponential backoff; every
//! other failure is returned at once.
//!
//! [`MockNutritionEstimator`] stands in for the real client in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::constants::{defaults, timeouts};
use crate::errors::AppError;
use crate::models::NutritionEstimate;

/// Instruction sent with every photo
const ESTIMATE_PROMPT: &str = "You are a nutrition assistant. Estimate the nutritional content of \
the meal in this photo. Reply with only a JSON object with exactly these numeric fields: \
calories_kcal, protein_g, carb_g, fat_g. Do not include any other text.";

/// Longest upstream text carried into an error message
const MAX_UPSTREAM_MESSAGE_CHARS: usize = 500;

/// Outbound nutrition API settings
#[derive(Debug, Clone)]
pub struct NutritionClientConfig {
    /// OpenAI-compatible base URL, e.g. `https://api.openai.com/v1`
    pub base_url: String,
    /// Bearer token; estimation is unavailable without it
    pub api_key: Option<String>,
    /// Vision-capable model
    pub model: String,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each further retry
    pub retry_base_delay: Duration,
}

impl Default for NutritionClientConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::NUTRITION_API_BASE_URL.to_owned(),
            api_key: None,
            model: defaults::NUTRITION_MODEL.to_owned(),
            timeout: Duration::from_secs(defaults::NUTRITION_TIMEOUT_SECS),
            max_retries: defaults::NUTRITION_MAX_RETRIES,
            retry_base_delay: Duration::from_millis(defaults::NUTRITION_RETRY_BASE_DELAY_MS),
        }
    }
}

impl NutritionClientConfig {
    /// Backoff before retry number `retry + 1`
    #[must_use]
    pub fn retry_delay(&self, retry: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2_u32.saturating_pow(retry))
    }

    /// Longest an estimate can take: every attempt timing out plus every backoff
    #[must_use]
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = self.timeout.saturating_mul(self.max_retries.saturating_add(1));
        (0..self.max_retries).fold(attempts, |total, retry| {
            total.saturating_add(self.retry_delay(retry))
        })
    }
}

/// Nutrition estimation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NutritionError {
    /// Missing, empty or undecodable image; no upstream call was made
    #[error("Invalid image: {0}")]
    InvalidImage(String),
    /// No API key configured
    #[error("Nutrition estimation is not configured")]
    NotConfigured,
    /// The upstream call exceeded the configured timeout
    #[error("Nutrition API did not respond within {} seconds", .after.as_secs())]
    Timeout {
        /// Timeout that elapsed
        after: Duration,
    },
    /// Connection failure (`status` is `None`) or an error status
    #[error("{message}")]
    Upstream {
        /// HTTP status returned by the upstream API
        status: Option<u16>,
        /// Upstream error text
        message: String,
    },
    /// The reply could not be read as a nutrition estimate
    #[error("Malformed nutrition reply: {0}")]
    MalformedReply(String),
}

impl NutritionError {
    /// Stable wire name of the failure
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidImage(_) => "invalid_image",
            Self::NotConfigured => "not_configured",
            Self::Timeout { .. } => "timeout",
            Self::Upstream { .. } => "upstream",
            Self::MalformedReply(_) => "malformed_reply",
        }
    }

    /// Whether another attempt may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Upstream { status: None, .. } => true,
            Self::Upstream {
                status: Some(status),
                ..
            } => *status == 429 || *status >= 500,
            Self::InvalidImage(_) | Self::NotConfigured | Self::MalformedReply(_) => false,
        }
    }
}

/// Estimates macro-nutrients from a food photo
#[async_trait]
pub trait NutritionEstimator: Send + Sync {
    /// Estimate the nutrition of the meal in a base64 image
    ///
    /// # Errors
    ///
    /// Returns a [`NutritionError`] describing why no estimate was produced
    async fn estimate(&self, image: &str) -> Result<NutritionEstimate, NutritionError>;
}

// ============================================================================
// Image handling
// ============================================================================

/// Decoded-and-checked image ready to embed in a data URL
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImagePayload {
    mime: &'static str,
    base64: String,
}

impl ImagePayload {
    fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.base64)
    }
}

/// Validate the incoming image before anything else happens
fn prepare_image(image: &str) -> Result<ImagePayload, NutritionError> {
    let trimmed = image.trim();
    if trimmed.is_empty() {
        return Err(NutritionError::InvalidImage("image is required".to_owned()));
    }

    let encoded = match trimmed.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| NutritionError::InvalidImage("malformed data URL".to_owned()))?,
        None => trimmed,
    };
    let encoded: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    let bytes = STANDARD
        .decode(&encoded)
        .map_err(|e| NutritionError::InvalidImage(format!("image is not valid base64: {e}")))?;
    if bytes.is_empty() {
        return Err(NutritionError::InvalidImage("image is required".to_owned()));
    }

    Ok(ImagePayload {
        mime: sniff_mime(&bytes),
        base64: encoded,
    })
}

/// Image MIME type from magic bytes, JPEG when unknown
fn sniff_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        "image/png"
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        "image/gif"
    } else if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

// ============================================================================
// Reply handling
// ============================================================================

/// Remove a surrounding Markdown code fence, with or without a `json` tag
fn strip_code_fences(reply: &str) -> &str {
    let mut trimmed = reply.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        trimmed = stripped;
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        trimmed = stripped;
    }
    if let Some(stripped) = trimmed.strip_suffix("```") {
        trimmed = stripped;
    }
    trimmed.trim()
}

/// Parse the model's text reply into an estimate
fn parse_estimate_reply(reply: &str) -> Result<NutritionEstimate, NutritionError> {
    let body = strip_code_fences(reply);
    match serde_json::from_str::<NutritionEstimate>(body) {
        Ok(estimate) => Ok(estimate),
        Err(first_error) => {
            // Some models wrap the object in prose
            let embedded = body
                .find('{')
                .zip(body.rfind('}'))
                .filter(|(start, end)| start < end)
                .map(|(start, end)| &body[start..=end]);
            embedded
                .and_then(|object| serde_json::from_str::<NutritionEstimate>(object).ok())
                .ok_or_else(|| {
                    NutritionError::MalformedReply(format!(
                        "{first_error} in reply: {}",
                        truncate(body, MAX_UPSTREAM_MESSAGE_CHARS)
                    ))
                })
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct VisionRequest<'a> {
    model: &'a str,
    messages: Vec<VisionMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct VisionMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Upstream error text: the API's own message when present, else the body
fn upstream_error_message(status: reqwest::StatusCode, body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body).map_or_else(
        |_| {
            let text = body.trim();
            if text.is_empty() {
                format!("Nutrition API returned {status}")
            } else {
                truncate(text, MAX_UPSTREAM_MESSAGE_CHARS)
            }
        },
        |envelope| envelope.error.message,
    )
}

// ============================================================================
// Client
// ============================================================================

/// Nutrition estimator backed by an OpenAI-compatible vision model
pub struct VisionNutritionClient {
    client: Client,
    config: NutritionClientConfig,
}

impl VisionNutritionClient {
    /// Build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created
    pub fn new(config: NutritionClientConfig) -> Result<Self, AppError> {
        let connect_timeout = config
            .timeout
            .min(Duration::from_secs(timeouts::NUTRITION_CONNECT_TIMEOUT_SECS));
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Settings in use
    #[must_use]
    pub const fn config(&self) -> &NutritionClientConfig {
        &self.config
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), endpoint)
    }

    fn transport_error(&self, error: &reqwest::Error) -> NutritionError {
        if error.is_timeout() {
            NutritionError::Timeout {
                after: self.config.timeout,
            }
        } else {
            NutritionError::Upstream {
                status: None,
                message: format!("Failed to reach nutrition API: {error}"),
            }
        }
    }

    async fn request_once(
        &self,
        api_key: &str,
        image: &ImagePayload,
    ) -> Result<NutritionEstimate, NutritionError> {
        let request = VisionRequest {
            model: &self.config.model,
            messages: vec![VisionMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: ESTIMATE_PROMPT,
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_url(),
                        },
                    },
                ],
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(self.api_url("chat/completions"))
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(&e))?;

        if !status.is_success() {
            return Err(NutritionError::Upstream {
                status: Some(status.as_u16()),
                message: upstream_error_message(status, &body),
            });
        }

        let completion: CompletionResponse = serde_json::from_str(&body).map_err(|e| {
            NutritionError::MalformedReply(format!("unreadable completion response: {e}"))
        })?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| NutritionError::MalformedReply("reply has no content".to_owned()))?;

        debug!(reply_len = content.len(), "Received nutrition reply");
        parse_estimate_reply(&content)
    }
}

#[async_trait]
impl NutritionEstimator for VisionNutritionClient {
    #[instrument(skip(self, image), fields(model = %self.config.model))]
    async fn estimate(&self, image: &str) -> Result<NutritionEstimate, NutritionError> {
        let payload = prepare_image(image).inspect_err(|e| {
            warn!(error = %e, "Rejected nutrition image");
        })?;
        let Some(api_key) = self.config.api_key.as_deref() else {
            warn!("Nutrition API key is not configured");
            return Err(NutritionError::NotConfigured);
        };

        let mut retries = 0;
        loop {
            match self.request_once(api_key, &payload).await {
                Ok(estimate) => {
                    info!(
                        calories_kcal = estimate.calories_kcal,
                        retries, "Estimated meal nutrition"
                    );
                    return Ok(estimate);
                }
                Err(e) if e.is_retryable() && retries < self.config.max_retries => {
                    let delay = self.config.retry_delay(retries);
                    retries += 1;
                    warn!(
                        error = %e,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        "Nutrition API call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(error = %e, kind = e.kind(), retries, "Nutrition estimation failed");
                    return Err(e);
                }
            }
        }
    }
}

// ============================================================================
// Mock
// ============================================================================

/// Canned estimator for tests; validates the image like the real client and
/// counts the calls that would have gone upstream
pub struct MockNutritionEstimator {
    response: Result<NutritionEstimate, NutritionError>,
    calls: AtomicUsize,
}

impl MockNutritionEstimator {
    /// Always answer with `estimate`
    #[must_use]
    pub fn returning(estimate: NutritionEstimate) -> Self {
        Self {
            response: Ok(estimate),
            calls: AtomicUsize::new(0),
        }
    }

    /// Always fail with `error`
    #[must_use]
    pub fn failing(error: NutritionError) -> Self {
        Self {
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of calls that passed image validation
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NutritionEstimator for MockNutritionEstimator {
    async fn estimate(&self, image: &str) -> Result<NutritionEstimate, NutritionError> {
        prepare_image(image)?;
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}
