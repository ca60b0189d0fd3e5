use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use carebridge_types::{ResourceSubmission, VerificationReply};

use crate::parse::parse_reply;
use crate::prompt::{SYSTEM_PROMPT, build_prompt};
use crate::traits::{ResourceVerifier, VerifierError};

pub const DEFAULT_GATEWAY_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Connection settings for a chat-completions style AI gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewaySettings {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Usually supplied through the environment.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_GATEWAY_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatReplyMessage>,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    content: Option<String>,
}

/// Verifier that asks an AI gateway to judge the listing.
#[derive(Debug, Clone)]
pub struct GatewayVerifier {
    http_client: reqwest::Client,
    settings: GatewaySettings,
}

impl GatewayVerifier {
    pub fn new(settings: GatewaySettings) -> Result<Self, VerifierError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| VerifierError::Failed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }
}

#[async_trait]
impl ResourceVerifier for GatewayVerifier {
    async fn verify(
        &self,
        submission: &ResourceSubmission,
    ) -> Result<VerificationReply, VerifierError> {
        let api_key = self
            .settings
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| VerifierError::Failed("gateway API key not configured".into()))?;

        let prompt = build_prompt(submission);
        let body = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
        };

        tracing::debug!(
            endpoint = %self.settings.endpoint,
            model = %self.settings.model,
            resource_type = %submission.resource_type,
            "requesting AI verification"
        );

        let response = self
            .http_client
            .post(&self.settings.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VerifierError::Failed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %error_text, "AI gateway error");
            return Err(match status.as_u16() {
                429 => VerifierError::RateLimited(429),
                402 => VerifierError::PaymentRequired(402),
                code => VerifierError::Failed(format!("gateway returned status {code}")),
            });
        }

        let envelope: ChatResponse = response
            .json()
            .await
            .map_err(|e| VerifierError::Failed(format!("undecodable gateway response: {e}")))?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content);

        let reply = parse_reply(content.as_deref(), submission.resource_type);
        tracing::info!(
            verified = reply.outcome().verified,
            fallback = reply.is_fallback(),
            "AI verification complete"
        );
        Ok(reply)
    }

    fn name(&self) -> &str {
        "GatewayVerifier"
    }
}
