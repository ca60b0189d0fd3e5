use serde::Deserialize;

use carebridge_types::{Confidence, ResourceType, VerificationOutcome, VerificationReply};

#[derive(Deserialize)]
struct ReplyShape {
    verified: bool,
    confidence: Confidence,
    notes: String,
    #[serde(default)]
    category: Option<String>,
}

/// Parse the verifier's text reply into an outcome.
///
/// Never fails: anything that is not the expected JSON object yields
/// [`VerificationReply::Fallback`].
pub fn parse_reply(content: Option<&str>, submitted: ResourceType) -> VerificationReply {
    let Some(text) = content else {
        tracing::warn!("verifier reply had no content, using fallback outcome");
        return VerificationReply::Fallback(VerificationOutcome::fallback(submitted));
    };

    match serde_json::from_str::<ReplyShape>(unfence(text)) {
        Ok(shape) => VerificationReply::Parsed(VerificationOutcome {
            verified: shape.verified,
            confidence: shape.confidence,
            notes: shape.notes,
            category: shape
                .category
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| submitted.as_str().to_string()),
        }),
        Err(e) => {
            tracing::warn!(error = %e, reply = %text, "failed to parse verifier reply");
            VerificationReply::Fallback(VerificationOutcome::fallback(submitted))
        }
    }
}

/// Body of a reply that may be wrapped in a markdown code block, with or
/// without an info string such as `json` after the opening fence.
fn unfence(reply: &str) -> &str {
    let body = reply.trim();
    let Some(inner) = body.strip_prefix("```") else {
        return body;
    };
    let inner = inner.split_once('\n').map_or(inner, |(_, rest)| rest);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
