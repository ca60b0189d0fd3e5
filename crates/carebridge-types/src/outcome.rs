use serde::{Deserialize, Serialize};

use crate::resource::ResourceType;

/// Notes attached when the verifier's reply could not be understood.
pub const FALLBACK_NOTES: &str = "Unable to verify - AI response format error";

/// How sure the verifier is about its judgment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// Structured judgment returned by the AI verifier for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub verified: bool,
    pub confidence: Confidence,
    pub notes: String,
    /// May re-label the submitted type; free text.
    pub category: String,
}

impl VerificationOutcome {
    /// Outcome used when the verifier answered but not in the expected shape.
    pub fn fallback(submitted: ResourceType) -> Self {
        Self {
            verified: false,
            confidence: Confidence::Low,
            notes: FALLBACK_NOTES.to_string(),
            category: submitted.as_str().to_string(),
        }
    }
}

/// A verifier reply after parsing. Both variants are valid outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "outcome", rename_all = "snake_case")]
pub enum VerificationReply {
    Parsed(VerificationOutcome),
    Fallback(VerificationOutcome),
}

impl VerificationReply {
    pub fn outcome(&self) -> &VerificationOutcome {
        match self {
            VerificationReply::Parsed(o) | VerificationReply::Fallback(o) => o,
        }
    }

    pub fn into_outcome(self) -> VerificationOutcome {
        match self {
            VerificationReply::Parsed(o) | VerificationReply::Fallback(o) => o,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, VerificationReply::Fallback(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_outcome() {
        let outcome = VerificationOutcome::fallback(ResourceType::HospitalBed);
        assert!(!outcome.verified);
        assert_eq!(outcome.confidence, Confidence::Low);
        assert_eq!(outcome.notes, FALLBACK_NOTES);
        assert_eq!(outcome.category, "hospital_bed");
    }

    #[test]
    fn test_confidence_rejects_unknown_value() {
        assert!(serde_json::from_str::<Confidence>("\"certain\"").is_err());
        assert_eq!(
            serde_json::from_str::<Confidence>("\"medium\"").unwrap(),
            Confidence::Medium
        );
    }

    #[test]
    fn test_reply_unwraps_either_variant() {
        let parsed = VerificationReply::Parsed(VerificationOutcome {
            verified: true,
            confidence: Confidence::High,
            notes: "ok".into(),
            category: "oxygen".into(),
        });
        assert!(!parsed.is_fallback());
        assert!(parsed.outcome().verified);

        let fallback = VerificationReply::Fallback(VerificationOutcome::fallback(
            ResourceType::Oxygen,
        ));
        assert!(fallback.is_fallback());
        assert_eq!(fallback.into_outcome().notes, FALLBACK_NOTES);
    }
}
