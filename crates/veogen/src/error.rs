use thiserror::Error;

/// Failure taxonomy for the generation flows. Validation errors are handled
/// before any remote call; everything else propagates to the orchestrator,
/// which is the single point deciding user-visible messaging and mode
/// transitions. Nothing below the orchestrator retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GenerationError {
    /// Rejected locally; no remote call is attempted.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// No stored credential was found on a lazy fetch.
    #[error("no credential is configured")]
    MissingCredential,

    /// Credential store I/O failed.
    #[error("credential store: {0}")]
    Credential(String),

    /// Any upstream failure from enhance/synthesize/submit/poll/fetch,
    /// carrying the service's message verbatim.
    #[error("remote call failed: {0}")]
    Remote(String),

    /// A `Remote` failure whose message matched a credential-rejection
    /// marker.
    #[error("credential rejected by the service: {0}")]
    CredentialInvalid(String),

    /// The service reported completion but supplied no usable media.
    #[error("generation completed without usable media")]
    EmptyResult,

    /// The bounded poll loop ran out of attempts.
    #[error("gave up polling after {0} attempts")]
    DeadlineExceeded(u32),
}

/// Known upstream substrings that signal a rejected credential. The service
/// exposes no structured error code, so classification rides on its
/// human-readable wording; this list is the single place to amend when that
/// wording changes upstream.
const CREDENTIAL_MARKERS: &[&str] = &[
    "API key not valid",
    "API_KEY_INVALID",
    "Requested entity was not found",
];

/// Outcome of classifying a failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Force re-authentication; the stored credential must be cleared.
    CredentialInvalid,
    /// Surface the message to the user and return to idle.
    Transient(String),
}

/// Classifies a failure by pattern-matching the service's error text.
pub fn classify(message: &str) -> ErrorClass {
    if CREDENTIAL_MARKERS.iter().any(|m| message.contains(m)) {
        ErrorClass::CredentialInvalid
    } else {
        ErrorClass::Transient(message.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_not_valid_is_credential_invalid() {
        let class = classify("API key not valid. Please pass a valid API key.");
        assert_eq!(class, ErrorClass::CredentialInvalid);
    }

    #[test]
    fn test_entity_not_found_is_credential_invalid() {
        let class = classify("404 - Requested entity was not found.");
        assert_eq!(class, ErrorClass::CredentialInvalid);
    }

    #[test]
    fn test_other_messages_are_transient() {
        let class = classify("quota exceeded for this model");
        assert_eq!(
            class,
            ErrorClass::Transient("quota exceeded for this model".to_string())
        );
    }

    #[test]
    fn test_marker_inside_wrapped_message_still_matches() {
        let err = GenerationError::Remote("400 - API_KEY_INVALID".to_string());
        assert_eq!(classify(&err.to_string()), ErrorClass::CredentialInvalid);
    }
}
