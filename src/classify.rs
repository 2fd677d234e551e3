//! Maps opaque RPC and transaction failures to short, user-presentable
//! messages.
//!
//! Provider and wallet errors arrive as free text whose shape differs across
//! vendors, so classification is a prioritized substring table with an
//! explicit unclassified terminal. False negatives fall through to the raw
//! message (or a generic fallback when the message is unreadable).

use crate::error::EthereumError;

pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error occurred. Please try again.";

/// Canonical failure categories in classification priority order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// The user declined to sign in their wallet.
    UserRejected,
    /// The provider is rate-limiting requests.
    RateLimited,
    Unauthorized,
    InsufficientBalance,
    NonexistentProduct,
    TransferAlreadyPending,
    /// A revert reason extracted from the failure, returned verbatim.
    Reverted(String),
    /// No known signature matched; carries the raw provider message.
    Unclassified(String),
    /// The failure carried no usable message at all.
    Unknown,
}

/// Known failure signatures, checked in order. The contract's custom error
/// names show up as plain substrings in provider revert messages.
const KNOWN_SIGNATURES: &[(&str, FailureKind)] = &[
    ("User rejected the request", FailureKind::UserRejected),
    ("user rejected transaction", FailureKind::UserRejected),
    ("ACTION_REJECTED", FailureKind::UserRejected),
    ("Too Many Requests", FailureKind::RateLimited),
    ("rate limit", FailureKind::RateLimited),
    ("Unauthorized", FailureKind::Unauthorized),
    ("InsufficientBalance", FailureKind::InsufficientBalance),
    ("NonexistentProduct", FailureKind::NonexistentProduct),
    ("TransferAlreadyPending", FailureKind::TransferAlreadyPending),
];

impl FailureKind {
    /// Classify a failure that may carry a structured revert reason and/or a
    /// free-text message. A structured reason always wins and is preserved
    /// verbatim; with neither present the failure is [`FailureKind::Unknown`].
    #[must_use]
    pub fn classify(reason: Option<&str>, message: Option<&str>) -> Self {
        if let Some(reason) = reason {
            return Self::Reverted(reason.to_string());
        }
        match message {
            Some(message) => Self::classify_message(message),
            None => Self::Unknown,
        }
    }

    /// Classify a bare failure message.
    #[must_use]
    pub fn classify_message(message: &str) -> Self {
        for (pattern, kind) in KNOWN_SIGNATURES {
            if message.contains(pattern) {
                return kind.clone();
            }
        }
        if let Some(reason) = extract_revert_reason(message) {
            return Self::Reverted(reason);
        }
        Self::Unclassified(message.to_string())
    }

    /// Bridge from the crate error type. `Contract` carries an already
    /// decoded revert reason and is treated as structured.
    #[must_use]
    pub fn from_error(error: &EthereumError) -> Self {
        match error {
            EthereumError::Contract(reason) => Self::classify(Some(reason), None),
            other => Self::classify_message(&other.to_string()),
        }
    }

    /// The string shown to the user. Pure; classifying and rendering the
    /// same failure twice yields the same text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::UserRejected => "Transaction rejected by user.".to_string(),
            Self::RateLimited => {
                "The network is busy. Please wait a moment and try again.".to_string()
            }
            Self::Unauthorized => {
                "This account is not authorized to perform this action.".to_string()
            }
            Self::InsufficientBalance => {
                "Insufficient balance to complete this action.".to_string()
            }
            Self::NonexistentProduct => "This product does not exist.".to_string(),
            Self::TransferAlreadyPending => {
                "A transfer for this product is already pending.".to_string()
            }
            Self::Reverted(reason) => reason.clone(),
            Self::Unclassified(message) => {
                if looks_technical(message) {
                    UNKNOWN_ERROR_MESSAGE.to_string()
                } else {
                    message.clone()
                }
            }
            Self::Unknown => UNKNOWN_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Pull a human-readable revert reason out of a provider message.
fn extract_revert_reason(message: &str) -> Option<String> {
    const QUOTED: &str = "reverted with reason string '";
    if let Some(at) = message.find(QUOTED) {
        let rest = &message[at + QUOTED.len()..];
        if let Some(end) = rest.find('\'') {
            return Some(rest[..end].to_string());
        }
    }

    const PLAIN: &str = "execution reverted: ";
    if let Some(at) = message.find(PLAIN) {
        let rest = &message[at + PLAIN.len()..];
        let reason = rest
            .split(['"', '\n'])
            .next()
            .unwrap_or(rest)
            .trim()
            .trim_end_matches(',');
        if !reason.is_empty() {
            return Some(reason.to_string());
        }
    }

    None
}

/// Raw payloads and walls of text get replaced by the generic fallback.
fn looks_technical(message: &str) -> bool {
    if message.len() > 260 {
        return true;
    }
    if let Some(at) = message.find("0x") {
        let hex_run = message[at + 2..]
            .chars()
            .take_while(char::is_ascii_hexdigit)
            .count();
        if hex_run >= 32 {
            return true;
        }
    }
    false
}
