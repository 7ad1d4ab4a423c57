//! Toast derivation from decoded notices
//!
//! The dashboard server pushes legacy toast lines as plain text in the form
//! `"<message> (<severity>)"` (it formats them as
//! `Category: Message (severity)`; the category stays inside the message
//! body). The severity vocabulary is open: the four tokens the server is
//! known to emit are named constants, anything else passes through verbatim
//! for the renderer to map.

use crate::notice::Notice;

/// Severity label controlling a toast's visual treatment
///
/// An open string vocabulary, not a closed enum: legacy severities are
/// embedded in free text and the policy treats them as opaque tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Severity(String);

impl Severity {
    /// Neutral informational message
    pub const INFO: &'static str = "info";
    /// Successful operation
    pub const SUCCESS: &'static str = "success";
    /// Non-critical issue
    pub const WARNING: &'static str = "warning";
    /// Error or failure
    pub const DANGER: &'static str = "danger";

    /// Create a severity from a free-form token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The severity token as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is one of the tokens the server is known to emit
    pub fn is_known(&self) -> bool {
        matches!(
            self.0.as_str(),
            Self::INFO | Self::SUCCESS | Self::WARNING | Self::DANGER
        )
    }
}

impl Default for Severity {
    fn default() -> Self {
        Self(Self::INFO.to_string())
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Severity {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// A transient notification ready for rendering
///
/// The message is rendered as-is; the server is the trusted origin of these
/// strings and no sanitization happens here. Callers injecting the message
/// into markup must sanitize at the render boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastDescriptor {
    /// Text to display
    pub message: String,
    /// Visual classification
    pub severity: Severity,
}

/// Derives transient-notification descriptors from decoded notices
pub struct ToastPolicy;

impl ToastPolicy {
    /// Derive a toast from a notice, if one should be shown
    ///
    /// Structured events produce no toast: they are consumed by their
    /// dedicated handlers (e.g. `connection-status` feeds the connection
    /// state store). Plain text goes through the legacy grammar.
    pub fn derive(notice: &Notice) -> Option<ToastDescriptor> {
        match notice {
            Notice::PlainText { text } => Some(Self::from_legacy_text(text)),
            Notice::Structured { .. } => None,
        }
    }

    /// Apply the legacy `"<message> (<severity>)"` grammar to a text line
    ///
    /// Splits on the FIRST `(` when the text contains both `(` and `)`: the
    /// left part, trimmed, is the message; the remainder with exactly one
    /// trailing `)` stripped, trimmed, is the severity token. Later
    /// parentheses stay verbatim inside the severity token; the legacy
    /// format is ambiguous here and the first `(` always wins. Without a
    /// paren pair the whole text is the message and severity defaults to
    /// `info`. Total: no input panics or errors.
    pub fn from_legacy_text(text: &str) -> ToastDescriptor {
        match text.find('(') {
            Some(open) if text.contains(')') => {
                let message = text[..open].trim().to_string();
                let rest = text[open + 1..].trim_end();
                let token = rest.strip_suffix(')').unwrap_or(rest).trim();
                ToastDescriptor {
                    message,
                    severity: Severity::new(token),
                }
            }
            _ => ToastDescriptor {
                message: text.to_string(),
                severity: Severity::default(),
            },
        }
    }
}
