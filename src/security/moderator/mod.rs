//! Pure, side-effect-free content classification.
//!
//! Three operations on a text string: [`is_spam`], [`check`], and [`mask`].
//! None of them touch the network, a clock, or storage — callers append the
//! verdict to the message log themselves.

mod profanity;
mod spam;

pub use profanity::{check, mask};
pub use spam::{is_spam, spam_score};

/// Outcome of [`check`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Clean,
    Warning,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub severity: Severity,
    pub reason: Option<String>,
}

impl Verdict {
    fn clean() -> Self {
        Verdict {
            severity: Severity::Clean,
            reason: None,
        }
    }
}
