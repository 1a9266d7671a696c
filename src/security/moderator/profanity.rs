//! Profanity classification: blocked vs. warning vs. clean, plus masking.
//!
//! Pattern membership is a policy decision, not a correctness property;
//! callers should test classification by example rather than by pattern.

use super::{Severity, Verdict};
use lazy_static::lazy_static;
use regex::Regex;

struct Pattern {
    reason: &'static str,
    regex: Regex,
}

fn word(terms: &[&str]) -> Regex {
    let alternation = terms.join("|");
    Regex::new(&format!(r"(?i)\b({alternation})\w*")).unwrap()
}

lazy_static! {
    static ref BLOCKED: Vec<Pattern> = vec![
        Pattern {
            reason: "explicit term",
            regex: word(&["fuck", "f[u\\*@]ck", "shit", "cunt"]),
        },
        Pattern {
            reason: "slur",
            regex: word(&["n[i1]gg[e3]r", "f[a4]gg[o0]t"]),
        },
        Pattern {
            reason: "violent threat",
            regex: Regex::new(r"(?i)\b(i'?m going to|i will|gonna) (kill|hurt|murder) (you|u)\b")
                .unwrap(),
        },
        Pattern {
            reason: "leetspeak variant",
            regex: Regex::new(r"(?i)\bf[\*u]ck|\bsh[\*i]t\b").unwrap(),
        },
        Pattern {
            reason: "long character run",
            regex: Regex::new(r"(.)\1{9,}").unwrap(),
        },
    ];
    static ref WARNING: Vec<Pattern> = vec![Pattern {
        reason: "mild pejorative",
        regex: word(&["idiot", "stupid", "dumb", "moron", "loser"]),
    }];
    static ref URL_RE: Regex = Regex::new(r"(?i)https?://\S+").unwrap();
}

/// Classify `text`, returning the first matching blocked pattern, else the
/// first matching warning pattern, else clean.
pub fn check(text: &str) -> Verdict {
    if URL_RE.find_iter(text).count() >= 3 {
        return Verdict {
            severity: Severity::Blocked,
            reason: Some("multiple urls".to_string()),
        };
    }
    for pattern in BLOCKED.iter() {
        if pattern.regex.is_match(text) {
            return Verdict {
                severity: Severity::Blocked,
                reason: Some(pattern.reason.to_string()),
            };
        }
    }
    for pattern in WARNING.iter() {
        if pattern.regex.is_match(text) {
            return Verdict {
                severity: Severity::Warning,
                reason: Some(pattern.reason.to_string()),
            };
        }
    }
    Verdict::clean()
}

/// Replace every matched span (blocked or warning) with `*` of the same
/// length. Used to rewrite `warning`-severity text before relay.
pub fn mask(text: &str) -> String {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for pattern in BLOCKED.iter().chain(WARNING.iter()) {
        for m in pattern.regex.find_iter(text) {
            spans.push((m.start(), m.end()));
        }
    }
    spans.sort_unstable();

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    for (start, end) in spans {
        if start < cursor {
            continue;
        }
        out.push_str(&text[cursor..start]);
        out.extend(std::iter::repeat_n('*', text[start..end].chars().count()));
        cursor = end;
    }
    out.push_str(&text[cursor..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_passes() {
        assert_eq!(check("have a great day").severity, Severity::Clean);
    }

    #[test]
    fn explicit_term_is_blocked() {
        let v = check("you fucking idiot");
        assert_eq!(v.severity, Severity::Blocked);
        assert_eq!(v.reason.as_deref(), Some("explicit term"));
    }

    #[test]
    fn mild_pejorative_is_warning() {
        let v = check("you are such an idiot");
        assert_eq!(v.severity, Severity::Warning);
    }

    #[test]
    fn long_character_run_is_blocked() {
        let v = check("aaaaaaaaaaaaaaa");
        assert_eq!(v.severity, Severity::Blocked);
    }

    #[test]
    fn mask_preserves_length_and_hides_content() {
        let masked = mask("you are such an idiot");
        assert_eq!(masked.len(), "you are such an idiot".len());
        assert!(!masked.contains("idiot"));
    }
}
