//! Spam scoring: a small weighted heuristic, not a learned classifier.

use lazy_static::lazy_static;
use regex::Regex;

const SPAM_WORDS: [&str; 7] = ["free", "win", "winner", "prize", "claim", "limited", "urgent"];

lazy_static! {
    static ref PUNCT_RUN: Regex = Regex::new(r"[!?]{3,}").unwrap();
    static ref URL_PATTERN: Regex = Regex::new(r"(?i)https?://").unwrap();
    static ref SPAM_WORD_PATTERN: Regex = {
        let alternation = SPAM_WORDS.join("|");
        Regex::new(&format!(r"(?i)\b({alternation})\b")).unwrap()
    };
}

/// Longest run of any single repeated character.
fn longest_char_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut last: Option<char> = None;
    for ch in text.chars() {
        if Some(ch) == last {
            current += 1;
        } else {
            current = 1;
            last = Some(ch);
        }
        longest = longest.max(current);
    }
    longest
}

fn uppercase_ratio(text: &str) -> f64 {
    let alpha: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.is_empty() {
        return 0.0;
    }
    let upper = alpha.iter().filter(|c| c.is_uppercase()).count();
    upper as f64 / alpha.len() as f64
}

/// Weighted heuristic score; [`is_spam`] is `score >= 3`.
pub fn spam_score(text: &str) -> u32 {
    let mut score = 0;

    if text.len() > 10 && uppercase_ratio(text) > 0.7 {
        score += 2;
    }

    if longest_char_run(text) >= 5 {
        score += 2;
    }

    if PUNCT_RUN.is_match(text) {
        score += 1;
    }

    let url_count = URL_PATTERN.find_iter(text).count() as u32;
    if url_count > 2 {
        score += url_count;
    }

    if SPAM_WORD_PATTERN.is_match(text) {
        score += 1;
    }

    score
}

pub fn is_spam(text: &str) -> bool {
    spam_score(text) >= 3
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_message_is_not_spam() {
        assert!(!is_spam("hey, how's it going today?"));
    }

    #[test]
    fn shouting_plus_punctuation_is_spam() {
        assert!(is_spam("THIS IS AMAZING!!! DON'T MISS OUT!!!"));
    }

    #[test]
    fn repeated_char_run_scores() {
        assert_eq!(spam_score("soooooo good"), 2);
    }

    #[test]
    fn many_links_scores_by_count() {
        let text = "http://a.com http://b.com http://c.com http://d.com";
        assert!(spam_score(text) >= 4);
    }

    #[test]
    fn single_spam_word_alone_is_not_spam() {
        assert!(!is_spam("you could win a free gift"));
    }

    #[test]
    fn short_all_caps_does_not_trigger_case_rule() {
        assert_eq!(spam_score("OK"), 0);
    }
}
