use std::collections::BTreeSet;

use crate::domain::{ClassificationResult, Label};

use super::table::KeywordTable;

pub const PHISHING_THRESHOLD: u32 = 5;
pub const SUSPICIOUS_THRESHOLD: u32 = 2;

pub const PHISHING_CONFIDENCE: f64 = 0.8;
pub const SUSPICIOUS_CONFIDENCE: f64 = 0.5;
pub const SAFE_CONFIDENCE: f64 = 0.4;

pub const SAFE_REASON: &str = "No high-risk phishing signatures detected in the text.";

/// Severity of a keyword category. Unlisted categories weigh 1.
pub fn category_weight(category: &str) -> u32 {
    match category {
        "Urgency" => 5,
        "Financial" => 4,
        "Crypto" => 5,
        "Government" => 5,
        "Security/Account" => 3,
        "IT/Admin" => 3,
        "Workplace" => 2,
        "Legal" => 4,
        "E-commerce" => 2,
        "Generic/Suspicious" => 2,
        "Social" => 1,
        _ => 1,
    }
}

/// Offline classifier over a shared, immutable [`KeywordTable`].
#[derive(Debug, Clone)]
pub struct KeywordScanner {
    table: KeywordTable,
}

impl KeywordScanner {
    pub fn new(table: KeywordTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &KeywordTable {
        &self.table
    }

    /// Sums the weights of every phrase contained in `text` (case-insensitive
    /// substring match) and maps the score onto a label.
    pub fn scan(&self, text: &str) -> ClassificationResult {
        let (score, categories) = self.score(text);
        verdict(score, &categories)
    }

    pub fn score(&self, text: &str) -> (u32, BTreeSet<String>) {
        let lowered = text.to_lowercase();
        let mut score = 0u32;
        let mut categories = BTreeSet::new();

        for (phrase, category) in self.table.iter() {
            if lowered.contains(phrase) {
                score = score.saturating_add(category_weight(category));
                categories.insert(category.to_string());
            }
        }

        (score, categories)
    }
}

fn verdict(score: u32, categories: &BTreeSet<String>) -> ClassificationResult {
    let themes = categories
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    if score >= PHISHING_THRESHOLD {
        ClassificationResult {
            label: Label::Phishing,
            reason: format!("High risk detected. Matches themes: {themes}."),
            confidence: PHISHING_CONFIDENCE,
        }
    } else if score >= SUSPICIOUS_THRESHOLD {
        ClassificationResult {
            label: Label::Suspicious,
            reason: format!("Caution: Found {themes} related phrases."),
            confidence: SUSPICIOUS_CONFIDENCE,
        }
    } else {
        ClassificationResult {
            label: Label::Safe,
            reason: SAFE_REASON.to_string(),
            confidence: SAFE_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(entries: &[(&str, &str)]) -> KeywordScanner {
        KeywordScanner::new(KeywordTable::from_entries(entries.iter().copied()))
    }

    #[test]
    fn weights_default_to_one_for_unknown_categories() {
        assert_eq!(category_weight("Crypto"), 5);
        assert_eq!(category_weight("Security/Account"), 3);
        assert_eq!(category_weight("Social"), 1);
        assert_eq!(category_weight("Astrology"), 1);
        assert_eq!(category_weight("crypto"), 1);
    }

    #[test]
    fn end_to_end_example_scores_thirteen() {
        let scanner = scanner(&[
            ("verify your account", "Security/Account"),
            ("bitcoin", "Crypto"),
            ("government", "Government"),
        ]);
        let text =
            "Verify your account immediately or your Bitcoin will be seized by the government.";

        assert_eq!(scanner.score(text).0, 13);
        let result = scanner.scan(text);
        assert_eq!(result.label, Label::Phishing);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(
            result.reason,
            "High risk detected. Matches themes: Crypto, Government, Security/Account."
        );
    }

    #[test]
    fn score_of_exactly_five_is_phishing() {
        let scanner = scanner(&[("bitcoin", "Crypto")]);
        let result = scanner.scan("send bitcoin");
        assert_eq!(result.label, Label::Phishing);
        assert_eq!(result.confidence, PHISHING_CONFIDENCE);
    }

    #[test]
    fn score_of_four_is_suspicious() {
        let scanner = scanner(&[("invoice", "Financial")]);
        let result = scanner.scan("Your invoice is attached");
        assert_eq!(result.label, Label::Suspicious);
    }

    #[test]
    fn score_of_exactly_two_is_suspicious() {
        let scanner = scanner(&[("your order", "E-commerce")]);
        let result = scanner.scan("About your order");
        assert_eq!(result.label, Label::Suspicious);
        assert_eq!(result.confidence, SUSPICIOUS_CONFIDENCE);
        assert_eq!(result.reason, "Caution: Found E-commerce related phrases.");
    }

    #[test]
    fn score_of_one_is_safe() {
        let scanner = scanner(&[("friend request", "Social")]);
        let result = scanner.scan("You have a new friend request");
        assert_eq!(result.label, Label::Safe);
        assert_eq!(result.confidence, SAFE_CONFIDENCE);
        assert_eq!(result.reason, SAFE_REASON);
    }

    #[test]
    fn matching_ignores_case() {
        let scanner = scanner(&[("verify your account", "Security/Account")]);
        assert_eq!(
            scanner.scan("VERIFY YOUR ACCOUNT"),
            scanner.scan("verify your account")
        );
    }

    #[test]
    fn empty_text_is_safe() {
        let scanner = scanner(&[("bitcoin", "Crypto")]);
        let result = scanner.scan("");
        assert_eq!(result.label, Label::Safe);
        assert_eq!(result.confidence, 0.4);
        assert_eq!(result.reason, SAFE_REASON);
    }

    #[test]
    fn empty_table_always_reports_safe() {
        let scanner = KeywordScanner::new(KeywordTable::default());
        let result = scanner.scan("URGENT: wire bitcoin to the government now");
        assert_eq!(result.label, Label::Safe);
        assert_eq!(result.confidence, SAFE_CONFIDENCE);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let scanner = scanner(&[("gift card", "Generic/Suspicious"), ("urgent", "Urgency")]);
        let text = "Urgent: buy a gift card";
        let first = scanner.scan(text);
        for _ in 0..10 {
            assert_eq!(scanner.scan(text), first);
        }
    }
}
