use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_SENDER: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Phishing,
    Suspicious,
    Safe,
}

impl Label {
    pub fn as_str(&self) -> &'static str {
        match self {
            Label::Phishing => "phishing",
            Label::Suspicious => "suspicious",
            Label::Safe => "safe",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for Label {
    type Err = UnknownLabel;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "phishing" => Ok(Label::Phishing),
            "suspicious" => Ok(Label::Suspicious),
            "safe" => Ok(Label::Safe),
            _ => Err(UnknownLabel(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassificationRequest {
    pub sender: String,
    pub text: String,
}

impl ClassificationRequest {
    pub fn new(sender: Option<String>, text: Option<String>) -> Self {
        Self {
            sender: sender.unwrap_or_else(|| UNKNOWN_SENDER.to_string()),
            text: text.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub label: Label,
    pub reason: String,
    pub confidence: f64,
}
