pub mod types;

pub use types::{ClassificationRequest, ClassificationResult, Label, UNKNOWN_SENDER};
