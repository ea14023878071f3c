pub mod scanner;
pub mod table;

pub use scanner::{category_weight, KeywordScanner};
pub use table::{KeywordLoadError, KeywordTable};
