pub mod category;
pub mod document;
pub mod scores;

pub use category::Category;
pub use document::{Document, RawRecord};
pub use scores::{CategoryScores, Prediction};
