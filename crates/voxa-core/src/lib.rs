pub mod classifier;
pub mod extractor;
pub mod scorer;
pub mod suggest;

pub use classifier::{classify, Classification};
pub use extractor::{extract, required_parameters};
pub use scorer::score;
