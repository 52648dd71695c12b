pub mod constants;
pub mod dependency_parser;
pub mod document;
pub mod parser;
pub mod retokenizer;

pub use dependency_parser::DependencyParser;
pub use document::{Document, Field, GraphField, RawSentence};
pub use parser::DocumentParser;
pub use retokenizer::MultiWordMerger;
