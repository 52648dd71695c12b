pub mod sentence;
pub mod sentiments;
pub mod span;
pub mod token;

pub use sentence::Sentence;
pub use sentiments::AspectSentiments;
pub use span::Span;
pub use token::Token;
