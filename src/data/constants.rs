//! Field names used in Odinson-style documents

pub const FIELD_WORD: &str = "word";
pub const FIELD_RAW: &str = "raw";
pub const FIELD_LEMMA: &str = "lemma";
pub const FIELD_TAG: &str = "tag";
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_DEPENDENCIES: &str = "dependencies";
