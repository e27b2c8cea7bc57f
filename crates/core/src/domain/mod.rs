pub mod finding;
pub mod ingredient;
pub mod profile;
pub mod routine;
pub mod rule;
