pub mod error;
pub mod mapping;
