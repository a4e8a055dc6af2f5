pub mod error;
pub mod resolution;
