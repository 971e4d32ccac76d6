pub mod clienthello;
pub mod error;
pub mod grease;
pub mod ja3;
mod reader;
pub mod types;
