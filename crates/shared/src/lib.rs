pub mod config;
pub mod diagnostics;
pub mod domain;
pub mod error;
pub mod protocol;
