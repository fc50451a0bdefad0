//! HTTP API module.
//!
//! A thin HTTP surface over the validation pipeline plus the log
//! broadcaster the pipeline reports through.

pub mod logs;
pub mod server;
pub mod types;

pub use logs::*;
pub use server::{router, start_server};
pub use types::*;
