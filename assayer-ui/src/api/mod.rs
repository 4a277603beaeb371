//! API Access
//!
//! HTTP calls to the Assayer backend and browser downloads of the CSV
//! results it returns.

pub mod client;
pub mod download;

pub use client::*;
pub use download::download_bytes;
