//! PhotoMark command-line shell.
//!
//! Wires the editor and renderer to files on disk and to the project API.

pub mod commands;
pub mod config;
pub mod error;
pub mod http;

pub use config::AppConfig;
pub use error::CliError;
pub use http::HttpClient;
