//! Matchmakr candidate browser.
//!
//! Browse candidate profiles fetched from the matchmakr backend, narrow them
//! with single-select filters and record interest or pass decisions.

pub mod api_client;
pub mod browser;
pub mod config;
pub mod errors;
pub mod models;
pub mod session;
pub mod terminal;

pub use api_client::ApiClient;
pub use browser::{BrowserState, BrowserView, LoadState};
pub use config::Config;
pub use session::Session;
