//! Video Paths Manager
//!
//! Terminal editor for the JSON list of directories a video player scans,
//! plus the flag that decides whether their subfolders are included.

pub mod app;
pub mod config;
pub mod picker;
pub mod scan;
pub mod store;

// Re-export commonly used types
pub use app::App;
pub use config::Config;
pub use store::{LoadReport, StoreError, VideoPaths};

/// Current version of the application
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
