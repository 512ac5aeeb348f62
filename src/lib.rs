//! # scrollshot
//!
//! A command-line tool that drives headless Chromium through one scripted
//! retail-search capture: navigate to the site, submit a search query,
//! auto-scroll the results page so lazy-loaded content renders, and write a
//! full-page screenshot to disk.
//!
//! The run is a single linear sequence with one bounded loop. The browser is
//! acquired in a scope that guarantees release on every exit path, waits are
//! bounded readiness polls rather than blind sleeps, and every failure maps
//! to a distinct [`SessionError`] kind.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scrollshot::{CaptureJob, Config, SessionDriver};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let driver = SessionDriver::new(Config::default());
//!
//!     let job = CaptureJob {
//!         url: "https://shop.example.com".to_string(),
//!         query: "iphone13".to_string(),
//!         output: "iphone13.png".into(),
//!         ..Default::default()
//!     };
//!
//!     let report = driver.run(&job).await?;
//!     println!("Captured {} bytes after {} scroll advances",
//!              report.bytes_written, report.scroll_advances);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## CLI Usage
//!
//! ### Single capture
//! ```bash
//! scrollshot capture --url https://shop.example.com --query iphone13 --output iphone13.png
//! ```
//!
//! ### Batch over a queries file
//! ```bash
//! scrollshot batch --input queries.txt --url https://shop.example.com --output shots/
//! ```

/// Configuration, capture jobs, and browser launch settings
pub mod config;

/// Error types for the capture session
pub mod error;

/// Session driver owning the browser for a capture run
pub mod session;

/// Scroll loop model and page-side scroll stepping
pub mod scroll;

/// Command-line interface implementation
pub mod cli;

/// Utility functions and helpers
pub mod utils;

#[cfg(test)]
mod tests;

pub use cli::*;
pub use config::*;
pub use error::*;
pub use scroll::*;
pub use session::*;
pub use utils::*;
