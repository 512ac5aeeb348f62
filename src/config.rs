//! Configuration management with serde serialization/deserialization
//!
//! This module provides all configuration structures for the capture tool,
//! including browser settings, wait/readiness parameters, scroll settings,
//! and output formats.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::SessionError;

/// Main configuration structure for the capture tool
///
/// Controls every aspect of a capture run: the browser viewport, navigation
/// and element-wait deadlines, content-readiness polling, the scroll loop,
/// and the output image format.
///
/// # Examples
///
/// ```rust
/// use scrollshot::Config;
///
/// // Use default configuration
/// let config = Config::default();
///
/// // Create custom configuration
/// let config = Config {
///     headless: false,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Browser viewport used for rendering (default: 1920x1080)
    pub viewport: Viewport,

    /// Deadline for opening and loading the target page (default: 30 seconds)
    pub navigation_timeout: Duration,

    /// Deadline for a waited-on selector to appear (default: 10 seconds)
    ///
    /// Applies to the results marker after the search is submitted. Expiry
    /// surfaces as [`SessionError::WaitTimeout`] naming the selector.
    pub wait_timeout: Duration,

    /// Content-readiness polling parameters
    pub readiness: ReadinessSettings,

    /// Scroll loop parameters
    pub scroll: ScrollSettings,

    /// Output image format for screenshots (default: PNG)
    pub output_format: OutputFormat,

    /// Path to Chrome/Chromium executable (default: auto-detect)
    pub chrome_path: Option<String>,

    /// Custom User-Agent string for requests (default: Chrome default)
    pub user_agent: Option<String>,

    /// Run the browser headless (default: true)
    pub headless: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            navigation_timeout: Duration::from_secs(30),
            wait_timeout: Duration::from_secs(10),
            readiness: ReadinessSettings::default(),
            scroll: ScrollSettings::default(),
            output_format: OutputFormat::Png,
            chrome_path: None,
            user_agent: None,
            headless: true,
        }
    }
}

impl Config {
    /// Validate the configuration, rejecting values the session cannot run with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.viewport.width == 0 || self.viewport.height == 0 {
            return Err(SessionError::ConfigurationError(
                "Viewport dimensions must be greater than 0".to_string(),
            ));
        }

        if self.scroll.step == 0 {
            return Err(SessionError::ConfigurationError(
                "Scroll step must be greater than 0".to_string(),
            ));
        }

        if self.readiness.deadline.is_zero() {
            return Err(SessionError::ConfigurationError(
                "Readiness deadline must be greater than 0".to_string(),
            ));
        }

        if self.navigation_timeout.is_zero() || self.wait_timeout.is_zero() {
            return Err(SessionError::ConfigurationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Browser viewport configuration
///
/// # Examples
///
/// ```rust
/// use scrollshot::Viewport;
///
/// // Desktop viewport (default)
/// let desktop = Viewport::default();
///
/// // Mobile viewport
/// let mobile = Viewport {
///     width: 375,
///     height: 667,
///     device_scale_factor: 2.0,
///     mobile: true,
/// };
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Viewport {
    /// Viewport width in pixels (default: 1920)
    pub width: u32,

    /// Viewport height in pixels (default: 1080)
    pub height: u32,

    /// Device pixel ratio for high-DPI displays (default: 1.0)
    pub device_scale_factor: f64,

    /// Whether to emulate a mobile device (default: false)
    pub mobile: bool,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            device_scale_factor: 1.0,
            mobile: false,
        }
    }
}

/// Content-readiness polling parameters
///
/// The session considers asynchronously rendered content ready once the
/// document height has stopped changing for a full quiet period. The poll is
/// bounded: if the height never settles before the deadline, the run fails
/// with [`SessionError::ContentNotReady`] instead of capturing a half-loaded
/// page.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ReadinessSettings {
    /// Interval between document-height samples (default: 200ms)
    pub poll_interval: Duration,

    /// How long the height must hold still to count as settled (default: 800ms)
    pub quiet_period: Duration,

    /// Upper bound on the whole poll (default: 10 seconds)
    pub deadline: Duration,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            quiet_period: Duration::from_millis(800),
            deadline: Duration::from_secs(10),
        }
    }
}

/// Scroll loop parameters
///
/// Each iteration advances the page's vertical offset by `step` pixels and
/// then pauses for `step_delay`, which is the window in which lazy-loaded
/// results render before the next advance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrollSettings {
    /// Pixels advanced per iteration (default: 500)
    pub step: u32,

    /// Pause after each advance (default: 500ms)
    pub step_delay: Duration,
}

impl Default for ScrollSettings {
    fn default() -> Self {
        Self {
            step: 500,
            step_delay: Duration::from_millis(500),
        }
    }
}

/// Supported output image formats for screenshots
///
/// Each format has different characteristics:
/// - PNG: Lossless compression, larger files, best quality
/// - JPEG: Lossy compression, smaller files, good for photos
/// - WebP: Modern format with excellent compression and quality
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub enum OutputFormat {
    /// PNG format - lossless compression, best quality
    Png,
    /// JPEG format - lossy compression, smaller files
    Jpeg,
    /// WebP format - modern compression, good balance of size and quality
    Webp,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Webp => "webp",
        }
    }
}

/// CSS selectors driving the search interaction
///
/// The defaults target the retail site the tool was originally written
/// against; every field can be overridden per job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchSelectors {
    /// The search input field
    pub input: String,

    /// The control that submits the search
    pub submit: String,

    /// The element whose presence signals that results have rendered
    pub results_marker: String,
}

impl Default for SearchSelectors {
    fn default() -> Self {
        Self {
            input: "#key".to_string(),
            submit: ".button".to_string(),
            results_marker: ".gl-item".to_string(),
        }
    }
}

/// One search-and-capture job
#[derive(Debug, Clone)]
pub struct CaptureJob {
    pub id: String,
    pub url: String,
    pub query: String,
    pub selectors: SearchSelectors,
    pub output: PathBuf,
    pub full_page: bool,
    pub custom_viewport: Option<Viewport>,
}

impl Default for CaptureJob {
    fn default() -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: String::new(),
            query: String::new(),
            selectors: SearchSelectors::default(),
            output: PathBuf::from("capture.png"),
            full_page: true,
            custom_viewport: None,
        }
    }
}

/// Outcome of a completed capture job
#[derive(Debug, Clone, Serialize)]
pub struct CaptureReport {
    pub job_id: String,
    pub url: String,
    pub final_url: Option<String>,
    pub page_title: Option<String>,
    pub bytes_written: usize,
    pub format: OutputFormat,
    pub scroll_advances: usize,
    pub duration: Duration,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Generate Chrome command-line arguments based on configuration
///
/// # Examples
///
/// ```rust
/// use scrollshot::{Config, get_chrome_args};
///
/// let config = Config::default();
/// let args = get_chrome_args(&config);
/// println!("Chrome will be launched with {} arguments", args.len());
/// ```
pub fn get_chrome_args(config: &Config) -> Vec<String> {
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--disable-gpu".to_string(),
        "--disable-background-timer-throttling".to_string(),
        "--disable-backgrounding-occluded-windows".to_string(),
        "--disable-renderer-backgrounding".to_string(),
        "--disable-extensions".to_string(),
        "--disable-default-apps".to_string(),
        "--disable-sync".to_string(),
        "--no-first-run".to_string(),
        "--hide-scrollbars".to_string(),
        "--mute-audio".to_string(),
        format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        ),
    ];

    if config.headless {
        args.push("--headless=new".to_string());
    } else {
        // Visible runs get the maximized window the original workflow used.
        args.push("--start-maximized".to_string());
    }

    if let Some(user_agent) = &config.user_agent {
        args.push(format!("--user-agent={user_agent}"));
    }

    args
}

pub fn create_browser_config(
    config: &Config,
) -> Result<chromiumoxide::browser::BrowserConfig, SessionError> {
    use chromiumoxide::browser::BrowserConfig;

    let mut builder = BrowserConfig::builder()
        .window_size(config.viewport.width, config.viewport.height)
        .args(get_chrome_args(config));

    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(chrome_path) = &config.chrome_path {
        builder = builder.chrome_executable(chrome_path);
    }

    builder.build().map_err(SessionError::ConfigurationError)
}
