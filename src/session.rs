//! Session driver owning the browser for a capture run
//!
//! This module provides the [`Session`] (a scoped browser acquisition that is
//! released on every exit path) and the [`SessionDriver`] that executes the
//! capture sequence: navigate, submit the search, wait for results, settle,
//! auto-scroll, screenshot.

use std::path::Path;
use std::time::Instant;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use futures::StreamExt;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use crate::config::{CaptureJob, CaptureReport, Config, OutputFormat};
use crate::error::SessionError;
use crate::scroll::{step_script, ScrollSnapshot};
use crate::utils::validate_url;

/// A launched browser bound to the lifetime of one run.
///
/// `close` tears down both the CDP connection and the Chromium process; the
/// driver calls it on success and failure alike so a failed step never leaks
/// a browser.
pub struct Session {
    browser: Browser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl Session {
    pub async fn launch(config: &Config) -> Result<Self, SessionError> {
        let browser_config = crate::config::create_browser_config(config)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| SessionError::BrowserLaunchFailed(e.to_string()))?;

        // The handler stream must be polled for the CDP connection to make
        // progress; it runs until the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Browser handler error: {e}");
                }
            }
        });

        info!("Browser session started");

        Ok(Self {
            browser,
            handler_task,
        })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub async fn close(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Failed to close browser: {e}");
        }
        self.handler_task.abort();
        info!("Browser session closed");
    }
}

/// Executes capture jobs as one linear sequence per job.
///
/// # Examples
///
/// ```rust,no_run
/// use scrollshot::{CaptureJob, Config, SessionDriver};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let driver = SessionDriver::new(Config::default());
///
///     let job = CaptureJob {
///         url: "https://example.com".to_string(),
///         query: "laptop".to_string(),
///         ..Default::default()
///     };
///     let report = driver.run(&job).await?;
///     println!("Captured {} bytes", report.bytes_written);
///
///     Ok(())
/// }
/// ```
pub struct SessionDriver {
    config: Config,
}

impl SessionDriver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run a single job in its own browser session.
    pub async fn run(&self, job: &CaptureJob) -> Result<CaptureReport, SessionError> {
        validate_url(&job.url).map_err(|_| SessionError::InvalidUrl(job.url.clone()))?;

        let session = Session::launch(&self.config).await?;
        let outcome = self.drive(&session, job).await;
        session.close().await;
        outcome
    }

    /// Run jobs sequentially over one browser session.
    ///
    /// Stops at the first failing job; the session is closed either way.
    pub async fn run_all(&self, jobs: &[CaptureJob]) -> Result<Vec<CaptureReport>, SessionError> {
        for job in jobs {
            validate_url(&job.url).map_err(|_| SessionError::InvalidUrl(job.url.clone()))?;
        }

        let session = Session::launch(&self.config).await?;

        let mut reports = Vec::with_capacity(jobs.len());
        let mut failure = None;

        for job in jobs {
            match self.drive(&session, job).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    warn!(job_id = %job.id, query = %job.query, "Job failed: {e}");
                    failure = Some(e);
                    break;
                }
            }
        }

        session.close().await;

        match failure {
            Some(e) => Err(e),
            None => Ok(reports),
        }
    }

    async fn drive(
        &self,
        session: &Session,
        job: &CaptureJob,
    ) -> Result<CaptureReport, SessionError> {
        let start = Instant::now();
        info!(url = %job.url, query = %job.query, "Starting capture");

        let nav_timeout = self.config.navigation_timeout;
        let page = timeout(nav_timeout, session.browser().new_page(job.url.as_str()))
            .await
            .map_err(|_| SessionError::Timeout(nav_timeout))?
            .map_err(|e| SessionError::NavigationFailed(e.to_string()))?;

        let result = self.capture(&page, job, start).await;

        let _ = page.close().await;

        result
    }

    async fn capture(
        &self,
        page: &Page,
        job: &CaptureJob,
        start: Instant,
    ) -> Result<CaptureReport, SessionError> {
        self.apply_viewport(page, job).await?;

        let nav_timeout = self.config.navigation_timeout;
        timeout(nav_timeout, page.wait_for_navigation())
            .await
            .map_err(|_| SessionError::Timeout(nav_timeout))?
            .map_err(|e| SessionError::NavigationFailed(e.to_string()))?;

        self.submit_query(page, job).await?;

        self.await_results(page, &job.selectors.results_marker)
            .await?;

        // Above-the-fold results render asynchronously after the marker
        // appears; wait for the document height to settle before scrolling.
        self.wait_for_content_ready(page).await?;

        let scroll_advances = self.scroll_to_bottom(page).await?;

        // The final advances may have revealed rows that are still loading.
        self.wait_for_content_ready(page).await?;

        let page_title = page.get_title().await.unwrap_or_default();
        let final_url = page.url().await.unwrap_or(None);

        let data = self.screenshot(page, job).await?;
        let bytes_written = self.save(&job.output, &data).await?;

        info!(
            output = %job.output.display(),
            bytes = bytes_written,
            scroll_advances,
            "Capture complete"
        );

        Ok(CaptureReport {
            job_id: job.id.clone(),
            url: job.url.clone(),
            final_url,
            page_title,
            bytes_written,
            format: self.config.output_format.clone(),
            scroll_advances,
            duration: start.elapsed(),
            timestamp: chrono::Utc::now(),
        })
    }

    async fn apply_viewport(&self, page: &Page, job: &CaptureJob) -> Result<(), SessionError> {
        let viewport = job.custom_viewport.as_ref().unwrap_or(&self.config.viewport);

        let emulation = SetDeviceMetricsOverrideParams::builder()
            .width(viewport.width)
            .height(viewport.height)
            .device_scale_factor(viewport.device_scale_factor)
            .mobile(viewport.mobile)
            .build()
            .map_err(|e| SessionError::ConfigurationError(e.to_string()))?;

        page.execute(emulation)
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;

        Ok(())
    }

    async fn submit_query(&self, page: &Page, job: &CaptureJob) -> Result<(), SessionError> {
        let selectors = &job.selectors;

        let input = page
            .find_element(selectors.input.as_str())
            .await
            .map_err(|_| SessionError::ElementNotFound(selectors.input.clone()))?;
        input
            .click()
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;
        // Per-character injection so site-side key listeners fire the way
        // they would for a human typist.
        input
            .type_str(&job.query)
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;

        let submit = page
            .find_element(selectors.submit.as_str())
            .await
            .map_err(|_| SessionError::ElementNotFound(selectors.submit.clone()))?;
        submit
            .click()
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;

        debug!(query = %job.query, "Search submitted");
        Ok(())
    }

    /// Poll for the results marker until it appears or the wait deadline
    /// expires.
    async fn await_results(&self, page: &Page, selector: &str) -> Result<(), SessionError> {
        let waited = self.config.wait_timeout;
        let poll_interval = self.config.readiness.poll_interval;
        let deadline = Instant::now() + waited;

        loop {
            if page.find_element(selector).await.is_ok() {
                debug!(selector, "Results marker present");
                return Ok(());
            }

            if Instant::now() >= deadline {
                return Err(SessionError::WaitTimeout {
                    selector: selector.to_string(),
                    waited,
                });
            }

            sleep(poll_interval).await;
        }
    }

    /// Poll the document height until it holds still for the configured
    /// quiet period, bounded by the readiness deadline.
    async fn wait_for_content_ready(&self, page: &Page) -> Result<(), SessionError> {
        let settings = self.config.readiness.clone();
        let deadline = Instant::now() + settings.deadline;
        let mut last_height: Option<i64> = None;
        let mut stable_since = Instant::now();

        loop {
            let snapshot = self.scroll_snapshot(page, 0).await?;
            let height = snapshot.page_height as i64;

            if last_height == Some(height) {
                if stable_since.elapsed() >= settings.quiet_period {
                    debug!(height, "Document height settled");
                    return Ok(());
                }
            } else {
                last_height = Some(height);
                stable_since = Instant::now();
            }

            if Instant::now() >= deadline {
                return Err(SessionError::ContentNotReady {
                    waited: settings.deadline,
                });
            }

            sleep(settings.poll_interval).await;
        }
    }

    /// Advance the page one step at a time until the viewport reaches the
    /// bottom, pausing after each advance so lazy-loaded content renders.
    ///
    /// Returns the number of advances performed. The page height is re-read
    /// every iteration because loading content grows it.
    async fn scroll_to_bottom(&self, page: &Page) -> Result<usize, SessionError> {
        let scroll = self.config.scroll.clone();
        let mut snapshot = self.scroll_snapshot(page, 0).await?;
        let mut advances = 0usize;

        while snapshot.has_more() {
            snapshot = self.scroll_snapshot(page, scroll.step).await?;
            advances += 1;
            debug!(
                offset = snapshot.offset,
                height = snapshot.page_height,
                "Scrolled"
            );
            sleep(scroll.step_delay).await;
        }

        info!(advances, "Reached page bottom");
        Ok(advances)
    }

    async fn scroll_snapshot(
        &self,
        page: &Page,
        step: u32,
    ) -> Result<ScrollSnapshot, SessionError> {
        let result = page
            .evaluate(step_script(step))
            .await
            .map_err(|e| SessionError::EvaluationFailed(e.to_string()))?;

        let snapshot = result.into_value::<ScrollSnapshot>()?;
        Ok(snapshot)
    }

    async fn screenshot(&self, page: &Page, job: &CaptureJob) -> Result<Vec<u8>, SessionError> {
        let mut params = ScreenshotParams::builder().format(CaptureScreenshotFormat::Png);
        if job.full_page {
            params = params.full_page(true);
        }

        let png_data = page
            .screenshot(params.build())
            .await
            .map_err(|e| SessionError::CaptureFailed(e.to_string()))?;

        self.convert_image_format(png_data)
    }

    fn convert_image_format(&self, png_data: Vec<u8>) -> Result<Vec<u8>, SessionError> {
        let target = match self.config.output_format {
            OutputFormat::Png => return Ok(png_data),
            OutputFormat::Jpeg => image::ImageFormat::Jpeg,
            OutputFormat::Webp => image::ImageFormat::WebP,
        };

        let img = image::load_from_memory(&png_data)
            .map_err(|e| SessionError::CaptureFailed(e.to_string()))?;

        let mut converted = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut converted), target)
            .map_err(|e| SessionError::CaptureFailed(e.to_string()))?;

        Ok(converted)
    }

    async fn save(&self, path: &Path, data: &[u8]) -> Result<usize, SessionError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Overwrites any existing capture at the same path.
        tokio::fs::write(path, data).await?;
        Ok(data.len())
    }
}
