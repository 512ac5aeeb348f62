use crate::{
    format_bytes, format_duration, sanitize_filename, CaptureJob, CaptureReport, Config,
    OutputFormat, SearchSelectors, SessionDriver, Viewport,
};
use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio::fs;
use tracing::info;

#[derive(Parser)]
#[command(name = "scrollshot")]
#[command(about = "Search a retail site, auto-scroll the results, capture a full-page screenshot")]
#[command(version = "0.1.0")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, help = "Configuration file path")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Navigation timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Selector wait timeout in seconds")]
    pub wait_timeout: Option<u64>,

    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(long, help = "Chrome executable path")]
    pub chrome_path: Option<String>,

    #[arg(long, help = "Run with a visible browser window")]
    pub headed: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search once and capture the scrolled results page
    Capture {
        #[arg(short, long, help = "Target site URL")]
        url: String,

        #[arg(short, long, help = "Search query to submit")]
        query: String,

        #[arg(short, long, help = "Output file path")]
        output: PathBuf,

        #[arg(long, help = "CSS selector of the search input")]
        search_input: Option<String>,

        #[arg(long, help = "CSS selector of the submit control")]
        submit: Option<String>,

        #[arg(long, help = "CSS selector that marks rendered results")]
        results: Option<String>,

        #[arg(long, help = "Output format (png, jpeg, webp)")]
        format: Option<String>,

        #[arg(long, help = "Viewport width")]
        width: Option<u32>,

        #[arg(long, help = "Viewport height")]
        height: Option<u32>,

        #[arg(long, help = "Capture only the visible viewport instead of the full page")]
        viewport_only: bool,

        #[arg(long, help = "Scroll step in pixels")]
        scroll_step: Option<u32>,

        #[arg(long, help = "Delay between scroll steps in milliseconds")]
        scroll_delay: Option<u64>,
    },

    /// Run one capture per query from a file, against the same site
    Batch {
        #[arg(short, long, help = "Input file containing queries (one per line)")]
        input: PathBuf,

        #[arg(short, long, help = "Target site URL")]
        url: String,

        #[arg(short, long, help = "Output directory for screenshots")]
        output: PathBuf,

        #[arg(long, help = "CSS selector of the search input")]
        search_input: Option<String>,

        #[arg(long, help = "CSS selector of the submit control")]
        submit: Option<String>,

        #[arg(long, help = "CSS selector that marks rendered results")]
        results: Option<String>,

        #[arg(long, help = "Output format (png, jpeg, webp)")]
        format: Option<String>,

        #[arg(long, help = "Capture only the visible viewport instead of the full page")]
        viewport_only: bool,
    },

    /// Validate a configuration file
    Validate {
        #[arg(short, long, help = "Configuration file to validate")]
        config: PathBuf,
    },
}

/// Per-job options shared by the capture and batch commands.
#[derive(Debug, Clone, Default)]
pub struct JobOptions {
    pub search_input: Option<String>,
    pub submit: Option<String>,
    pub results: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub viewport_only: bool,
}

pub struct CliRunner {
    pub config: Config,
}

impl CliRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub async fn run(&self, command: Commands) -> anyhow::Result<()> {
        match command {
            Commands::Capture {
                url,
                query,
                output,
                search_input,
                submit,
                results,
                format,
                width,
                height,
                viewport_only,
                scroll_step,
                scroll_delay,
            } => {
                let mut config = self.config.clone();
                if let Some(format) = &format {
                    config.output_format = parse_format(format)?;
                }
                if let Some(step) = scroll_step {
                    config.scroll.step = step;
                }
                if let Some(delay) = scroll_delay {
                    config.scroll.step_delay = std::time::Duration::from_millis(delay);
                }
                config.validate()?;

                let job = self.build_job(
                    url,
                    query,
                    output,
                    JobOptions {
                        search_input,
                        submit,
                        results,
                        width,
                        height,
                        viewport_only,
                    },
                );

                self.run_capture(config, job).await
            }
            Commands::Batch {
                input,
                url,
                output,
                search_input,
                submit,
                results,
                format,
                viewport_only,
            } => {
                let mut config = self.config.clone();
                if let Some(format) = &format {
                    config.output_format = parse_format(format)?;
                }
                config.validate()?;

                let options = JobOptions {
                    search_input,
                    submit,
                    results,
                    viewport_only,
                    ..Default::default()
                };

                self.run_batch(config, input, url, output, options).await
            }
            Commands::Validate { config } => self.validate_config(config).await,
        }
    }

    pub async fn run_capture(&self, config: Config, job: CaptureJob) -> anyhow::Result<()> {
        info!("Capturing search results for '{}' at {}", job.query, job.url);

        let output = job.output.clone();
        let driver = SessionDriver::new(config);
        let report = driver.run(&job).await?;

        print_report(&report, &output);
        Ok(())
    }

    pub async fn run_batch(
        &self,
        config: Config,
        input: PathBuf,
        url: String,
        output: PathBuf,
        options: JobOptions,
    ) -> anyhow::Result<()> {
        info!("Starting batch capture");

        let queries = self.read_queries_from_file(&input).await?;
        if queries.is_empty() {
            bail!("No queries found in {}", input.display());
        }
        info!("Loaded {} queries from {}", queries.len(), input.display());

        fs::create_dir_all(&output).await?;

        let extension = config.output_format.extension();
        let jobs: Vec<CaptureJob> = queries
            .iter()
            .enumerate()
            .map(|(index, query)| {
                let mut stem = sanitize_filename(query);
                if stem.is_empty() {
                    stem = format!("capture-{}", index + 1);
                }
                self.build_job(
                    url.clone(),
                    query.clone(),
                    output.join(format!("{stem}.{extension}")),
                    options.clone(),
                )
            })
            .collect();

        let driver = SessionDriver::new(config);
        let reports = driver.run_all(&jobs).await?;

        let total_bytes: usize = reports.iter().map(|r| r.bytes_written).sum();
        let total_duration = reports.iter().map(|r| r.duration).sum();
        info!(
            "Batch completed: {} captures, {} in {}",
            reports.len(),
            format_bytes(total_bytes),
            format_duration(total_duration)
        );

        for report in &reports {
            println!(
                "  {} -> {} ({}, {} scroll advances)",
                report.job_id,
                report.url,
                format_bytes(report.bytes_written),
                report.scroll_advances
            );
        }

        Ok(())
    }

    pub async fn validate_config(&self, config_path: PathBuf) -> anyhow::Result<()> {
        println!("Validating configuration: {}", config_path.display());

        let config_content = fs::read_to_string(&config_path)
            .await
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config: Config = serde_json::from_str(&config_content)?;
        config.validate()?;

        println!("Configuration is valid:");
        println!(
            "  Viewport: {}x{}",
            config.viewport.width, config.viewport.height
        );
        println!("  Navigation timeout: {:?}", config.navigation_timeout);
        println!("  Wait timeout: {:?}", config.wait_timeout);
        println!(
            "  Scroll: {}px every {:?}",
            config.scroll.step, config.scroll.step_delay
        );
        println!(
            "  Readiness: poll {:?}, quiet {:?}, deadline {:?}",
            config.readiness.poll_interval,
            config.readiness.quiet_period,
            config.readiness.deadline
        );
        println!("  Output format: {:?}", config.output_format);

        Ok(())
    }

    pub async fn read_queries_from_file(&self, path: &PathBuf) -> anyhow::Result<Vec<String>> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let queries: Vec<String> = content
            .lines()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| line.to_string())
            .collect();

        Ok(queries)
    }

    pub fn build_job(
        &self,
        url: String,
        query: String,
        output: PathBuf,
        options: JobOptions,
    ) -> CaptureJob {
        let defaults = SearchSelectors::default();
        let selectors = SearchSelectors {
            input: options.search_input.unwrap_or(defaults.input),
            submit: options.submit.unwrap_or(defaults.submit),
            results_marker: options.results.unwrap_or(defaults.results_marker),
        };

        let custom_viewport = if options.width.is_some() || options.height.is_some() {
            Some(Viewport {
                width: options.width.unwrap_or(self.config.viewport.width),
                height: options.height.unwrap_or(self.config.viewport.height),
                device_scale_factor: self.config.viewport.device_scale_factor,
                mobile: self.config.viewport.mobile,
            })
        } else {
            None
        };

        CaptureJob {
            url,
            query,
            selectors,
            output,
            full_page: !options.viewport_only,
            custom_viewport,
            ..Default::default()
        }
    }
}

fn parse_format(format: &str) -> anyhow::Result<OutputFormat> {
    match format.to_ascii_lowercase().as_str() {
        "png" => Ok(OutputFormat::Png),
        "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
        "webp" => Ok(OutputFormat::Webp),
        other => bail!("Unsupported output format: {other}"),
    }
}

fn print_report(report: &CaptureReport, output: &std::path::Path) {
    println!("Screenshot captured successfully:");
    println!("  URL: {}", report.url);
    if let Some(final_url) = &report.final_url {
        if final_url != &report.url {
            println!("  Final URL: {final_url}");
        }
    }
    println!("  Output: {}", output.display());
    println!("  Format: {:?}", report.format);
    println!("  Size: {}", format_bytes(report.bytes_written));
    println!("  Scroll advances: {}", report.scroll_advances);
    println!("  Duration: {}", format_duration(report.duration));

    if let Some(title) = &report.page_title {
        println!("  Title: {title}");
    }
}

pub fn setup_logging(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_job_uses_selector_defaults() {
        let runner = CliRunner::new(Config::default());
        let job = runner.build_job(
            "https://shop.example".to_string(),
            "iphone13".to_string(),
            PathBuf::from("out.png"),
            JobOptions::default(),
        );

        assert_eq!(job.selectors.input, "#key");
        assert_eq!(job.selectors.submit, ".button");
        assert_eq!(job.selectors.results_marker, ".gl-item");
        assert!(job.full_page);
        assert!(job.custom_viewport.is_none());
    }

    #[test]
    fn build_job_applies_overrides() {
        let runner = CliRunner::new(Config::default());
        let job = runner.build_job(
            "https://shop.example".to_string(),
            "ssd".to_string(),
            PathBuf::from("out.png"),
            JobOptions {
                search_input: Some("input[name=q]".to_string()),
                width: Some(1280),
                viewport_only: true,
                ..Default::default()
            },
        );

        assert_eq!(job.selectors.input, "input[name=q]");
        assert!(!job.full_page);

        let viewport = job.custom_viewport.expect("width override sets a viewport");
        assert_eq!(viewport.width, 1280);
        assert_eq!(viewport.height, 1080);
    }

    #[test]
    fn parse_format_accepts_known_names() {
        assert_eq!(parse_format("png").unwrap(), OutputFormat::Png);
        assert_eq!(parse_format("JPG").unwrap(), OutputFormat::Jpeg);
        assert_eq!(parse_format("webp").unwrap(), OutputFormat::Webp);
        assert!(parse_format("tiff").is_err());
    }
}
