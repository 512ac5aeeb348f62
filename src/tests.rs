#[cfg(test)]
mod integration_tests {
    use crate::{
        CaptureJob, Config, OutputFormat, ScrollPlan, SearchSelectors, SessionError, Viewport,
    };
    use std::time::Duration;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.navigation_timeout, Duration::from_secs(30));
        assert_eq!(config.wait_timeout, Duration::from_secs(10));
        assert_eq!(config.scroll.step, 500);
        assert_eq!(config.scroll.step_delay, Duration::from_millis(500));
        assert!(config.headless);
        assert!(matches!(config.output_format, OutputFormat::Png));
    }

    #[test]
    fn test_capture_job_default() {
        let job = CaptureJob::default();
        assert!(!job.id.is_empty());
        assert!(job.url.is_empty());
        assert!(job.query.is_empty());
        assert!(job.full_page);
        assert!(job.custom_viewport.is_none());
        assert_eq!(job.output, std::path::PathBuf::from("capture.png"));
    }

    #[test]
    fn test_viewport_default() {
        let viewport = Viewport::default();
        assert_eq!(viewport.width, 1920);
        assert_eq!(viewport.height, 1080);
        assert_eq!(viewport.device_scale_factor, 1.0);
        assert!(!viewport.mobile);
    }

    #[test]
    fn test_search_selectors_default() {
        let selectors = SearchSelectors::default();
        assert_eq!(selectors.input, "#key");
        assert_eq!(selectors.submit, ".button");
        assert_eq!(selectors.results_marker, ".gl-item");
    }

    #[test]
    fn test_chrome_args_generation() {
        let config = Config::default();
        let args = crate::get_chrome_args(&config);

        assert!(args.contains(&"--headless=new".to_string()));
        assert!(args.contains(&"--no-sandbox".to_string()));
        assert!(args.contains(&"--disable-gpu".to_string()));
        assert!(args.contains(&format!(
            "--window-size={},{}",
            config.viewport.width, config.viewport.height
        )));
    }

    #[test]
    fn test_browser_config_creation() {
        let config = Config::default();
        assert!(crate::create_browser_config(&config).is_ok());
    }

    #[test]
    fn test_error_conversions() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(
            SessionError::from(io_err),
            SessionError::IoError(_)
        ));

        let json_err = serde_json::from_str::<Config>("not json").unwrap_err();
        assert!(matches!(
            SessionError::from(json_err),
            SessionError::SerializationError(_)
        ));
    }

    #[test]
    fn test_error_pre_session_classification() {
        assert!(SessionError::BrowserLaunchFailed("boom".to_string()).is_pre_session());
        assert!(SessionError::InvalidUrl("nope".to_string()).is_pre_session());
        assert!(!SessionError::ElementNotFound("#key".to_string()).is_pre_session());
        assert!(!SessionError::ContentNotReady {
            waited: Duration::from_secs(10)
        }
        .is_pre_session());
    }

    #[test]
    fn test_wait_timeout_names_selector() {
        let err = SessionError::WaitTimeout {
            selector: ".gl-item".to_string(),
            waited: Duration::from_secs(10),
        };
        let message = err.to_string();
        assert!(message.contains(".gl-item"));
        assert!(message.contains("10s"));
    }

    #[test]
    fn test_scroll_plan_matches_live_loop_shape() {
        // One advance per step until the viewport reaches the bottom.
        let plan = ScrollPlan::new(500, 1080, 4000);
        assert_eq!(plan.advances(), 6);

        let offsets = plan.offsets();
        assert_eq!(offsets.len(), 6);
        assert_eq!(*offsets.last().unwrap(), plan.max_offset());
    }

    #[test]
    fn test_output_format_extensions() {
        assert_eq!(OutputFormat::Png.extension(), "png");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
        assert_eq!(OutputFormat::Webp.extension(), "webp");
    }
}
