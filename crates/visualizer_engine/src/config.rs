use std::time::Duration;

use url::Url;
use visualizer_core::DEFAULT_TRANSIENT_THRESHOLD;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

#[derive(Debug, Clone)]
pub struct TrackerSettings {
    /// Root every API path is joined onto. Always ends with `/`.
    pub base_url: Url,
    pub poll_interval: Duration,
    pub frame_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub transient_error_threshold: u32,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url"),
            poll_interval: Duration::from_millis(3000),
            frame_interval: Duration::from_millis(16),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            transient_error_threshold: DEFAULT_TRANSIENT_THRESHOLD,
        }
    }
}

impl TrackerSettings {
    /// Settings pointed at `base_url`, normalized so relative joins keep its
    /// path.
    pub fn with_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: normalize_base(base_url)?,
            ..Self::default()
        })
    }
}

pub(crate) fn normalize_base(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{raw}/"))
    }
}
