use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Settings for outbound page fetches. Passed explicitly to the fetcher and
/// the enricher.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause after every request that actually went out over the network.
    pub request_delay: Duration,
    /// Extracted page text is cut to this many characters.
    pub max_content_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(10),
            request_delay: Duration::from_secs(1),
            max_content_chars: 5000,
        }
    }
}

impl FetchConfig {
    /// Defaults overridden by `MCQA_USER_AGENT`, `MCQA_FETCH_TIMEOUT_SECS`,
    /// `MCQA_FETCH_DELAY_MS` and `MCQA_MAX_CONTENT_CHARS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let parsed = |key: &str| dotenv::var(key).ok().and_then(|v| v.trim().parse::<u64>().ok());

        Self {
            user_agent: dotenv::var("MCQA_USER_AGENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.user_agent),
            timeout: parsed("MCQA_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            request_delay: parsed("MCQA_FETCH_DELAY_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.request_delay),
            max_content_chars: parsed("MCQA_MAX_CONTENT_CHARS")
                .map(|n| n as usize)
                .unwrap_or(defaults.max_content_chars),
        }
    }
}

/// Knobs for the conversion pass.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Number of leading items placed in the calibration bucket.
    pub calibration_size: usize,
    /// Persist the URL cache after this many converted items.
    pub save_every: usize,
    /// Log progress every this many input records.
    pub progress_every: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            calibration_size: 5,
            save_every: 100,
            progress_every: 50,
        }
    }
}
