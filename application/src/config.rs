//! Application behavior configuration

use serde::{Deserialize, Serialize};

/// Tunable behavior of the orchestration engine.
///
/// Infrastructure maps its file configuration onto this; defaults match the
/// values the engine was designed around.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorConfig {
    /// Session inactivity window in hours; sessions idle longer are swept
    /// lazily and cache entries expire with the same TTL
    pub session_timeout_hours: i64,
    /// Hard timeout on outbound real-time data fetches, in seconds
    pub realtime_fetch_timeout_secs: u64,
    /// Run the validation pass over synthesized answers
    pub enable_validation: bool,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            session_timeout_hours: 4,
            realtime_fetch_timeout_secs: 10,
            enable_validation: true,
        }
    }
}

impl BehaviorConfig {
    pub fn session_timeout(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_timeout_hours)
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.session_timeout_hours.max(0) as u64 * 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_ttl_matches_inactivity_window() {
        let config = BehaviorConfig::default();
        assert_eq!(config.cache_ttl().as_secs(), 4 * 3600);
        assert_eq!(config.session_timeout(), chrono::Duration::hours(4));
    }
}
