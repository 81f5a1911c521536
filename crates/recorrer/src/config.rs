//! Harness configuration.

use serde::{Deserialize, Serialize};

/// Site endpoints the funnel runs against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Marketing site root, trailing slash included
    pub base_url: String,
    /// Host prefix the external job-board window must land on
    pub external_jobs_host: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://useinsider.com/".to_string(),
            external_jobs_host: "https://jobs.lever.co".to_string(),
        }
    }
}

impl SiteConfig {
    /// Config with the default endpoints
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the site root
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.base_url = url;
        self
    }

    /// Override the external job-board host
    #[must_use]
    pub fn with_external_jobs_host(mut self, host: impl Into<String>) -> Self {
        self.external_jobs_host = host.into();
        self
    }

    /// URL of the careers landing page
    #[must_use]
    pub fn careers_url(&self) -> String {
        format!("{}careers/", self.base_url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod site_config_tests {
        use super::*;

        #[test]
        fn defaults_point_at_the_public_site() {
            let config = SiteConfig::default();
            assert_eq!(config.base_url, "https://useinsider.com/");
            assert_eq!(config.external_jobs_host, "https://jobs.lever.co");
            assert_eq!(config.careers_url(), "https://useinsider.com/careers/");
        }

        #[test]
        fn base_url_gains_a_trailing_slash() {
            let config = SiteConfig::new().with_base_url("https://staging.example.test");
            assert_eq!(config.base_url, "https://staging.example.test/");
            assert_eq!(
                config.careers_url(),
                "https://staging.example.test/careers/"
            );
        }

        #[test]
        fn serde_round_trip() {
            let config = SiteConfig::new().with_external_jobs_host("https://boards.example");
            let json = serde_json::to_string(&config).unwrap();
            let back: SiteConfig = serde_json::from_str(&json).unwrap();
            assert_eq!(back, config);
        }
    }
}
