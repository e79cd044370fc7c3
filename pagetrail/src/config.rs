// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! File based configuration of a [`Pipeline`](crate::Pipeline).
//!
//! ```toml
//! endpoint = "api/logs"
//! chunk-size = 120
//! order = "time-then-button-click"
//! route-label = "pairwise"
//! ignore-patterns = ["log", "assets/images"]
//! timeout-secs = 15
//! utc-offset-minutes = 60
//! ```
//!
//! Every key is optional.

use std::{error::Error as StdError, fmt, time::Duration};

use pagetrail_core::{DEFAULT_CHUNK_SIZE, LogOrder};
use pagetrail_timesource::ClockFormat;
use pagetrail_writer::PageLogBuilder;
use serde::{Deserialize, Serialize};

use crate::{interceptor::DEFAULT_IGNORE_PATTERNS, tracker::RouteLabel};

/// An invalid configuration.
#[derive(Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// The TOML could not be parsed or has unknown keys
    Parse(toml::de::Error),
    /// A value is out of range
    Invalid {
        /// The offending key
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
    /// The delivery sink could not be set up
    #[cfg(feature = "http")]
    Sink(pagetrail_writer::sink::DeliveryError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid pipeline config: {err}"),
            Self::Invalid { key, reason } => write!(f, "invalid `{key}`: {reason}"),
            #[cfg(feature = "http")]
            Self::Sink(_) => f.write_str("failed to set up delivery"),
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
            #[cfg(feature = "http")]
            Self::Sink(err) => Some(err),
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err)
    }
}

#[cfg(feature = "http")]
impl From<pagetrail_writer::sink::DeliveryError> for ConfigError {
    fn from(err: pagetrail_writer::sink::DeliveryError) -> Self {
        Self::Sink(err)
    }
}

/// Settings of a [`Pipeline`](crate::Pipeline).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct PipelineConfig {
    /// Collector path, joined onto the base URL
    pub endpoint: String,
    /// Maximum entries per delivered payload
    pub chunk_size: usize,
    /// Order entries are delivered in
    pub order: LogOrder,
    /// How navigations are labelled
    pub route_label: RouteLabel,
    /// Page attributed to entries before the first navigation
    pub initial_page: String,
    /// URL fragments of API calls that are not recorded
    pub ignore_patterns: Vec<String>,
    /// Cookie holding the anti-forgery token
    pub xsrf_cookie: String,
    /// Header the anti-forgery token is echoed in
    pub xsrf_header: String,
    /// Per request delivery timeout, in seconds
    pub timeout_secs: u64,
    /// Offset of the recorded clock from UTC. Local time when absent.
    pub utc_offset_minutes: Option<i32>,
    /// Flush what is left when the pipeline shuts down
    pub flush_on_shutdown: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            endpoint: "api/logs".into(),
            chunk_size: DEFAULT_CHUNK_SIZE.get(),
            order: LogOrder::default(),
            route_label: RouteLabel::default(),
            initial_page: "/".into(),
            ignore_patterns: DEFAULT_IGNORE_PATTERNS.map(String::from).to_vec(),
            xsrf_cookie: "XSRF-TOKEN".into(),
            xsrf_header: "X-XSRF-TOKEN".into(),
            timeout_secs: 15,
            utc_offset_minutes: None,
            flush_on_shutdown: false,
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the values that parse but can't be used.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(invalid("chunk-size", "must be greater than zero"));
        }
        if self.timeout_secs == 0 {
            return Err(invalid("timeout-secs", "must be greater than zero"));
        }
        if self.xsrf_header.is_empty() {
            return Err(invalid("xsrf-header", "must not be empty"));
        }
        self.clock_format()?;
        Ok(())
    }

    /// How entry times are rendered
    pub fn clock_format(&self) -> Result<ClockFormat, ConfigError> {
        match self.utc_offset_minutes {
            None => Ok(ClockFormat::Local),
            Some(minutes) => ClockFormat::east_minutes(minutes)
                .ok_or_else(|| invalid("utc-offset-minutes", "must be less than a day")),
        }
    }

    /// Per request delivery timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// A [`PageLogBuilder`] with these settings.
    pub fn page_log_builder(&self) -> Result<PageLogBuilder, ConfigError> {
        self.validate()?;
        Ok(PageLogBuilder::new()
            .chunk_size(self.chunk_size)
            .order(self.order)
            .clock(self.clock_format()?)
            .initial_page(self.initial_page.clone())
            .flush_on_shutdown(self.flush_on_shutdown))
    }
}

fn invalid(key: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        key,
        reason: reason.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.chunk_size, 120);
        assert_eq!(config.ignore_patterns, ["log", "assets/images"]);
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.clock_format().unwrap(), ClockFormat::Local);
    }

    #[test]
    fn parses_every_key() {
        let config = PipelineConfig::from_toml_str(
            r#"
            endpoint = "telemetry/events"
            chunk-size = 50
            order = "time-then-button-click"
            route-label = "pairwise"
            initial-page = "/start"
            ignore-patterns = ["/health"]
            xsrf-cookie = "CSRF"
            xsrf-header = "X-CSRF"
            timeout-secs = 3
            utc-offset-minutes = 0
            flush-on-shutdown = true
            "#,
        )
        .unwrap();
        assert_eq!(
            config,
            PipelineConfig {
                endpoint: "telemetry/events".into(),
                chunk_size: 50,
                order: LogOrder::TimeThenButtonClick,
                route_label: RouteLabel::Pairwise,
                initial_page: "/start".into(),
                ignore_patterns: vec!["/health".into()],
                xsrf_cookie: "CSRF".into(),
                xsrf_header: "X-CSRF".into(),
                timeout_secs: 3,
                utc_offset_minutes: Some(0),
                flush_on_shutdown: true,
            }
        );
        assert_eq!(config.clock_format().unwrap(), ClockFormat::utc());
    }

    #[rstest]
    #[case("chunk-size = 0", "invalid `chunk-size`: must be greater than zero")]
    #[case("timeout-secs = 0", "invalid `timeout-secs`: must be greater than zero")]
    #[case("utc-offset-minutes = 1440", "invalid `utc-offset-minutes`: must be less than a day")]
    #[case("xsrf-header = \"\"", "invalid `xsrf-header`: must not be empty")]
    fn rejects_unusable_values(#[case] toml: &str, #[case] message: &str) {
        let err = PipelineConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert_eq!(err.to_string(), message);
    }

    #[rstest]
    #[case("chunk-size = -1")]
    #[case("order = \"random\"")]
    #[case("chunk_size = 10")]
    #[case("not toml at all")]
    fn rejects_malformed_documents(#[case] toml: &str) {
        let err = PipelineConfig::from_toml_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err}");
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn builder_rejects_invalid_config_instead_of_panicking() {
        let config = PipelineConfig {
            chunk_size: 0,
            ..PipelineConfig::default()
        };
        assert!(config.page_log_builder().is_err());
    }
}
