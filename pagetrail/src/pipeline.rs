// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use pagetrail_core::RemoteSink;
use pagetrail_timesource::TimeSource;
use pagetrail_writer::{PageLog, PageLogGuard};

use crate::{
    config::{ConfigError, PipelineConfig},
    interceptor::ApiCallTracker,
    tracker::Tracker,
};

/// A page session's telemetry pipeline: one [`PageLog`], the producer handles
/// recording into it and the sink it is flushed to.
///
/// Dropping the pipeline (or [`Pipeline::shut_down`]) shuts the log down.
/// Clones of the producer handles that outlive the pipeline stop recording.
#[derive(Debug)]
pub struct Pipeline {
    tracker: Tracker,
    api_calls: ApiCallTracker,
    _guard: PageLogGuard,
}

impl Pipeline {
    /// Build a pipeline flushing to `sink`.
    pub fn new(
        config: &PipelineConfig,
        sink: impl RemoteSink + Send + 'static,
    ) -> Result<Self, ConfigError> {
        Self::with_time_source(config, TimeSource::default(), sink)
    }

    /// Like [`Pipeline::new`], reading entry times from `time_source`.
    pub fn with_time_source(
        config: &PipelineConfig,
        time_source: TimeSource,
        sink: impl RemoteSink + Send + 'static,
    ) -> Result<Self, ConfigError> {
        let (log, guard) = config
            .page_log_builder()?
            .time_source(time_source)
            .build(sink);
        tracing::debug!(
            chunk_size = config.chunk_size,
            order = ?config.order,
            "started page telemetry pipeline"
        );
        Ok(Self {
            tracker: Tracker::new(log.clone()).with_route_label(config.route_label),
            api_calls: ApiCallTracker::with_ignore_patterns(log, config.ignore_patterns.clone()),
            _guard: guard,
        })
    }

    /// Build a pipeline posting to `{base_url}/{endpoint}`, sending the cookies
    /// in `cookie_jar`.
    ///
    /// Must be called from within a tokio runtime; deliveries are spawned on
    /// it.
    #[cfg(feature = "http")]
    pub fn http(
        config: &PipelineConfig,
        base_url: reqwest::Url,
        cookie_jar: std::sync::Arc<reqwest::cookie::Jar>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let sink = pagetrail_writer::sink::HttpSink::builder(base_url)
            .endpoint(config.endpoint.clone())
            .timeout(config.timeout())
            .xsrf_cookie(config.xsrf_cookie.clone())
            .xsrf_header(config.xsrf_header.clone())
            .cookie_jar(cookie_jar)
            .build()?;
        tracing::info!(url = %sink.url(), "delivering page events over http");
        Self::new(config, sink)
    }

    /// Handle for UI producers
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Handle for HTTP interceptors
    pub fn api_calls(&self) -> &ApiCallTracker {
        &self.api_calls
    }

    /// The underlying log
    pub fn log(&self) -> &PageLog {
        self.tracker.log()
    }

    /// Flush the log to the sink in chunks and reset it. Call when the page
    /// is left.
    ///
    /// Returns the number of payloads submitted. Delivery continues in the
    /// background.
    pub fn save_logs(&self) -> usize {
        self.log().flush()
    }

    /// Alias for `drop(pipeline)`.
    pub fn shut_down(self) {}
}
