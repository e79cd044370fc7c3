// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Recording of outbound API traffic.

use std::sync::Arc;

use pagetrail_core::RawEvent;
use pagetrail_writer::PageLog;

/// URL fragments that are not recorded by default: calls to the log collector
/// itself and image assets.
pub const DEFAULT_IGNORE_PATTERNS: [&str; 2] = ["log", "assets/images"];

/// Records outbound API requests and their responses as `apiCall` and
/// `apiResponse` entries.
///
/// Requests whose URL (without the query string) contains one of the ignore
/// patterns are skipped, so that delivering the log doesn't log itself.
/// Recorded URLs keep their query string.
#[derive(Clone, Debug)]
pub struct ApiCallTracker {
    log: PageLog,
    ignore: Arc<[String]>,
}

impl ApiCallTracker {
    /// A tracker using [`DEFAULT_IGNORE_PATTERNS`]
    pub fn new(log: PageLog) -> Self {
        Self::with_ignore_patterns(log, DEFAULT_IGNORE_PATTERNS)
    }

    /// A tracker skipping URLs that contain any of `patterns`
    pub fn with_ignore_patterns(
        log: PageLog,
        patterns: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            log,
            ignore: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// True if calls to `url` are not recorded
    pub fn is_ignored(&self, url: &str) -> bool {
        let path = url.split_once('?').map_or(url, |(path, _)| path);
        self.ignore.iter().any(|pattern| path.contains(pattern.as_str()))
    }

    /// A request to `url` went out. Returns whether it was recorded.
    pub fn request_sent(&self, url: &str) -> bool {
        if self.is_ignored(url) {
            return false;
        }
        self.log.record(RawEvent::ApiCall {
            url: url.to_owned(),
        });
        true
    }

    /// The request to `url` got a response with `status`. Returns whether it
    /// was recorded.
    pub fn response_received(&self, url: &str, status: u16) -> bool {
        if self.is_ignored(url) {
            return false;
        }
        self.log.record(RawEvent::ApiResponse {
            url: url.to_owned(),
            status,
        });
        true
    }

    /// Execute `request` with `client`, recording the call and its response.
    ///
    /// Transport errors are returned as they are; no `apiResponse` is recorded
    /// for them.
    #[cfg(feature = "http")]
    pub async fn execute(
        &self,
        client: &reqwest::Client,
        request: reqwest::Request,
    ) -> reqwest::Result<reqwest::Response> {
        let url = request.url().to_string();
        self.request_sent(&url);
        let response = client.execute(request).await?;
        self.response_received(&url, response.status().as_u16());
        Ok(response)
    }
}
