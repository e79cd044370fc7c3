// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error as StdError, fmt, sync::Arc, time::Duration};

use pagetrail_core::{LogPayload, RemoteSink};
use percent_encoding::percent_decode_str;
use reqwest::{
    Client, Request, StatusCode, Url,
    cookie::{CookieStore, Jar},
    header::{CONTENT_TYPE, HeaderName, HeaderValue},
};
use tokio::runtime::Handle;

use crate::rate_limit::rate_limited;

/// Errors raised while setting up an [`HttpSink`] or delivering a payload.
///
/// Delivery errors never reach producers; the sink logs them with
/// `tracing::warn!`.
#[derive(Debug)]
#[non_exhaustive]
pub enum DeliveryError {
    /// The collector URL could not be built from the base URL and endpoint.
    InvalidEndpoint(String),
    /// The configured XSRF header name is not a valid header name.
    InvalidHeader(String),
    /// No tokio runtime was configured and none was running at build time.
    NoRuntime,
    /// The payload could not be encoded as JSON.
    Encode(serde_json::Error),
    /// The request failed before a response came back.
    Transport(reqwest::Error),
    /// The collector answered with a non-success status.
    Status(StatusCode),
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEndpoint(msg) => write!(f, "invalid collector endpoint: {msg}"),
            Self::InvalidHeader(name) => write!(f, "invalid header name `{name}`"),
            Self::NoRuntime => f.write_str("no tokio runtime available to deliver on"),
            Self::Encode(_) => f.write_str("failed to encode payload"),
            Self::Transport(_) => f.write_str("request to collector failed"),
            Self::Status(status) => write!(f, "collector responded with {status}"),
        }
    }
}

impl StdError for DeliveryError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for DeliveryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Encode(err)
    }
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

/// Builder for [`HttpSink`]
#[derive(Debug)]
pub struct HttpSinkBuilder {
    base_url: Url,
    endpoint: String,
    timeout: Duration,
    xsrf_cookie: String,
    xsrf_header: String,
    cookie_jar: Arc<Jar>,
    runtime: Option<Handle>,
}

impl HttpSinkBuilder {
    /// Path joined onto the base URL. Defaults to `api/logs`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Timeout of each request. Defaults to 15 seconds.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero());
        self.timeout = timeout;
        self
    }

    /// Cookie the anti-forgery token is read from. Defaults to `XSRF-TOKEN`.
    pub fn xsrf_cookie(mut self, name: impl Into<String>) -> Self {
        self.xsrf_cookie = name.into();
        self
    }

    /// Header the anti-forgery token is sent in. Defaults to `X-XSRF-TOKEN`.
    pub fn xsrf_header(mut self, name: impl Into<String>) -> Self {
        self.xsrf_header = name.into();
        self
    }

    /// Cookie jar shared with the rest of the application. Its cookies are
    /// sent with every request.
    pub fn cookie_jar(mut self, jar: Arc<Jar>) -> Self {
        self.cookie_jar = jar;
        self
    }

    /// Runtime requests are spawned on. Defaults to the runtime current when
    /// [`HttpSinkBuilder::build`] is called.
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the sink. Needs a tokio runtime unless one was given with
    /// [`HttpSinkBuilder::runtime`].
    pub fn build(self) -> Result<HttpSink, DeliveryError> {
        let url = self
            .base_url
            .join(&self.endpoint)
            .map_err(|err| DeliveryError::InvalidEndpoint(err.to_string()))?;
        let xsrf_header = HeaderName::try_from(self.xsrf_header.as_str())
            .map_err(|_| DeliveryError::InvalidHeader(self.xsrf_header.clone()))?;
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| DeliveryError::NoRuntime)?,
        };
        let client = Client::builder()
            .timeout(self.timeout)
            .cookie_provider(Arc::clone(&self.cookie_jar))
            .build()?;

        Ok(HttpSink(Arc::new(Inner {
            url,
            client,
            jar: self.cookie_jar,
            xsrf_cookie: self.xsrf_cookie,
            xsrf_header,
            runtime,
        })))
    }
}

/// A [`RemoteSink`] that posts each payload as JSON to a collector.
///
/// Every submission is spawned as its own task on a tokio runtime and
/// `submit` returns right away. Requests keep running after the sink and the
/// page log are gone, for as long as the runtime does. Failures are logged at
/// `warn` and never retried.
///
/// When the cookie jar holds the anti-forgery cookie, its percent-decoded
/// value is echoed in the anti-forgery header.
#[derive(Clone, Debug)]
pub struct HttpSink(Arc<Inner>);

#[derive(Debug)]
struct Inner {
    url: Url,
    client: Client,
    jar: Arc<Jar>,
    xsrf_cookie: String,
    xsrf_header: HeaderName,
    runtime: Handle,
}

impl HttpSink {
    /// Start building a sink that posts to `{base_url}/api/logs`.
    pub fn builder(base_url: Url) -> HttpSinkBuilder {
        HttpSinkBuilder {
            base_url,
            endpoint: "api/logs".into(),
            timeout: Duration::from_secs(15),
            xsrf_cookie: "XSRF-TOKEN".into(),
            xsrf_header: "X-XSRF-TOKEN".into(),
            cookie_jar: Arc::default(),
            runtime: None,
        }
    }

    /// The URL payloads are posted to
    pub fn url(&self) -> &Url {
        &self.0.url
    }

    /// The request that delivers `payload`. Cookies from the jar are added by
    /// the client when the request is sent.
    pub fn request(&self, payload: &LogPayload) -> Result<Request, DeliveryError> {
        let body = serde_json::to_vec(payload)?;
        let mut request = self
            .0
            .client
            .post(self.0.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body);
        if let Some(token) = self.xsrf_token() {
            request = request.header(self.0.xsrf_header.clone(), token);
        }
        Ok(request.build()?)
    }

    fn xsrf_token(&self) -> Option<HeaderValue> {
        let cookies = self.0.jar.cookies(&self.0.url)?;
        let raw = cookie_value(cookies.to_str().ok()?, &self.0.xsrf_cookie)?;
        let token = percent_decode_str(raw).decode_utf8().ok()?;
        HeaderValue::from_str(&token).ok()
    }
}

impl RemoteSink for HttpSink {
    fn submit(&self, payload: LogPayload) {
        let chunk = payload.log_message.clone();
        let request = match self.request(&payload) {
            Ok(request) => request,
            Err(err) => {
                rate_limited!(
                    Duration::from_secs(1),
                    tracing::warn!(error = %err, chunk = %chunk, "dropping page events")
                );
                return;
            }
        };
        let client = self.0.client.clone();
        self.0.runtime.spawn(async move {
            match deliver(&client, request).await {
                Ok(status) => tracing::debug!(%status, chunk = %chunk, "delivered page events"),
                Err(err) => rate_limited!(
                    Duration::from_secs(1),
                    tracing::warn!(error = %err, chunk = %chunk, "failed to deliver page events")
                ),
            }
        });
    }
}

async fn deliver(client: &Client, request: Request) -> Result<StatusCode, DeliveryError> {
    let status = client.execute(request).await?.status();
    if status.is_success() {
        Ok(status)
    } else {
        Err(DeliveryError::Status(status))
    }
}

// `Cookie` header values look like `a=1; b=2`
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}
