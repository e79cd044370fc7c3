// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Client-side user interaction telemetry.
//!
//! pagetrail records what a user does during a page session (clicks, value
//! changes, focus, form submissions, dialogs, navigation, outbound API calls)
//! into one ordered log, and ships that log to a collector in bounded batches
//! when the page is left.
//!
//! ```
//! use pagetrail::{Pipeline, PipelineConfig, element::ElementSnapshot, sink::VecSink};
//!
//! let sink = VecSink::new();
//! let pipeline = Pipeline::new(&PipelineConfig::default(), sink.clone()).unwrap();
//!
//! let tracker = pipeline.tracker();
//! tracker.navigation_ended("/welcome");
//! tracker.change(&ElementSnapshot::new("input").data("label", "name").value("Ada"));
//! tracker.click(&ElementSnapshot::new("button").text("Continue"));
//! pipeline.api_calls().request_sent("/api/users");
//!
//! assert_eq!(pipeline.save_logs(), 1);
//! let payloads = sink.drain();
//! assert_eq!(payloads.len(), 1);
//! assert_eq!(payloads[0].context.len(), 4);
//! ```
//!
//! The pieces can also be used on their own: a [`PageLog`] accepts
//! [`RawEvent`]s from any thread, and [`flush`](pagetrail_writer::flush::flush)
//! runs a flush cycle over any slice of entries.

pub use pagetrail_core::{
    BoxRemoteSink, DEFAULT_CHUNK_SIZE, ElementType, FieldValidity, FormNode, InputValue, LogEntry,
    LogOrder, LogPayload, Normalizer, RawEvent, RemoteSink, ValidityState, classify, element,
    label,
};
pub use pagetrail_timesource::{ClockFormat, Time, TimeSource};
pub use pagetrail_writer::{
    LogSnapshot, LogView, PageLog, PageLogBuilder, PageLogGuard, flush, sink,
};

pub use crate::config::{ConfigError, PipelineConfig};
pub use crate::interceptor::ApiCallTracker;
pub use crate::pipeline::Pipeline;
pub use crate::tracker::{RouteLabel, Tracker};

pub mod config;
pub mod interceptor;
mod pipeline;
mod tracker;
