// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The writer side of pagetrail: a [`PageLog`] accumulating normalized
//! entries for a page session, the flush cycle that cuts it into payloads, and
//! the [sinks](crate::sink) those payloads are delivered to.

pub use pagetrail_core::{
    BoxRemoteSink, DEFAULT_CHUNK_SIZE, ElementType, InputValue, LogEntry, LogOrder, LogPayload,
    Normalizer, RawEvent, RemoteSink,
};

pub use crate::page_log::{LogSnapshot, LogView, PageLog, PageLogBuilder, PageLogGuard};

pub mod flush;
pub mod page_log;
pub(crate) mod rate_limit;
pub mod sink;

#[doc(hidden)]
pub use pagetrail_core as core;
