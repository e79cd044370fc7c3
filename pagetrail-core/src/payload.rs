// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Splitting an accumulated log into bounded delivery payloads.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::LogEntry;

/// Default maximum number of entries per payload.
pub const DEFAULT_CHUNK_SIZE: NonZeroUsize = NonZeroUsize::new(120).unwrap();

/// One chunk of the log, as posted to the collector.
///
/// ```json
/// {"log_level": "INFO", "log_message": "Page Events 1", "context": [ ... ]}
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogPayload {
    /// Severity the collector files the payload under. Always `"INFO"`.
    pub log_level: String,
    /// `"Page Events {n}"`, `n` being the 1-based chunk index
    pub log_message: String,
    /// The entries of this chunk, in log order
    pub context: Vec<LogEntry>,
}

impl LogPayload {
    /// Payload for the chunk at 0-based `index`.
    pub fn page_events(index: usize, context: Vec<LogEntry>) -> Self {
        Self {
            log_level: "INFO".into(),
            log_message: format!("Page Events {}", index + 1),
            context,
        }
    }
}

/// Partition `entries` into contiguous payloads of at most `chunk_size`
/// entries, keeping order. Only the last payload may be shorter. An empty log
/// gives no payloads.
pub fn chunk_payloads(entries: Vec<LogEntry>, chunk_size: NonZeroUsize) -> Vec<LogPayload> {
    let chunk_size = chunk_size.get();
    let mut payloads = Vec::with_capacity(entries.len().div_ceil(chunk_size));
    let mut entries = entries.into_iter();
    loop {
        let chunk: Vec<LogEntry> = entries.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            return payloads;
        }
        payloads.push(LogPayload::page_events(payloads.len(), chunk));
    }
}
