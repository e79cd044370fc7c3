// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The delivery half of a flush cycle.
//!
//! A [`PageLog`](crate::PageLog) runs this while holding its lock and resets
//! itself right after, so no append lands between the read and the reset. It is exposed on its own for callers that keep their
//! log elsewhere.

use std::num::NonZeroUsize;

use pagetrail_core::{LogEntry, LogOrder, RemoteSink, chunk_payloads};

/// Arrange `log` with `order`, cut it into payloads of at most `chunk_size`
/// entries and submit each one to `sink`.
///
/// Submissions are independent and fire-and-forget: this returns once every
/// payload has been handed to the sink, not once they are delivered. Returns
/// the number of payloads submitted; an empty log submits nothing.
pub fn flush(
    log: &[LogEntry],
    order: LogOrder,
    chunk_size: NonZeroUsize,
    sink: &(impl RemoteSink + ?Sized),
) -> usize {
    if log.is_empty() {
        return 0;
    }
    let mut entries = log.to_vec();
    order.arrange(&mut entries);

    let payloads = chunk_payloads(entries, chunk_size);
    let submitted = payloads.len();
    for payload in payloads {
        sink.submit(payload);
    }
    submitted
}
