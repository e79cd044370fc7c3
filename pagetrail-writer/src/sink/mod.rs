// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains [`RemoteSink`] implementations that flushed payloads can be
//! delivered to.

use std::sync::{Arc, Mutex, PoisonError};

use pagetrail_core::{BoxRemoteSink, LogPayload, RemoteSink};

#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
#[cfg_attr(docsrs, doc(cfg(feature = "http")))]
pub use http::{DeliveryError, HttpSink, HttpSinkBuilder};

/// A [`RemoteSink`] that keeps every submitted payload in memory.
///
/// Useful for testing, and for applications that want to inspect what would
/// have been sent. Clones share the same storage.
#[derive(Clone, Debug, Default)]
pub struct VecSink(Arc<Mutex<Vec<LogPayload>>>);

impl VecSink {
    /// Create a new, empty [`VecSink`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains all payloads submitted so far, in submission order.
    pub fn drain(&self) -> Vec<LogPayload> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of payloads currently held
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no payload is held
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogPayload>> {
        // a panicking reader can't leave the vec half-written
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RemoteSink for VecSink {
    fn submit(&self, payload: LogPayload) {
        self.lock().push(payload);
    }
}

/// A [`RemoteSink`] that drops every payload.
///
/// Useful for testing, or to run the pipeline with delivery disabled.
#[derive(Copy, Clone, Debug, Default)]
#[non_exhaustive]
pub struct DevNullSink;

impl DevNullSink {
    /// Return a new [`DevNullSink`]
    pub const fn new() -> Self {
        DevNullSink
    }

    /// Return a new [`DevNullSink`] as a [`BoxRemoteSink`]
    pub fn boxed() -> BoxRemoteSink {
        BoxRemoteSink::new(Self::new())
    }
}

impl RemoteSink for DevNullSink {
    fn submit(&self, payload: LogPayload) {
        tracing::trace!(message = %payload.log_message, "dropping payload");
    }
}
