// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains the [`RemoteSink`] trait, the destination flushed chunks are
//! delivered to.

use std::{fmt::Debug, sync::Arc};

use crate::LogPayload;

/// Delivers flushed log chunks to a collector.
///
/// Delivery is fire-and-forget. `submit()` hands the payload off and returns;
/// it must never block on the network and must never panic. A failed delivery
/// is not retried and is not reported back to the caller. Production sinks
/// should emit a `tracing` event instead.
///
/// Each chunk of a flush cycle is submitted independently, so a sink must not
/// assume the previous chunk was delivered before the next one arrives.
pub trait RemoteSink {
    /// Hand `payload` off for delivery.
    fn submit(&self, payload: LogPayload);
}

impl<T: RemoteSink + ?Sized> RemoteSink for Arc<T> {
    fn submit(&self, payload: LogPayload) {
        (**self).submit(payload)
    }
}

impl<T: RemoteSink + ?Sized> RemoteSink for Box<T> {
    fn submit(&self, payload: LogPayload) {
        (**self).submit(payload)
    }
}

/// A type-erased [`RemoteSink`]. Cloning is cheap and delivers to the same sink.
#[derive(Clone)]
pub struct BoxRemoteSink(Arc<dyn RemoteSink + Send + Sync + 'static>);

impl Debug for BoxRemoteSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxRemoteSink").finish()
    }
}

impl BoxRemoteSink {
    /// Create a new [BoxRemoteSink]
    pub fn new(sink: impl RemoteSink + Send + Sync + 'static) -> Self {
        Self(Arc::new(sink))
    }
}

impl RemoteSink for BoxRemoteSink {
    fn submit(&self, payload: LogPayload) {
        self.0.submit(payload)
    }
}
