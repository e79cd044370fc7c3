// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains [`LogEntry`], the canonical record stored in a page log, and the
//! [`Normalizer`] that produces it.

use pagetrail_timesource::{ClockFormat, TimeSource};
use serde::{Deserialize, Serialize};

use crate::RawEvent;

/// A [`RawEvent`] stamped with the wall-clock time and the page it happened on.
///
/// Serializes flat: the event's fields followed by `time` and `page`, e.g.
/// `{"type":"buttonClick","text":"Next","time":"13:04:05","page":"/welcome"}`.
///
/// Entries are immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(flatten)]
    event: RawEvent,
    time: String,
    page: String,
}

impl LogEntry {
    /// Build an entry from already known parts.
    pub fn new(event: RawEvent, time: impl Into<String>, page: impl Into<String>) -> Self {
        Self {
            event,
            time: time.into(),
            page: page.into(),
        }
    }

    /// The recorded interaction
    pub fn event(&self) -> &RawEvent {
        &self.event
    }

    /// Wall-clock time of normalization, `HH:MM:SS`
    pub fn time(&self) -> &str {
        &self.time
    }

    /// Navigation path that was active at normalization
    pub fn page(&self) -> &str {
        &self.page
    }

    /// True when the wrapped event is a [`RawEvent::ButtonClick`]
    pub fn is_button_click(&self) -> bool {
        self.event.is_button_click()
    }
}

/// Stamps raw events with the current time and page.
///
/// Normalization never fails and never drops an event: any [`RawEvent`] is
/// passed through unchanged apart from the two added fields.
#[derive(Clone, Debug, Default)]
pub struct Normalizer {
    time_source: TimeSource,
    clock: ClockFormat,
}

impl Normalizer {
    /// A normalizer reading `time_source` and rendering it with `clock`.
    pub fn new(time_source: TimeSource, clock: ClockFormat) -> Self {
        Self { time_source, clock }
    }

    /// Stamp `raw` with the clock reading at call time and `current_page`.
    pub fn normalize(&self, raw: RawEvent, current_page: &str) -> LogEntry {
        LogEntry {
            event: raw,
            time: self.time_source.clock_string(self.clock),
            page: current_page.to_owned(),
        }
    }
}
