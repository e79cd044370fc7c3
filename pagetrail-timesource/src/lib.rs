// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Wall-clock access for pagetrail.
//!
//! Every log entry is stamped with the time it was normalized. Reading the
//! clock through a [`TimeSource`] lets tests pin that time with the fakes in
//! [`fakes`] (enable the `test-util` feature).

use std::{fmt::Debug, sync::Arc, time::SystemTime};

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Module containing fake time sources for testing
///
/// To enable this module, you must enable the `test-util` feature.
#[cfg(feature = "test-util")]
pub mod fakes;

/// Trait for providing custom time sources
///
/// Implementors of this trait can be used to provide custom time behavior
/// for testing or specialized use cases.
pub trait Time: Send + Sync + Debug {
    /// Get the current system time
    fn now(&self) -> SystemTime;
}

/// Where the clock is read from.
///
/// Cloning is cheap; a custom source is shared behind an [`Arc`].
#[derive(Clone, Default)]
pub enum TimeSource {
    /// Use the system time
    #[default]
    System,
    /// Use a custom time source
    Custom(Arc<dyn Time>),
}

impl Debug for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::System => write!(f, "TimeSource::System"),
            Self::Custom(_) => write!(f, "TimeSource::Custom(...)"),
        }
    }
}

impl TimeSource {
    /// Create a new TimeSource with a custom time implementation
    ///
    /// # Examples
    ///
    /// ```
    /// use pagetrail_timesource::{TimeSource, fakes::StaticTimeSource};
    /// use std::time::UNIX_EPOCH;
    ///
    /// let ts = TimeSource::custom(StaticTimeSource::at_time(UNIX_EPOCH));
    /// assert_eq!(ts.system_time(), UNIX_EPOCH);
    /// ```
    pub fn custom(custom: impl Time + 'static) -> TimeSource {
        Self::Custom(Arc::new(custom))
    }

    /// Get the current [`SystemTime`] from this time source
    pub fn system_time(&self) -> SystemTime {
        match self {
            Self::System => SystemTime::now(),
            Self::Custom(ts) => ts.now(),
        }
    }

    /// Read the clock and render it with `format`.
    pub fn clock_string(&self, format: ClockFormat) -> String {
        format.render(self.system_time())
    }
}

/// Renders a point in time as a wall-clock string at seconds resolution.
///
/// The output is always `HH:MM:SS` on a 24-hour clock, zero padded, so two
/// strings from the same day compare the same way the instants do.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockFormat {
    /// The timezone of the host
    #[default]
    Local,
    /// A fixed UTC offset, mostly useful to get deterministic strings in tests
    Fixed(FixedOffset),
}

impl ClockFormat {
    const PATTERN: &'static str = "%H:%M:%S";

    /// A [`ClockFormat::Fixed`] at UTC
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    /// A [`ClockFormat::Fixed`] `minutes` east of UTC, or `None` if the offset
    /// is a day or more.
    pub fn east_minutes(minutes: i32) -> Option<Self> {
        let seconds = minutes.checked_mul(60)?;
        FixedOffset::east_opt(seconds).map(Self::Fixed)
    }

    /// Render `time` as `HH:MM:SS`
    pub fn render(self, time: SystemTime) -> String {
        let utc = DateTime::<Utc>::from(time);
        match self {
            Self::Local => utc.with_timezone(&Local).format(Self::PATTERN).to_string(),
            Self::Fixed(offset) => utc.with_timezone(&offset).format(Self::PATTERN).to_string(),
        }
    }
}
