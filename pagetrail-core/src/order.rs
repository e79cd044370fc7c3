// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::LogEntry;

/// Order in which an accumulated log is handed to the flusher.
///
/// ```
/// # use pagetrail_core::{LogEntry, LogOrder, RawEvent};
/// let mut log = vec![
///     LogEntry::new(RawEvent::Focus { element_label: "email".into() }, "10:00:01", "/"),
///     LogEntry::new(RawEvent::CloseDialog, "10:00:00", "/"),
///     LogEntry::new(RawEvent::ButtonClick { text: "Next".into() }, "10:00:01", "/"),
/// ];
/// LogOrder::TimeThenButtonClick.arrange(&mut log);
/// let types: Vec<_> = log.iter().map(|e| e.event().type_name()).collect();
/// assert_eq!(types, ["closeDialog", "buttonClick", "focus"]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogOrder {
    /// Keep arrival order.
    #[default]
    Arrival,
    /// Stable sort by `time` ascending. Among entries with the same `time`,
    /// button clicks come first; everything else keeps arrival order.
    TimeThenButtonClick,
}

impl LogOrder {
    /// Reorder `entries` in place.
    pub fn arrange(self, entries: &mut [LogEntry]) {
        match self {
            Self::Arrival => {}
            Self::TimeThenButtonClick => entries.sort_by(time_then_button_click),
        }
    }
}

fn time_then_button_click(a: &LogEntry, b: &LogEntry) -> Ordering {
    a.time()
        .cmp(b.time())
        // `true` sorts first
        .then_with(|| b.is_button_click().cmp(&a.is_button_click()))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{ElementType, RawEvent};

    fn input_change(time: &str) -> LogEntry {
        LogEntry::new(
            RawEvent::InputChange {
                element_type: ElementType::Input,
                element_label: "name".into(),
                value: "x".into(),
            },
            time,
            "/",
        )
    }

    fn button_click(time: &str, text: &str) -> LogEntry {
        LogEntry::new(RawEvent::ButtonClick { text: text.into() }, time, "/")
    }

    #[test]
    fn button_click_wins_a_time_tie() {
        let mut log = vec![input_change("12:00:00"), button_click("12:00:00", "Save")];
        LogOrder::TimeThenButtonClick.arrange(&mut log);
        assert!(log[0].is_button_click());
        assert!(!log[1].is_button_click());
    }

    #[test]
    fn arrival_order_is_untouched() {
        let original = vec![
            input_change("12:00:02"),
            button_click("12:00:00", "Save"),
            input_change("12:00:01"),
        ];
        let mut log = original.clone();
        LogOrder::Arrival.arrange(&mut log);
        assert_eq!(log, original);
    }

    #[test]
    fn sort_is_stable_within_a_class() {
        let mut log = vec![
            button_click("12:00:00", "first"),
            input_change("12:00:00"),
            button_click("12:00:00", "second"),
            input_change("11:59:59"),
        ];
        LogOrder::TimeThenButtonClick.arrange(&mut log);
        let texts: Vec<_> = log
            .iter()
            .map(|e| match e.event() {
                RawEvent::ButtonClick { text } => text.as_str(),
                _ => e.time(),
            })
            .collect();
        assert_eq!(texts, ["11:59:59", "first", "second", "12:00:00"]);
    }

    #[rstest]
    #[case("\"arrival\"", LogOrder::Arrival)]
    #[case("\"time-then-button-click\"", LogOrder::TimeThenButtonClick)]
    fn parses_config_names(#[case] raw: &str, #[case] expected: LogOrder) {
        assert_eq!(serde_json::from_str::<LogOrder>(raw).unwrap(), expected);
    }
}
