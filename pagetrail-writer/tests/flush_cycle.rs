// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    thread,
    time::{Duration, UNIX_EPOCH},
};

use futures::executor::block_on;
use pagetrail_timesource::{ClockFormat, TimeSource, fakes::ManuallyAdvancedTimeSource};
use pagetrail_writer::{ElementType, LogOrder, PageLog, RawEvent, sink::VecSink};
use rstest::rstest;

#[rstest]
#[case(0, 120, &[])]
#[case(1, 120, &[1])]
#[case(120, 120, &[120])]
#[case(250, 120, &[120, 120, 10])]
#[case(5, 2, &[2, 2, 1])]
fn flush_cuts_the_log_into_bounded_chunks(
    #[case] entries: usize,
    #[case] chunk_size: usize,
    #[case] expected: &[usize],
) {
    let sink = VecSink::new();
    let (log, guard) = PageLog::builder().chunk_size(chunk_size).build(sink.clone());
    for i in 0..entries {
        log.record(RawEvent::ApiCall {
            url: format!("/api/{i}"),
        });
    }
    assert_eq!(log.flush(), expected.len());

    let payloads = sink.drain();
    let sizes: Vec<_> = payloads.iter().map(|p| p.context.len()).collect();
    assert_eq!(sizes, expected);
    for (i, payload) in payloads.iter().enumerate() {
        assert_eq!(payload.log_level, "INFO");
        assert_eq!(payload.log_message, format!("Page Events {}", i + 1));
    }
    assert!(log.current().is_empty());
    guard.shut_down();
}

#[test]
fn navigation_session_with_time_then_button_click_order() {
    let clock = ManuallyAdvancedTimeSource::at_time(UNIX_EPOCH + Duration::from_secs(36_000));
    let sink = VecSink::new();
    let (log, guard) = PageLog::builder()
        .time_source(TimeSource::custom(clock.clone()))
        .clock(ClockFormat::utc())
        .order(LogOrder::TimeThenButtonClick)
        .build(sink.clone());

    log.set_page("/welcome");
    log.record(RawEvent::route_change("/welcome", None));
    clock.advance(Duration::from_secs(1));

    log.record(RawEvent::InputChange {
        element_type: ElementType::Input,
        element_label: "name".into(),
        value: "Ada".into(),
    });
    log.record(RawEvent::ButtonClick {
        text: "Continue".into(),
    });

    let live: Vec<_> = log.current().iter().map(|e| e.event().type_name()).collect();
    assert_eq!(live, ["routerChange", "inputChange", "buttonClick"]);

    assert_eq!(log.flush(), 1);
    let payload = sink.drain().remove(0);
    let flushed: Vec<_> = payload
        .context
        .iter()
        .map(|e| (e.time(), e.event().type_name(), e.page()))
        .collect();
    assert_eq!(
        flushed,
        [
            ("10:00:00", "routerChange", "/welcome"),
            ("10:00:01", "buttonClick", "/welcome"),
            ("10:00:01", "inputChange", "/welcome"),
        ]
    );
    guard.shut_down();
}

#[test]
fn reset_racing_a_producer_keeps_later_appends() {
    let (log, guard) = PageLog::new(VecSink::new());
    let producer = {
        let log = log.clone();
        thread::spawn(move || {
            for i in 0..500 {
                log.record(RawEvent::ApiCall {
                    url: format!("/api/{i}"),
                });
            }
        })
    };
    log.reset();
    producer.join().unwrap();

    // whatever survived the reset is a contiguous, ordered tail
    let urls: Vec<_> = log
        .current()
        .iter()
        .map(|e| match e.event() {
            RawEvent::ApiCall { url } => url.clone(),
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    let first: usize = urls.first().map_or(500, |u| u[5..].parse().unwrap());
    let expected: Vec<_> = (first..500).map(|i| format!("/api/{i}")).collect();
    assert_eq!(urls, expected);
    guard.shut_down();
}

#[test]
fn view_is_readable_from_another_thread() {
    let (log, guard) = PageLog::new(VecSink::new());
    let mut view = log.subscribe();
    let watcher = thread::spawn(move || {
        let mut seen = 0;
        while seen < 3 {
            seen = block_on(view.changed()).expect("log shut down early").len();
        }
        seen
    });
    for _ in 0..3 {
        log.record(RawEvent::CloseDialog);
    }
    assert_eq!(watcher.join().unwrap(), 3);
    guard.shut_down();
}
