// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{collections::BTreeMap, time::UNIX_EPOCH};

use assert_json_diff::assert_json_eq;
use pagetrail_core::{
    DEFAULT_CHUNK_SIZE, FormNode, LogOrder, Normalizer, RawEvent, chunk_payloads,
    classify::{ChangeClassifier, ClickClassifier},
    element::ElementSnapshot,
};
use pagetrail_timesource::{ClockFormat, TimeSource, fakes::StaticTimeSource};
use serde_json::json;

#[test]
fn session_payload_matches_the_collector_format() {
    let normalizer = Normalizer::new(
        TimeSource::custom(StaticTimeSource::at_time(UNIX_EPOCH)),
        ClockFormat::utc(),
    );
    let clicks = ClickClassifier::new();
    let changes = ChangeClassifier::new();

    let radio = ElementSnapshot::new("input")
        .attr("type", "radio")
        .value("yearly")
        .within(
            ElementSnapshot::new("div").within(
                ElementSnapshot::new("label").within(
                    ElementSnapshot::new("mat-radio-button")
                        .within(ElementSnapshot::new("mat-radio-group").data("label", "plan")),
                ),
            ),
        );
    let events = [
        RawEvent::route_change("/welcome", Some("/")),
        changes.classify(&radio).unwrap(),
        clicks
            .classify(&ElementSnapshot::new("mat-option").text("Belgium"))
            .unwrap(),
        RawEvent::form_submit(
            BTreeMap::from([("plan".to_owned(), "yearly".to_owned())]),
            &FormNode::group([("plan", FormNode::control(true))]),
        ),
        clicks
            .classify(&ElementSnapshot::new("button").text("Submit"))
            .unwrap(),
    ];
    let mut log: Vec<_> = events
        .into_iter()
        .map(|event| normalizer.normalize(event, "/welcome"))
        .collect();
    LogOrder::TimeThenButtonClick.arrange(&mut log);

    let payloads = chunk_payloads(log, DEFAULT_CHUNK_SIZE);
    assert_json_eq!(
        serde_json::to_value(&payloads).unwrap(),
        json!([{
            "log_level": "INFO",
            "log_message": "Page Events 1",
            "context": [
                {"type": "buttonClick", "text": "Submit", "time": "00:00:00", "page": "/welcome"},
                {"type": "routerChange", "text": "/ -> /welcome", "time": "00:00:00", "page": "/welcome"},
                {
                    "type": "inputChange",
                    "elementType": "RADIO",
                    "elementLabel": "plan",
                    "value": "yearly",
                    "time": "00:00:00",
                    "page": "/welcome",
                },
                {
                    "type": "inputChange",
                    "elementType": "MAT-OPTION",
                    "elementLabel": "Unknown",
                    "value": "Belgium",
                    "time": "00:00:00",
                    "page": "/welcome",
                },
                {
                    "type": "formSubmitValid",
                    "values": {"plan": "yearly"},
                    "time": "00:00:00",
                    "page": "/welcome",
                },
            ],
        }])
    );
}
