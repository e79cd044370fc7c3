// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Replays a short page session: a welcome form, a help dialog, an API call
//! and the move to a thank-you page.
//!
//! Payloads are posted to `$PAGETRAIL_COLLECTOR` (e.g. `http://localhost:8080/`)
//! when it is set, and printed otherwise. `RUST_LOG=pagetrail_writer=debug`
//! shows the flush cycle.

use std::{collections::BTreeMap, sync::Arc};

use pagetrail::{
    FormNode, LogView, Pipeline, PipelineConfig, element::ElementSnapshot, sink::VecSink,
};
use reqwest::{Url, cookie::Jar};
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
order = "time-then-button-click"
route-label = "pairwise"
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = PipelineConfig::from_toml_str(CONFIG)?;
    let printed = VecSink::new();
    let pipeline = match std::env::var("PAGETRAIL_COLLECTOR") {
        Ok(base) => {
            let base = Url::parse(&base)?;
            let jar = Arc::new(Jar::default());
            jar.add_cookie_str("XSRF-TOKEN=demo-token", &base);
            Pipeline::http(&config, base, jar)?
        }
        Err(_) => Pipeline::new(&config, printed.clone())?,
    };

    let watcher = tokio::spawn(follow(pipeline.log().subscribe()));
    replay(&pipeline);
    let submitted = pipeline.save_logs();
    tracing::info!(submitted, "saved page logs");

    for payload in printed.drain() {
        println!("{}", serde_json::to_string_pretty(&payload)?);
    }
    pipeline.shut_down();
    watcher.await?;
    Ok(())
}

fn replay(pipeline: &Pipeline) {
    let tracker = pipeline.tracker();
    let api = pipeline.api_calls();

    tracker.navigation_started("/");
    tracker.navigation_ended("/");
    tracker.navigation_started("/welcome");
    tracker.navigation_ended("/welcome");

    let name = ElementSnapshot::new("input").data("label", "name");
    tracker.focus(&name);
    tracker.change(&name.clone().value("Ada"));
    tracker.blur(&name);
    tracker.click(&ElementSnapshot::new("mat-option").data("label", "country").text("Belgium"));

    tracker.click(&ElementSnapshot::new("button").text("open dialog"));
    tracker.dialog_opened(Some("HelpDialogComponent"));
    tracker.dialogs_closed();

    api.request_sent("/api/countries?lang=en");
    api.response_received("/api/countries?lang=en", 200);
    api.request_sent("/assets/images/flag.png");

    let values = BTreeMap::from([
        ("name".to_owned(), "Ada".to_owned()),
        ("country".to_owned(), "Belgium".to_owned()),
    ]);
    let form = FormNode::group([
        ("name", FormNode::control(true)),
        ("country", FormNode::control(true)),
    ]);
    tracker.click(&ElementSnapshot::new("span").text("Submit").within(ElementSnapshot::new("button")));
    tracker.form_submitted(values, &form);

    tracker.navigation_started("/thank-you");
    tracker.navigation_ended("/thank-you");
}

// what a summary page following the log would render
async fn follow(mut view: LogView) {
    while let Some(log) = view.changed().await {
        tracing::info!(entries = log.len(), "page log changed");
    }
}
