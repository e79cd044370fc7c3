// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    collections::BTreeMap,
    fmt,
    sync::{Arc, Mutex, PoisonError},
};

use pagetrail_core::{
    FormNode, RawEvent,
    classify::{ChangeClassifier, ClickClassifier, FocusClassifier},
    element::ElementSnapshot,
    label::UNKNOWN_LABEL,
};
use pagetrail_writer::PageLog;
use serde::{Deserialize, Serialize};

/// How navigations are turned into `routerChange` entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouteLabel {
    /// One entry per completed navigation, labelled with the destination and
    /// stamped with the new page.
    #[default]
    Destination,
    /// One entry per started navigation after the first, labelled
    /// `"<from> -> <to>"` and stamped with the page being left.
    Pairwise,
}

/// The handle event producers record interactions through.
///
/// A `Tracker` wraps a [`PageLog`] with the listeners a page wires up: DOM
/// click, change, focus and blur listeners, the router, the dialog service and
/// form submit handlers. Cloning is cheap and every clone records to the same
/// log.
///
/// ```
/// # use pagetrail::{PageLog, Tracker, sink::VecSink};
/// # use pagetrail::element::ElementSnapshot;
/// let (log, guard) = PageLog::new(VecSink::new());
/// let tracker = Tracker::new(log.clone());
///
/// tracker.navigation_ended("/welcome");
/// tracker.click(&ElementSnapshot::new("button").text("Next"));
/// tracker.dialog_opened(None);
///
/// let types: Vec<_> = log.current().iter().map(|e| e.event().type_name()).collect();
/// assert_eq!(types, ["routerChange", "buttonClick", "openDialog"]);
/// # guard.shut_down();
/// ```
#[derive(Clone)]
pub struct Tracker {
    log: PageLog,
    route_label: RouteLabel,
    // URL of the last started navigation, for pairwise labels
    last_started: Arc<Mutex<Option<String>>>,
    clicks: Arc<ClickClassifier>,
    changes: Arc<ChangeClassifier>,
    focus: Arc<FocusClassifier>,
}

impl fmt::Debug for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracker")
            .field("log", &self.log)
            .field("route_label", &self.route_label)
            .finish_non_exhaustive()
    }
}

impl Tracker {
    /// A tracker recording to `log` with the default classifiers and
    /// [`RouteLabel::Destination`].
    pub fn new(log: PageLog) -> Self {
        Self {
            log,
            route_label: RouteLabel::default(),
            last_started: Arc::default(),
            clicks: Arc::default(),
            changes: Arc::default(),
            focus: Arc::default(),
        }
    }

    /// Label navigations with `route_label`.
    pub fn with_route_label(mut self, route_label: RouteLabel) -> Self {
        self.route_label = route_label;
        self
    }

    /// Classify clicks with `classifier`.
    pub fn with_click_classifier(mut self, classifier: ClickClassifier) -> Self {
        self.clicks = Arc::new(classifier);
        self
    }

    /// Classify value changes with `classifier`.
    pub fn with_change_classifier(mut self, classifier: ChangeClassifier) -> Self {
        self.changes = Arc::new(classifier);
        self
    }

    /// Classify focus and blur with `classifier`.
    pub fn with_focus_classifier(mut self, classifier: FocusClassifier) -> Self {
        self.focus = Arc::new(classifier);
        self
    }

    /// The log this tracker records to
    pub fn log(&self) -> &PageLog {
        &self.log
    }

    /// Record an event built by the application.
    pub fn track(&self, event: RawEvent) {
        self.log.record(event);
    }

    /// The router started navigating to `url`.
    pub fn navigation_started(&self, url: impl Into<String>) {
        let url = url.into();
        let mut last = self.last_started.lock().unwrap_or_else(PoisonError::into_inner);
        // recorded under the lock so concurrent navigations keep their order
        if let Some(from) = last.replace(url.clone())
            && self.route_label == RouteLabel::Pairwise
        {
            self.log.record(RawEvent::route_change(url, Some(&from)));
        }
    }

    /// The router finished navigating to `url`. Entries recorded from now on
    /// are attributed to `url`.
    pub fn navigation_ended(&self, url: impl Into<String>) {
        match self.route_label {
            RouteLabel::Destination => self.log.navigate(url),
            RouteLabel::Pairwise => self.log.set_page(url),
        }
    }

    /// A dialog opened. `component` identifies its content, when known.
    pub fn dialog_opened(&self, component: Option<&str>) {
        let component_name = component
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_LABEL)
            .to_owned();
        self.log.record(RawEvent::OpenDialog { component_name });
    }

    /// The last open dialog closed.
    pub fn dialogs_closed(&self) {
        self.log.record(RawEvent::CloseDialog);
    }

    /// A form was submitted with raw `values`; `form` is its control tree.
    pub fn form_submitted(&self, values: BTreeMap<String, String>, form: &FormNode) {
        self.log.record(RawEvent::form_submit(values, form));
    }

    /// A click landed on `target`. Returns whether anything was recorded.
    pub fn click(&self, target: &ElementSnapshot) -> bool {
        self.record_if(self.clicks.classify(target))
    }

    /// The value of `target` changed. Returns whether anything was recorded.
    pub fn change(&self, target: &ElementSnapshot) -> bool {
        self.record_if(self.changes.classify(target))
    }

    /// `target` gained focus. Returns whether anything was recorded.
    pub fn focus(&self, target: &ElementSnapshot) -> bool {
        self.record_if(self.focus.focus(target))
    }

    /// `target` lost focus. Returns whether anything was recorded.
    pub fn blur(&self, target: &ElementSnapshot) -> bool {
        self.record_if(self.focus.blur(target))
    }

    fn record_if(&self, event: Option<RawEvent>) -> bool {
        match event {
            Some(event) => {
                self.log.record(event);
                true
            }
            None => {
                tracing::trace!("ignoring event on an untracked element");
                false
            }
        }
    }
}
