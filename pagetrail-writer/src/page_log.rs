// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains [`PageLog`], the ordered log of a page session.
//!
//! Every producer (DOM listeners, the navigation listener, dialog lifecycle
//! hooks, HTTP interceptors, explicit application calls) writes to the log
//! through a cloned [`PageLog`]. Appends, resets and flushes are folded on
//! the calling thread while holding one lock, so they form a single total
//! order and each of them is visible to [`PageLog::current`] by the time it
//! returns. A reset or flush can never lose or duplicate an append that raced
//! with it: the append is folded either before it and flushed, or after it
//! and kept for the next cycle.

use std::{
    fmt::{self, Debug},
    num::NonZeroUsize,
    ops::Deref,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use pagetrail_core::{DEFAULT_CHUNK_SIZE, LogEntry, LogOrder, Normalizer, RawEvent, RemoteSink};
use pagetrail_timesource::{ClockFormat, TimeSource};
use tokio::sync::watch;

use crate::{flush::flush, rate_limit::rate_limited};

/// Builder for [`PageLog`]
pub struct PageLogBuilder {
    chunk_size: NonZeroUsize,
    order: LogOrder,
    time_source: TimeSource,
    clock: ClockFormat,
    initial_page: String,
    flush_on_shutdown: bool,
}

impl Default for PageLogBuilder {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            order: LogOrder::default(),
            time_source: TimeSource::default(),
            clock: ClockFormat::default(),
            initial_page: "/".into(),
            flush_on_shutdown: false,
        }
    }
}

impl PageLogBuilder {
    /// Builder with every setting at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Maximum number of entries per delivered payload. Defaults to 120.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        let Some(chunk_size) = NonZeroUsize::new(chunk_size) else {
            panic!("chunk_size must be greater than zero");
        };
        self.chunk_size = chunk_size;
        self
    }

    /// Order the log is handed to the sink in. Defaults to [`LogOrder::Arrival`].
    pub fn order(mut self, order: LogOrder) -> Self {
        self.order = order;
        self
    }

    /// Clock used to stamp recorded events. Defaults to the system clock.
    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = time_source;
        self
    }

    /// How the clock reading is rendered. Defaults to local time.
    pub fn clock(mut self, clock: ClockFormat) -> Self {
        self.clock = clock;
        self
    }

    /// Page recorded events are attributed to before the first
    /// [`PageLog::set_page`]. Defaults to `/`.
    pub fn initial_page(mut self, page: impl Into<String>) -> Self {
        self.initial_page = page.into();
        self
    }

    /// If true, whatever is left in the log is flushed when the log shuts
    /// down, the way a page flushes on unload. Defaults to false.
    pub fn flush_on_shutdown(mut self, flush_on_shutdown: bool) -> Self {
        self.flush_on_shutdown = flush_on_shutdown;
        self
    }

    /// Build a [`PageLog`] that flushes to `sink`.
    ///
    /// Returns the log and a [`PageLogGuard`] that shuts the log down when
    /// dropped.
    pub fn build(self, sink: impl RemoteSink + Send + 'static) -> (PageLog, PageLogGuard) {
        let (view, view_receiver) = watch::channel(LogSnapshot::default());

        let fold = Arc::new(Mutex::new(Fold {
            view: Some(view),
            page: self.initial_page,
            normalizer: Normalizer::new(self.time_source, self.clock),
            order: self.order,
            chunk_size: self.chunk_size,
            flush_on_shutdown: self.flush_on_shutdown,
            sink: Box::new(sink),
        }));
        tracing::debug!("page log started");

        (
            PageLog {
                fold: Arc::clone(&fold),
                view: view_receiver,
            },
            PageLogGuard { fold: Some(fold) },
        )
    }
}

/// The ordered log of a page session.
///
/// Cloning is cheap and still writes to the same log. Writes never fail;
/// once the log is shut down they are dropped with a `tracing` warning.
///
/// Every write is folded before the call returns, so [`PageLog::current`]
/// always reflects the caller's own writes.
///
/// ```
/// # use pagetrail_writer::{PageLog, RawEvent, sink::VecSink};
/// let sink = VecSink::new();
/// let (log, guard) = PageLog::new(sink.clone());
///
/// log.set_page("/welcome");
/// log.record(RawEvent::ButtonClick { text: "Start".into() });
/// assert_eq!(log.current()[0].page(), "/welcome");
///
/// assert_eq!(log.flush(), 1);
/// assert!(log.current().is_empty());
/// assert_eq!(sink.drain()[0].log_message, "Page Events 1");
/// # guard.shut_down();
/// ```
#[derive(Clone)]
pub struct PageLog {
    fold: Arc<Mutex<Fold>>,
    view: watch::Receiver<LogSnapshot>,
}

impl Debug for PageLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLog")
            .field("entries", &self.view.borrow().len())
            .finish()
    }
}

impl PageLog {
    /// Create a new page log using the [`PageLogBuilder`] defaults.
    pub fn new(sink: impl RemoteSink + Send + 'static) -> (Self, PageLogGuard) {
        PageLogBuilder::new().build(sink)
    }

    /// Start building a page log with non-default settings
    pub fn builder() -> PageLogBuilder {
        PageLogBuilder::new()
    }

    /// Append an already normalized entry.
    pub fn append(&self, entry: LogEntry) {
        self.with_fold(|fold| fold.append(entry));
    }

    /// Normalize `event` against the current page and the clock, then append it.
    ///
    /// The page is the one set by the last [`PageLog::set_page`] or
    /// [`PageLog::navigate`] folded before this call.
    pub fn record(&self, event: RawEvent) {
        self.with_fold(|fold| fold.record(event));
    }

    /// Attribute events recorded from now on to `path`.
    pub fn set_page(&self, path: impl Into<String>) {
        let path = path.into();
        self.with_fold(|fold| fold.page = path);
    }

    /// Move to `path` and record the route change that got there, as a
    /// `routerChange` entry stamped with the new page.
    pub fn navigate(&self, path: impl Into<String>) {
        let path = path.into();
        self.with_fold(|fold| {
            fold.page.clone_from(&path);
            fold.record(RawEvent::route_change(path, None));
        });
    }

    /// Empty the log. Appends made after this call land in the emptied log.
    pub fn reset(&self) {
        self.with_fold(|fold| fold.reset());
    }

    /// Run a flush cycle: submit the log to the sink in chunks, then reset it.
    ///
    /// Returns the number of payloads handed to the sink once they are all
    /// submitted, not once they are delivered. No append can land between the
    /// read of the log and the reset.
    pub fn flush(&self) -> usize {
        self.with_fold(|fold| fold.flush()).unwrap_or(0)
    }

    /// Snapshot of the log. Later writes never change a snapshot already taken.
    pub fn current(&self) -> LogSnapshot {
        self.view.borrow().clone()
    }

    /// A live view of the log, notified after every append, reset and flush.
    pub fn subscribe(&self) -> LogView {
        LogView(self.view.clone())
    }

    fn with_fold<R>(&self, f: impl FnOnce(&mut Fold) -> R) -> Option<R> {
        // a sink that panicked mid-flush leaves the log itself consistent
        let mut fold = self.fold.lock().unwrap_or_else(PoisonError::into_inner);
        if fold.view.is_none() {
            rate_limited!(
                Duration::from_secs(1),
                tracing::warn!("page log is shut down, dropping event")
            );
            return None;
        }
        Some(f(&mut fold))
    }
}

/// Guard that shuts the [`PageLog`] down when dropped.
///
/// After shutdown, writes through any clone of the log are dropped and
/// [`LogView::changed`] returns `None`. With
/// [`PageLogBuilder::flush_on_shutdown`], the log is flushed first.
pub struct PageLogGuard {
    fold: Option<Arc<Mutex<Fold>>>,
}

impl Debug for PageLogGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageLogGuard")
            .field("armed", &self.fold.is_some())
            .finish()
    }
}

impl PageLogGuard {
    /// Drop the guard but keep the log open for as long as [`PageLog`]
    /// clones exist.
    pub fn forget(mut self) {
        self.fold = None;
    }

    /// Alias for `drop(guard)`.
    pub fn shut_down(self) {}
}

impl Drop for PageLogGuard {
    fn drop(&mut self) {
        if let Some(fold) = self.fold.take() {
            fold.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .shut_down();
        }
    }
}

/// An immutable snapshot of a page log. Derefs to `[LogEntry]`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LogSnapshot(Arc<Vec<LogEntry>>);

impl LogSnapshot {
    /// Copy the entries out
    pub fn to_vec(&self) -> Vec<LogEntry> {
        self.0.to_vec()
    }

    // copies only if someone is still holding this snapshot
    fn push(&mut self, entry: LogEntry) {
        Arc::make_mut(&mut self.0).push(entry)
    }
}

impl Deref for LogSnapshot {
    type Target = [LogEntry];

    fn deref(&self) -> &[LogEntry] {
        &self.0
    }
}

impl Debug for LogSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

/// Live, read-only view of a [`PageLog`], for displays that follow the log.
///
/// Snapshots share storage with the log until the next write. An append made
/// while a snapshot of the latest log is still alive copies the log once, so
/// a follower should drop each snapshot before waiting for the next change.
/// One that keeps every snapshot pays a full copy per append.
#[derive(Clone, Debug)]
pub struct LogView(watch::Receiver<LogSnapshot>);

impl LogView {
    /// Snapshot of the log
    pub fn current(&self) -> LogSnapshot {
        self.0.borrow().clone()
    }

    /// Wait for the next change and return the log after it. Returns `None`
    /// once the log has shut down.
    ///
    /// Several writes made while the follower was busy are reported as one
    /// change.
    pub async fn changed(&mut self) -> Option<LogSnapshot> {
        self.0.changed().await.ok()?;
        Some(self.0.borrow_and_update().clone())
    }
}

// Shared state behind the lock. `view` is `None` once the log has shut down.
struct Fold {
    view: Option<watch::Sender<LogSnapshot>>,
    page: String,
    normalizer: Normalizer,
    order: LogOrder,
    chunk_size: NonZeroUsize,
    flush_on_shutdown: bool,
    sink: Box<dyn RemoteSink + Send>,
}

impl Fold {
    fn record(&mut self, event: RawEvent) {
        let entry = self.normalizer.normalize(event, &self.page);
        self.append(entry);
    }

    fn append(&mut self, entry: LogEntry) {
        if let Some(view) = &self.view {
            view.send_modify(|log| log.push(entry));
        }
    }

    fn reset(&mut self) {
        if let Some(view) = &self.view {
            view.send_modify(|log| *log = LogSnapshot::default());
        }
    }

    fn flush(&mut self) -> usize {
        let Some(view) = &self.view else {
            return 0;
        };
        let log = view.borrow().clone();
        let payloads = flush(&log, self.order, self.chunk_size, &*self.sink);
        tracing::debug!(entries = log.len(), payloads, "flushed page log");
        self.reset();
        payloads
    }

    fn shut_down(&mut self) {
        if self.view.is_none() {
            return;
        }
        if self.flush_on_shutdown {
            self.flush();
        }
        // closes every LogView
        self.view = None;
        tracing::info!("page log has shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::{thread, time::UNIX_EPOCH};

    use futures::executor::block_on;
    use pagetrail_core::ElementType;
    use pagetrail_timesource::fakes::StaticTimeSource;

    use super::*;
    use crate::sink::{DevNullSink, VecSink};

    fn api_call(i: usize) -> LogEntry {
        LogEntry::new(
            RawEvent::ApiCall {
                url: format!("/api/{i}"),
            },
            "10:00:00",
            "/",
        )
    }

    fn url(entry: &LogEntry) -> &str {
        match entry.event() {
            RawEvent::ApiCall { url } => url,
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn appends_keep_arrival_order() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        for i in 0..1_000 {
            log.append(api_call(i));
        }
        assert_eq!(log.current().to_vec(), (0..1_000).map(api_call).collect::<Vec<_>>());
        guard.shut_down();
    }

    #[test]
    fn current_sees_every_append_made_before_it() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        for i in 0..50_000 {
            log.append(api_call(i));
        }
        assert_eq!(log.current().len(), 50_000);

        for i in 0..50_000 {
            log.append(api_call(i));
        }
        log.reset();
        assert_eq!(log.current().len(), 0);
        guard.shut_down();
    }

    #[test]
    fn snapshots_are_not_affected_by_later_writes() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        log.append(api_call(0));
        let snapshot = log.current();

        log.append(api_call(1));
        assert_eq!(log.current().len(), 2);
        log.reset();

        assert_eq!(snapshot.to_vec(), vec![api_call(0)]);
        assert!(log.current().is_empty());
        guard.shut_down();
    }

    #[test]
    fn append_after_reset_lands_in_the_new_log() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        for i in 0..5 {
            log.append(api_call(i));
        }
        log.reset();
        assert!(log.current().is_empty());

        log.append(api_call(5));
        assert_eq!(log.current().to_vec(), vec![api_call(5)]);
        guard.shut_down();
    }

    #[test]
    fn flush_submits_chunks_then_resets() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::new(sink.clone());
        for i in 0..250 {
            log.append(api_call(i));
        }
        assert_eq!(log.flush(), 3);

        assert!(log.current().is_empty());
        let payloads = sink.drain();
        let sizes: Vec<_> = payloads.iter().map(|p| p.context.len()).collect();
        assert_eq!(sizes, [120, 120, 10]);
        assert_eq!(payloads[2].log_message, "Page Events 3");
        assert_eq!(url(&payloads[2].context[9]), "/api/249");
        guard.shut_down();
    }

    #[test]
    fn flushing_an_empty_log_submits_nothing() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::new(sink.clone());
        assert_eq!(log.flush(), 0);
        assert_eq!(log.flush(), 0);
        assert!(sink.is_empty());
        assert!(log.current().is_empty());
        guard.shut_down();
    }

    #[test]
    fn record_and_navigate_stamp_time_and_current_page() {
        let (log, guard) = PageLog::builder()
            .time_source(TimeSource::custom(StaticTimeSource::at_time(UNIX_EPOCH)))
            .clock(ClockFormat::utc())
            .build(DevNullSink::new());

        log.record(RawEvent::CloseDialog);
        log.navigate("/welcome");
        log.set_page("/thank-you");
        log.record(RawEvent::CloseDialog);

        let current = log.current();
        assert_eq!(current[0].page(), "/");
        assert_eq!(current[1].page(), "/welcome");
        assert_eq!(current[1].time(), "00:00:00");
        assert_eq!(
            current[1].event(),
            &RawEvent::RouterChange {
                text: "/welcome".into()
            }
        );
        assert_eq!(current[2].page(), "/thank-you");
        guard.shut_down();
    }

    #[test]
    fn appends_from_many_producers_are_all_kept_in_producer_order() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        let producers: Vec<_> = (0..4)
            .map(|p| {
                let log = log.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        log.append(api_call(p * 1_000 + i));
                    }
                })
            })
            .collect();
        for producer in producers {
            producer.join().unwrap();
        }

        let current = log.current();
        assert_eq!(current.len(), 1_000);
        for p in 0..4 {
            let mine: Vec<_> = current
                .iter()
                .map(|e| url(e).to_owned())
                .filter(|u| u["/api/".len()..].parse::<usize>().unwrap() / 1_000 == p)
                .collect();
            let expected: Vec<_> = (0..250).map(|i| format!("/api/{}", p * 1_000 + i)).collect();
            assert_eq!(mine, expected);
        }
        guard.shut_down();
    }

    #[test]
    fn appends_racing_flushes_are_never_lost_or_duplicated() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::builder().chunk_size(7).build(sink.clone());
        let producer = {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..2_000 {
                    log.append(api_call(i));
                }
            })
        };
        for _ in 0..50 {
            log.flush();
        }
        producer.join().unwrap();

        let mut seen: Vec<String> = sink
            .drain()
            .into_iter()
            .flat_map(|p| p.context)
            .chain(log.current().to_vec())
            .map(|e| url(&e).to_owned())
            .collect();
        assert_eq!(seen.len(), 2_000);
        let expected: Vec<_> = (0..2_000).map(|i| format!("/api/{i}")).collect();
        // single producer: flush boundaries never reorder its entries
        assert_eq!(seen, expected);
        seen.dedup();
        assert_eq!(seen.len(), 2_000);
        guard.shut_down();
    }

    #[test]
    fn view_follows_the_log() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        let mut view = log.subscribe();

        log.append(api_call(0));
        let after_append = block_on(view.changed()).unwrap();
        assert_eq!(after_append.len(), 1);

        log.reset();
        let after_reset = block_on(view.changed()).unwrap();
        assert!(after_reset.is_empty());
        assert!(view.current().is_empty());

        guard.shut_down();
        assert_eq!(block_on(view.changed()), None);
    }

    #[test]
    fn view_is_notified_when_an_empty_log_is_reset_or_flushed() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        let mut view = log.subscribe();

        log.reset();
        assert_eq!(block_on(view.changed()).map(|log| log.len()), Some(0));

        log.flush();
        assert_eq!(block_on(view.changed()).map(|log| log.len()), Some(0));
        guard.shut_down();
    }

    #[test]
    fn held_snapshot_survives_a_growing_log() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        let view = log.subscribe();
        log.append(api_call(0));
        let held = view.current();
        for i in 1..100 {
            log.append(api_call(i));
        }
        assert_eq!(held.len(), 1);
        assert_eq!(view.current().len(), 100);
        guard.shut_down();
    }

    #[test]
    fn writes_after_shut_down_are_dropped() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::new(sink.clone());
        for i in 0..10 {
            log.append(api_call(i));
        }
        assert_eq!(log.flush(), 1);
        guard.shut_down();
        assert_eq!(sink.drain()[0].context.len(), 10);

        log.append(api_call(10));
        assert_eq!(log.flush(), 0);
        assert!(log.current().is_empty());
        assert!(sink.is_empty());
    }

    #[test]
    fn forgotten_guard_leaves_the_log_open() {
        let (log, guard) = PageLog::new(DevNullSink::new());
        guard.forget();
        log.append(api_call(0));
        assert_eq!(log.current().len(), 1);
    }

    #[test]
    fn flush_on_shutdown_delivers_leftovers() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::builder()
            .flush_on_shutdown(true)
            .build(sink.clone());
        log.record(RawEvent::InputChange {
            element_type: ElementType::Input,
            element_label: "email".into(),
            value: "a@b.c".into(),
        });
        guard.shut_down();
        let payloads = sink.drain();
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].context.len(), 1);
    }

    #[test]
    fn configured_order_applies_to_flushed_payloads() {
        let sink = VecSink::new();
        let (log, guard) = PageLog::builder()
            .order(LogOrder::TimeThenButtonClick)
            .build(sink.clone());
        log.append(LogEntry::new(
            RawEvent::Blur {
                element_label: "q".into(),
            },
            "10:00:01",
            "/",
        ));
        log.append(LogEntry::new(
            RawEvent::ButtonClick { text: "Go".into() },
            "10:00:01",
            "/",
        ));
        log.append(api_call(0));
        // the live log keeps arrival order
        assert!(!log.current()[0].is_button_click());

        log.flush();
        let types: Vec<_> = sink.drain()[0]
            .context
            .iter()
            .map(|e| e.event().type_name())
            .collect();
        assert_eq!(types, ["apiCall", "buttonClick", "blur"]);
        guard.shut_down();
    }

    #[test]
    #[should_panic = "chunk_size must be greater than zero"]
    fn zero_chunk_size_is_rejected() {
        let _ = PageLog::builder().chunk_size(0);
    }
}
