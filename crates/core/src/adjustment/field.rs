//! Debounced saving of typed item counts
//!
//! Every keystroke stores the raw value locally and restarts the item's quiet
//! window; once it elapses the latest absolute value is written. The status
//! returned by the server replaces the local one.
//!
//! An item has at most one save in flight. A window that elapses meanwhile
//! is picked up by the running save as soon as it answers, and the answer to
//! a superseded value is not applied.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use marops_domain::{ItemCountField, LineStatus, MarOpsError, RecordId, Result};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::ports::FieldWriter;
use super::timer::DebounceTimer;

/// Save indicator shown next to an item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveFeedback {
    #[default]
    Idle,
    Saving,
    /// Cleared back to `Idle` after the feedback hold.
    Saved,
}

#[derive(Debug, Default)]
struct Slot {
    value: f64,
    status: Option<LineStatus>,
    feedback: SaveFeedback,
    save_timer: Option<DebounceTimer>,
    clear_timer: Option<DebounceTimer>,
    in_flight: bool,
    /// A quiet window elapsed while a save was in flight.
    resave: bool,
}

struct FieldInner {
    writer: Arc<dyn FieldWriter>,
    field: ItemCountField,
    quiet: Duration,
    feedback_hold: Duration,
    slots: Mutex<HashMap<RecordId, Slot>>,
    revision: watch::Sender<u64>,
}

/// Per-item debounce for one count field.
pub struct FieldDebouncer {
    inner: Arc<FieldInner>,
}

impl FieldDebouncer {
    pub fn new(
        writer: Arc<dyn FieldWriter>,
        field: ItemCountField,
        quiet: Duration,
        feedback_hold: Duration,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(FieldInner {
                writer,
                field,
                quiet,
                feedback_hold,
                slots: Mutex::new(HashMap::new()),
                revision,
            }),
        }
    }

    #[must_use]
    pub fn field(&self) -> ItemCountField {
        self.inner.field
    }

    /// Store a typed value and restart the item's quiet window.
    ///
    /// # Errors
    /// `InvalidInput` for negative or non-finite values.
    pub fn set(&self, item: &RecordId, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(MarOpsError::InvalidInput(format!("invalid quantity: {value}")));
        }
        {
            let mut slots = self.inner.slots.lock();
            let slot = slots.entry(item.clone()).or_default();
            slot.value = value;
            slot.save_timer = Some(self.schedule_save(item.clone()));
        }
        debug!(item = %item, field = self.inner.field.wire_name(), value, "Typed value buffered");
        self.inner.bump();
        Ok(())
    }

    /// Locally typed value, if the user touched the item.
    #[must_use]
    pub fn value(&self, item: &RecordId) -> Option<f64> {
        self.inner.slots.lock().get(item).map(|s| s.value)
    }

    /// Status last returned by the server for the item.
    #[must_use]
    pub fn status(&self, item: &RecordId) -> Option<LineStatus> {
        self.inner.slots.lock().get(item).and_then(|s| s.status)
    }

    #[must_use]
    pub fn feedback(&self, item: &RecordId) -> SaveFeedback {
        self.inner.slots.lock().get(item).map_or(SaveFeedback::Idle, |s| s.feedback)
    }

    /// Forget an item, cancelling its timers.
    pub fn forget(&self, item: &RecordId) {
        if self.inner.slots.lock().remove(item).is_some() {
            self.inner.bump();
        }
    }

    /// Cancel every pending save. Returns how many were cancelled. Saves
    /// already in flight complete.
    pub fn discard(&self) -> usize {
        let mut cancelled = 0;
        for slot in self.inner.slots.lock().values_mut() {
            let timer = slot.save_timer.take().is_some();
            let queued = std::mem::take(&mut slot.resave);
            if timer || queued {
                cancelled += 1;
            }
        }
        cancelled
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn schedule_save(&self, item: RecordId) -> DebounceTimer {
        let weak = Arc::downgrade(&self.inner);
        DebounceTimer::start(self.inner.quiet, move |token| async move {
            if let Some(inner) = weak.upgrade() {
                inner.save(item, token).await;
            }
        })
    }
}

impl FieldInner {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    async fn save(self: Arc<Self>, item: RecordId, token: CancellationToken) {
        let mut value = {
            let mut slots = self.slots.lock();
            if token.is_cancelled() {
                return;
            }
            let Some(slot) = slots.get_mut(&item) else {
                return;
            };
            slot.save_timer = None;
            if slot.in_flight {
                slot.resave = true;
                return;
            }
            slot.in_flight = true;
            slot.feedback = SaveFeedback::Saving;
            slot.clear_timer = None;
            slot.value
        };
        self.bump();

        loop {
            let outcome = self.writer.write_field(&item, self.field, value).await;
            let next = {
                let mut slots = self.slots.lock();
                let Some(slot) = slots.get_mut(&item) else {
                    return;
                };
                if std::mem::take(&mut slot.resave) {
                    if let Err(err) = &outcome {
                        warn!(item = %item, field = self.field.wire_name(), error = %err, "Failed to save superseded value");
                    }
                    Some(slot.value)
                } else {
                    slot.in_flight = false;
                    match outcome {
                        Ok(status) => {
                            if status.is_some() {
                                slot.status = status;
                            }
                            slot.feedback = SaveFeedback::Saved;
                            slot.clear_timer = Some(self.schedule_clear(item.clone()));
                        }
                        Err(err) => {
                            warn!(item = %item, field = self.field.wire_name(), error = %err, "Failed to save typed value");
                            slot.feedback = SaveFeedback::Idle;
                        }
                    }
                    None
                }
            };
            self.bump();
            match next {
                Some(latest) => value = latest,
                None => break,
            }
        }
    }

    fn schedule_clear(self: &Arc<Self>, item: RecordId) -> DebounceTimer {
        let weak = Arc::downgrade(self);
        DebounceTimer::start(self.feedback_hold, move |token| async move {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut slots = inner.slots.lock();
                if token.is_cancelled() {
                    return;
                }
                if let Some(slot) = slots.get_mut(&item) {
                    if slot.feedback == SaveFeedback::Saved {
                        slot.feedback = SaveFeedback::Idle;
                    }
                    slot.clear_timer = None;
                }
            }
            inner.bump();
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    #[derive(Default)]
    struct RecordingFieldWriter {
        calls: Mutex<Vec<(RecordId, ItemCountField, f64)>>,
        fail: bool,
    }

    #[async_trait]
    impl FieldWriter for RecordingFieldWriter {
        async fn write_field(
            &self,
            item: &RecordId,
            field: ItemCountField,
            value: f64,
        ) -> Result<Option<LineStatus>> {
            self.calls.lock().push((item.clone(), field, value));
            if self.fail {
                return Err(MarOpsError::Network("unreachable".into()));
            }
            Ok(Some(LineStatus::Complete))
        }
    }

    fn debouncer(writer: &Arc<RecordingFieldWriter>) -> FieldDebouncer {
        FieldDebouncer::new(
            writer.clone(),
            ItemCountField::ChamberCount,
            Duration::from_millis(2000),
            Duration::from_millis(2500),
        )
    }

    async fn advance(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn only_the_last_typed_value_is_saved() {
        let writer = Arc::new(RecordingFieldWriter::default());
        let fields = debouncer(&writer);
        let item = RecordId::from(11);

        fields.set(&item, 1.0).unwrap();
        advance(500).await;
        fields.set(&item, 12.0).unwrap();
        advance(500).await;
        fields.set(&item, 120.0).unwrap();
        advance(1900).await;
        assert!(writer.calls.lock().is_empty());

        advance(200).await;
        let calls = writer.calls.lock().clone();
        assert_eq!(calls, vec![(item.clone(), ItemCountField::ChamberCount, 120.0)]);
        assert_eq!(fields.status(&item), Some(LineStatus::Complete));
    }

    #[tokio::test(start_paused = true)]
    async fn saved_marker_clears_after_hold() {
        let writer = Arc::new(RecordingFieldWriter::default());
        let fields = debouncer(&writer);
        let item = RecordId::from(3);

        fields.set(&item, 4.0).unwrap();
        assert_eq!(fields.feedback(&item), SaveFeedback::Idle);
        advance(2100).await;
        assert_eq!(fields.feedback(&item), SaveFeedback::Saved);
        advance(2600).await;
        assert_eq!(fields.feedback(&item), SaveFeedback::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_returns_to_idle_and_keeps_local_status() {
        let writer = Arc::new(RecordingFieldWriter { fail: true, ..Default::default() });
        let fields = debouncer(&writer);
        let item = RecordId::from(3);

        fields.set(&item, 4.0).unwrap();
        advance(2100).await;
        assert_eq!(fields.feedback(&item), SaveFeedback::Idle);
        assert_eq!(fields.status(&item), None);
        assert_eq!(fields.value(&item), Some(4.0));
    }

    #[tokio::test(start_paused = true)]
    async fn discard_cancels_pending_saves() {
        let writer = Arc::new(RecordingFieldWriter::default());
        let fields = debouncer(&writer);

        fields.set(&RecordId::from(1), 2.0).unwrap();
        fields.set(&RecordId::from(2), 3.0).unwrap();
        assert_eq!(fields.discard(), 2);
        advance(5000).await;
        assert!(writer.calls.lock().is_empty());
    }

    /// First save answers slowly; the status follows the saved value.
    #[derive(Default)]
    struct SlowFirstWriter {
        calls: Mutex<Vec<f64>>,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    #[async_trait]
    impl FieldWriter for SlowFirstWriter {
        async fn write_field(
            &self,
            _item: &RecordId,
            _field: ItemCountField,
            value: f64,
        ) -> Result<Option<LineStatus>> {
            let first = {
                let mut calls = self.calls.lock();
                calls.push(value);
                calls.len() == 1
            };
            let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(running, Ordering::SeqCst);
            let latency = if first { 5000 } else { 100 };
            tokio::time::sleep(Duration::from_millis(latency)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(if value >= 2.0 { LineStatus::Complete } else { LineStatus::Partial }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn newer_value_waits_for_the_running_save_and_wins() {
        let writer = Arc::new(SlowFirstWriter::default());
        let fields = FieldDebouncer::new(
            writer.clone(),
            ItemCountField::Produced,
            Duration::from_millis(2000),
            Duration::from_millis(2500),
        );
        let item = RecordId::from(8);

        fields.set(&item, 1.0).unwrap();
        advance(2100).await;
        fields.set(&item, 2.0).unwrap();
        advance(2200).await;
        assert_eq!(writer.calls.lock().clone(), vec![1.0]);
        assert_eq!(fields.status(&item), None);
        assert_eq!(fields.feedback(&item), SaveFeedback::Saving);

        advance(5000).await;
        assert_eq!(writer.calls.lock().clone(), vec![1.0, 2.0]);
        assert_eq!(writer.max_in_flight.load(Ordering::SeqCst), 1);
        assert_eq!(fields.value(&item), Some(2.0));
        assert_eq!(fields.status(&item), Some(LineStatus::Complete));
        assert_eq!(fields.feedback(&item), SaveFeedback::Saved);
    }

    #[tokio::test(start_paused = true)]
    async fn discard_drops_a_save_queued_behind_a_running_one() {
        let writer = Arc::new(SlowFirstWriter::default());
        let fields = FieldDebouncer::new(
            writer.clone(),
            ItemCountField::Produced,
            Duration::from_millis(2000),
            Duration::from_millis(2500),
        );
        let item = RecordId::from(8);

        fields.set(&item, 1.0).unwrap();
        advance(2100).await;
        fields.set(&item, 2.0).unwrap();
        advance(2200).await;
        assert_eq!(fields.discard(), 1);

        advance(5000).await;
        assert_eq!(writer.calls.lock().clone(), vec![1.0]);
        assert_eq!(fields.status(&item), Some(LineStatus::Partial));
    }

    #[tokio::test(start_paused = true)]
    async fn negative_values_are_rejected() {
        let writer = Arc::new(RecordingFieldWriter::default());
        let fields = debouncer(&writer);
        assert!(fields.set(&RecordId::from(1), -2.0).is_err());
        assert_eq!(fields.value(&RecordId::from(1)), None);
    }
}
