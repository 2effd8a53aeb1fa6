//! Quantity-adjustment protocol
//!
//! Increment and decrement buttons produce many small signed deltas. Instead
//! of one request per click, deltas are accumulated per line and sent as a
//! single net write once the line has been quiet for the configured window.
//!
//! Each line runs a small state machine:
//!
//! ```text
//! Idle ──adjust──▶ Accumulating ──quiet──▶ Flushing ──ok──▶ Idle
//!                     ▲    │                   │
//!                     │    └──adjust (reset)   └──err──▶ Held ──adjust──▶ Accumulating
//!                     └───────────────────────────────────────────────────┘
//! ```
//!
//! Adjustments made while a write is in flight open the next window; it is
//! flushed no earlier than the completion of the current write, so a line
//! never has two writes in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use marops_domain::{
    derive_line_status, LineStatus, MarOpsError, MaterialLine, RecordId, Result,
};
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::ports::DeltaWriter;
use super::timer::DebounceTimer;

/// A line whose fulfilled quantity is edited through deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustableLine {
    /// Insumo id; flush calls address the line by it.
    pub id: RecordId,
    /// Insumo name.
    pub label: String,
    /// Unit of measure shown next to the quantities.
    pub unit: Option<String>,
    /// Quantity the lot needs.
    pub required: f64,
    /// Last quantity confirmed by the server.
    pub confirmed: f64,
    /// Derived from `confirmed` and `required` after each confirmed write.
    pub status: LineStatus,
}

impl From<MaterialLine> for AdjustableLine {
    fn from(line: MaterialLine) -> Self {
        let status = line.effective_status();
        Self {
            id: line.insumo_id,
            label: line.nome,
            unit: line.unidade_medida,
            required: line.quantidade_necessaria,
            confirmed: line.quantidade_recebida,
            status,
        }
    }
}

/// Render-ready snapshot of a line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineView {
    /// Same id as the [`AdjustableLine`].
    pub id: RecordId,
    /// Insumo name.
    pub label: String,
    /// Unit of measure, if the backend sent one.
    pub unit: Option<String>,
    /// Quantity the lot needs.
    pub required: f64,
    /// Last quantity confirmed by the server.
    pub confirmed: f64,
    /// Unsent or unconfirmed delta.
    pub pending: f64,
    /// `confirmed + pending`, what the user expects to see.
    pub preview: f64,
    /// Status of the confirmed quantity.
    pub status: LineStatus,
    /// A write for this line has not answered yet.
    pub in_flight: bool,
}

#[derive(Debug)]
enum Phase {
    Idle,
    Accumulating { delta: f64, timer: DebounceTimer },
    Flushing { sending: f64, next: Option<NextWindow> },
    /// Delta kept after a failed write, waiting for the next adjustment.
    Held { delta: f64 },
}

/// Window opened while a write is in flight.
#[derive(Debug)]
struct NextWindow {
    delta: f64,
    /// `None` once the quiet interval elapsed; flush on completion.
    timer: Option<DebounceTimer>,
}

impl Phase {
    fn pending(&self) -> f64 {
        match self {
            Self::Idle => 0.0,
            Self::Accumulating { delta, .. } | Self::Held { delta } => *delta,
            Self::Flushing { sending, next } => sending + next.as_ref().map_or(0.0, |n| n.delta),
        }
    }
}

#[derive(Debug)]
struct LineState {
    line: AdjustableLine,
    phase: Phase,
}

impl LineState {
    fn view(&self) -> LineView {
        let pending = self.phase.pending();
        LineView {
            id: self.line.id.clone(),
            label: self.line.label.clone(),
            unit: self.line.unit.clone(),
            required: self.line.required,
            confirmed: self.line.confirmed,
            pending,
            preview: self.line.confirmed + pending,
            status: self.line.status,
            in_flight: matches!(self.phase, Phase::Flushing { .. }),
        }
    }
}

struct Inner {
    writer: Arc<dyn DeltaWriter>,
    quiet: Duration,
    lines: Mutex<Vec<LineState>>,
    locked: AtomicBool,
    revision: watch::Sender<u64>,
}

/// Per-line delta accumulator with debounced flushing.
///
/// Owned by exactly one controller; in-flight writes finish even if the
/// adjuster is dropped, pending timers do not.
pub struct QuantityAdjuster {
    inner: Arc<Inner>,
}

impl QuantityAdjuster {
    pub fn new(writer: Arc<dyn DeltaWriter>, quiet: Duration) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                writer,
                quiet,
                lines: Mutex::new(Vec::new()),
                locked: AtomicBool::new(false),
                revision,
            }),
        }
    }

    /// Replace the tracked lines. Pending timers and unsent deltas of the old
    /// lines are dropped.
    ///
    /// A write still in flight for a line that is reloaded stays attached to
    /// it: new adjustments queue behind that write and its outcome settles
    /// the reloaded line.
    pub fn load<I>(&self, lines: I)
    where
        I: IntoIterator<Item = AdjustableLine>,
    {
        {
            let mut current = self.inner.lines.lock();
            let mut previous = std::mem::take(&mut *current);
            *current = lines
                .into_iter()
                .map(|line| {
                    let phase = previous
                        .iter_mut()
                        .find(|s| s.line.id == line.id)
                        .and_then(|s| match std::mem::replace(&mut s.phase, Phase::Idle) {
                            Phase::Flushing { sending, .. } => {
                                Some(Phase::Flushing { sending, next: None })
                            }
                            _ => None,
                        })
                        .unwrap_or(Phase::Idle);
                    LineState { line, phase }
                })
                .collect();
        }
        self.inner.bump();
    }

    /// Refuse further adjustments (finalized lot).
    pub fn set_locked(&self, locked: bool) {
        self.inner.locked.store(locked, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.inner.locked.load(Ordering::SeqCst)
    }

    /// Record a signed delta for a line and restart its quiet window.
    ///
    /// No network call happens here. Returns the new preview value.
    ///
    /// # Errors
    /// - `InvalidInput` for a zero or non-finite delta, or when the preview
    ///   would drop below zero
    /// - `Locked` when the adjuster is locked
    /// - `NotFound` for an unknown line
    pub fn adjust(&self, id: &RecordId, delta: f64) -> Result<f64> {
        if delta == 0.0 || !delta.is_finite() {
            return Err(MarOpsError::InvalidInput(format!("invalid adjustment: {delta}")));
        }
        if self.is_locked() {
            return Err(MarOpsError::Locked("adjustments are closed for this lot".into()));
        }

        let preview = {
            let mut lines = self.inner.lines.lock();
            let state = lines
                .iter_mut()
                .find(|s| &s.line.id == id)
                .ok_or_else(|| MarOpsError::NotFound(format!("line {id}")))?;

            let preview = state.line.confirmed + state.phase.pending() + delta;
            if preview < 0.0 {
                return Err(MarOpsError::InvalidInput(format!(
                    "quantity for {} cannot go below zero",
                    state.line.label
                )));
            }

            let timer = self.schedule(id.clone());
            state.phase = match std::mem::replace(&mut state.phase, Phase::Idle) {
                Phase::Idle => Phase::Accumulating { delta, timer },
                Phase::Accumulating { delta: acc, .. } | Phase::Held { delta: acc } => {
                    Phase::Accumulating { delta: acc + delta, timer }
                }
                Phase::Flushing { sending, next } => Phase::Flushing {
                    sending,
                    next: Some(NextWindow {
                        delta: next.map_or(0.0, |n| n.delta) + delta,
                        timer: Some(timer),
                    }),
                },
            };
            preview
        };

        debug!(line = %id, delta, preview, "Adjustment accumulated");
        self.inner.bump();
        Ok(preview)
    }

    /// Cancel every timer and drop every unsent delta. Writes already in
    /// flight complete normally.
    pub fn discard_all_pending(&self) -> usize {
        let mut dropped = 0;
        {
            let mut lines = self.inner.lines.lock();
            for state in lines.iter_mut() {
                let unsent = matches!(state.phase, Phase::Accumulating { .. } | Phase::Held { .. });
                if unsent {
                    state.phase = Phase::Idle;
                    dropped += 1;
                } else if let Phase::Flushing { next, .. } = &mut state.phase {
                    if next.take().is_some() {
                        dropped += 1;
                    }
                }
            }
        }
        if dropped > 0 {
            info!(dropped, "Discarded pending adjustments");
            self.inner.bump();
        }
        dropped
    }

    #[must_use]
    pub fn lines(&self) -> Vec<LineView> {
        self.inner.lines.lock().iter().map(LineState::view).collect()
    }

    #[must_use]
    pub fn line(&self, id: &RecordId) -> Option<LineView> {
        self.inner.lines.lock().iter().find(|s| &s.line.id == id).map(LineState::view)
    }

    /// Whether any line has an unsent or unconfirmed delta.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.inner.lines.lock().iter().any(|s| !matches!(s.phase, Phase::Idle))
    }

    /// Revision counter bumped on every visible change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    fn schedule(&self, id: RecordId) -> DebounceTimer {
        let weak = Arc::downgrade(&self.inner);
        DebounceTimer::start(self.inner.quiet, move |token| async move {
            if let Some(inner) = weak.upgrade() {
                inner.flush(id, token).await;
            }
        })
    }
}

impl Inner {
    fn bump(&self) {
        self.revision.send_modify(|rev| *rev = rev.wrapping_add(1));
    }

    /// Quiet window of `id` elapsed.
    async fn flush(self: Arc<Self>, id: RecordId, token: CancellationToken) {
        let sending = {
            let mut lines = self.lines.lock();
            if token.is_cancelled() {
                return;
            }
            let Some(state) = lines.iter_mut().find(|s| s.line.id == id) else {
                return;
            };
            let accumulated = match &state.phase {
                Phase::Accumulating { delta, .. } => Some(*delta),
                _ => None,
            };
            match accumulated {
                Some(delta) if delta == 0.0 => {
                    state.phase = Phase::Idle;
                    None
                }
                Some(delta) => {
                    state.phase = Phase::Flushing { sending: delta, next: None };
                    Some(delta)
                }
                None => {
                    if let Phase::Flushing { next: Some(next), .. } = &mut state.phase {
                        next.timer = None;
                    }
                    None
                }
            }
        };

        let Some(sending) = sending else {
            return;
        };
        self.bump();
        self.send(id, sending).await;
    }

    async fn send(&self, id: RecordId, mut sending: f64) {
        loop {
            debug!(line = %id, delta = sending, "Flushing quantity adjustment");
            let outcome = self.writer.write_delta(&id, sending).await;
            let follow_up = self.settle(&id, sending, outcome);
            self.bump();
            match follow_up {
                Some(next) => sending = next,
                None => break,
            }
        }
    }

    /// Apply a write outcome; returns the next delta to send right away.
    fn settle(&self, id: &RecordId, sent: f64, outcome: Result<Option<f64>>) -> Option<f64> {
        let mut lines = self.lines.lock();
        let state = lines.iter_mut().find(|s| &s.line.id == id)?;
        if !matches!(state.phase, Phase::Flushing { .. }) {
            return None;
        }
        let Phase::Flushing { next, .. } = std::mem::replace(&mut state.phase, Phase::Idle) else {
            return None;
        };

        let carried = match outcome {
            Ok(server) => {
                let confirmed = server.unwrap_or(state.line.confirmed + sent);
                state.line.confirmed = confirmed;
                state.line.status = derive_line_status(confirmed, state.line.required);
                debug!(line = %id, confirmed, status = %state.line.status, "Adjustment confirmed");
                0.0
            }
            Err(err) => {
                warn!(line = %id, delta = sent, error = %err, "Adjustment flush failed; delta kept");
                sent
            }
        };

        match next {
            None if carried == 0.0 => None,
            None => {
                state.phase = Phase::Held { delta: carried };
                None
            }
            Some(NextWindow { delta, timer: Some(timer) }) => {
                state.phase = Phase::Accumulating { delta: delta + carried, timer };
                None
            }
            Some(NextWindow { delta, timer: None }) => {
                let total = delta + carried;
                if total == 0.0 {
                    None
                } else {
                    state.phase = Phase::Flushing { sending: total, next: None };
                    Some(total)
                }
            }
        }
    }
}
