use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::common::CapturedImage;
use crate::error::{AnalysisError, WorkflowError};
use crate::pipeline::context::{StateKind, WorkflowMetrics, WorkflowPhase, WorkflowState};
use crate::pipeline::orchestration::AnalysisPipeline;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// One attempt publishes at most three transitions (Preparing, Analyzing, terminal).
const MIN_EVENT_BUFFER: usize = 4;

#[derive(Debug, Clone)]
struct Snapshot {
    sequence: u64,
    state: WorkflowState,
    failure: Option<AnalysisError>,
    metrics: WorkflowMetrics,
}

#[derive(Debug, Clone)]
struct StateEvent {
    sequence: u64,
    state: WorkflowState,
}

/// Single writer of a submission's state. Every accepted transition bumps the
/// sequence number and is broadcast while the snapshot is still locked, so
/// subscribers observe transitions in the order they were applied.
#[derive(Clone)]
struct StatePublisher {
    submission_id: Uuid,
    snapshot_tx: Arc<watch::Sender<Snapshot>>,
    events_tx: broadcast::Sender<StateEvent>,
    cancel_token: CancellationToken,
}

impl StatePublisher {
    fn transition(
        &self,
        next: WorkflowState,
        failure: Option<AnalysisError>,
    ) -> Result<(), WorkflowError> {
        let mut outcome = Ok(());
        let mut applied = None;
        self.snapshot_tx.send_if_modified(|snapshot| {
            // Checked under the lock so nothing is emitted after cancel() returns.
            if self.cancel_token.is_cancelled() {
                outcome = Err(WorkflowError::Cancelled);
                return false;
            }
            if !snapshot.state.can_transition_to(&next) {
                outcome = Err(WorkflowError::InvalidTransition {
                    from: snapshot.state.kind(),
                    to: next.kind(),
                });
                return false;
            }
            if matches!(next, WorkflowState::Preparing) {
                snapshot.metrics.begin_attempt();
            }
            let from = snapshot.state.kind();
            snapshot.sequence += 1;
            snapshot.state = next.clone();
            snapshot.failure = failure;
            // No receivers is fine, nobody is listening right now.
            let _ = self.events_tx.send(StateEvent {
                sequence: snapshot.sequence,
                state: next,
            });
            applied = Some((from, snapshot.state.kind()));
            true
        });

        match (&outcome, applied) {
            (Err(WorkflowError::Cancelled), _) => debug!(
                "Submission {} is cancelled, dropping transition",
                self.submission_id
            ),
            (Err(e), _) => error!("Submission {} rejected transition: {}", self.submission_id, e),
            (Ok(_), Some((from, to))) => {
                info!("Submission {} moved {} -> {}", self.submission_id, from, to)
            }
            (Ok(_), None) => {}
        }
        outcome
    }

    fn fail(&self, error: AnalysisError) {
        warn!(
            "Submission {} failed ({}): {}",
            self.submission_id,
            error.code(),
            error
        );
        let _ = self.transition(WorkflowState::Error, Some(error));
    }

    fn record_phase(&self, phase: WorkflowPhase, duration: Duration) {
        debug!(
            "Submission {} finished phase {} in {}us",
            self.submission_id,
            phase.as_str(),
            duration.as_micros()
        );
        self.snapshot_tx.send_if_modified(|snapshot| {
            snapshot.metrics.record_phase(phase, duration);
            false
        });
    }
}

/// Drives one captured image through preparation and classification.
///
/// Created by [`AnalysisController::submit`] already in the `Preparing` state.
/// Dropping the controller cancels the submission.
pub struct AnalysisController {
    image: CapturedImage,
    pipeline: AnalysisPipeline,
    publisher: StatePublisher,
    snapshot_rx: watch::Receiver<Snapshot>,
    task: Option<JoinHandle<()>>,
}

impl AnalysisController {
    /// Must be called from within a tokio runtime; the phases run on a spawned task.
    pub fn submit(pipeline: AnalysisPipeline, image: CapturedImage, event_buffer: usize) -> Self {
        let mut metrics = WorkflowMetrics::new();
        metrics.begin_attempt();
        let (snapshot_tx, snapshot_rx) = watch::channel(Snapshot {
            sequence: 1,
            state: WorkflowState::Preparing,
            failure: None,
            metrics,
        });
        let (events_tx, _) = broadcast::channel(event_buffer.max(MIN_EVENT_BUFFER));
        let publisher = StatePublisher {
            submission_id: image.id(),
            snapshot_tx: Arc::new(snapshot_tx),
            events_tx,
            cancel_token: CancellationToken::new(),
        };

        info!("Submission {} entered Preparing", image.id());
        let mut controller = Self {
            image,
            pipeline,
            publisher,
            snapshot_rx,
            task: None,
        };
        controller.start_attempt();
        controller
    }

    fn start_attempt(&mut self) {
        let pipeline = self.pipeline.clone();
        let image = self.image.clone();
        let publisher = self.publisher.clone();
        let cancel_token = self.publisher.cancel_token.clone();

        self.task = Some(tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel_token.cancelled() => {
                    debug!("Submission {} abandoned in flight", image.id());
                }
                _ = run_attempt(pipeline, image.clone(), publisher) => {}
            }
        }));
    }

    /// The most recently entered state.
    pub fn current(&self) -> WorkflowState {
        self.snapshot_rx.borrow().state.clone()
    }

    /// Why the submission is in `Error`, if it is.
    pub fn failure(&self) -> Option<AnalysisError> {
        self.snapshot_rx.borrow().failure.clone()
    }

    pub fn metrics(&self) -> WorkflowMetrics {
        self.snapshot_rx.borrow().metrics.clone()
    }

    pub fn image(&self) -> &CapturedImage {
        &self.image
    }

    /// Starts over from `Preparing` with the same image. Only allowed from `Error`.
    pub fn retry(&mut self) -> Result<(), WorkflowError> {
        if self.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }
        let kind = self.current().kind();
        if kind != StateKind::Error {
            return Err(WorkflowError::RetryNotAllowed(kind));
        }
        self.publisher.transition(WorkflowState::Preparing, None)?;
        self.start_attempt();
        Ok(())
    }

    /// Yields the current state, then every later transition.
    pub fn subscribe(&self) -> StateSubscription {
        // Subscribe before reading the snapshot; anything already reflected in
        // the snapshot is filtered out by sequence number.
        let events = self.publisher.events_tx.subscribe();
        let snapshot = self.snapshot_rx.borrow();
        StateSubscription {
            pending: Some(snapshot.state.clone()),
            last_sequence: snapshot.sequence,
            events,
            snapshot_rx: self.snapshot_rx.clone(),
            cancel_token: self.publisher.cancel_token.clone(),
        }
    }

    /// Waits for `Success` or `Error`. Returns `None` once the submission is cancelled.
    pub async fn outcome(&self) -> Option<WorkflowState> {
        let mut snapshot_rx = self.snapshot_rx.clone();
        tokio::select! {
            biased;
            _ = self.publisher.cancel_token.cancelled() => None,
            snapshot = snapshot_rx.wait_for(|snapshot| snapshot.state.is_terminal()) => {
                snapshot.ok().map(|snapshot| snapshot.state.clone())
            }
        }
    }

    /// Stops all further notifications and abandons the in-flight phase.
    pub fn cancel(&mut self) {
        if self.publisher.cancel_token.is_cancelled() {
            return;
        }
        info!("Cancelling submission {}", self.image.id());
        self.publisher.cancel_token.cancel();
        // Wait out a transition that may be holding the snapshot lock.
        self.publisher.snapshot_tx.send_if_modified(|_| false);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.publisher.cancel_token.is_cancelled()
    }
}

impl Drop for AnalysisController {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[instrument(skip_all, fields(image = %image.id()))]
async fn run_attempt(pipeline: AnalysisPipeline, image: CapturedImage, publisher: StatePublisher) {
    let started = Instant::now();
    let preparation = pipeline.prepare(image);
    let prepared = preparation.await;
    publisher.record_phase(WorkflowPhase::Preparation, started.elapsed());
    let prepared = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            publisher.fail(e);
            return;
        }
    };

    if publisher.transition(WorkflowState::Analyzing, None).is_err() {
        return;
    }

    let started = Instant::now();
    let classification = pipeline.classify(prepared);
    let classified = classification.await;
    publisher.record_phase(WorkflowPhase::Classification, started.elapsed());
    match classified {
        Ok(result) => {
            let _ = publisher.transition(WorkflowState::Success(result), None);
        }
        Err(e) => publisher.fail(e),
    }
}

/// Ordered stream of a submission's states, starting with the state current
/// at the time of subscribing.
pub struct StateSubscription {
    pending: Option<WorkflowState>,
    last_sequence: u64,
    events: broadcast::Receiver<StateEvent>,
    snapshot_rx: watch::Receiver<Snapshot>,
    cancel_token: CancellationToken,
}

impl StateSubscription {
    /// `None` once the submission is cancelled or its controller is gone.
    pub async fn next(&mut self) -> Option<WorkflowState> {
        if self.cancel_token.is_cancelled() {
            return None;
        }
        if let Some(state) = self.pending.take() {
            return Some(state);
        }
        loop {
            let received = tokio::select! {
                biased;
                _ = self.cancel_token.cancelled() => return None,
                received = self.events.recv() => received,
            };
            match received {
                Ok(event) if event.sequence <= self.last_sequence => continue,
                Ok(event) => {
                    self.last_sequence = event.sequence;
                    return Some(event.state);
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Resume from the latest state; older buffered events are
                    // filtered out by sequence number.
                    let (sequence, state) = {
                        let snapshot = self.snapshot_rx.borrow();
                        (snapshot.sequence, snapshot.state.clone())
                    };
                    warn!(
                        "State subscription lagged by {} transitions, resuming at {}",
                        skipped,
                        state.kind()
                    );
                    if sequence > self.last_sequence {
                        self.last_sequence = sequence;
                        return Some(state);
                    }
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
