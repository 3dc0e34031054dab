//! Periodic status polling for the active job session.
//!
//! Only one session is polled at a time. Every session carries a
//! [`Generation`]; the poller keeps the active one in a shared slot and every
//! status response is checked against it before anything is updated or
//! rendered. Ticks do not wait for earlier queries, so responses may overlap
//! or come back after the session was superseded.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use rr_core::presenter::{self, GENERIC_FAILURE};
use rr_core::{DisplayText, Generation, JobId, JobSession, JobSnapshot, PollPolicy, PollStep, PollerState};
use crate::error::{ApiError, AppError};
use crate::events::AppEvent;
use crate::generator::backend::StoryApi;
use crate::generator::renderer::ResultRenderer;
use crate::ui::UiContext;

#[derive(Default)]
struct Slot {
    generation: Option<Generation>,
    state: PollerState,
    session: Option<JobSession>,
}

type SharedSlot = Arc<Mutex<Slot>>;

fn lock(slot: &SharedSlot) -> MutexGuard<'_, Slot> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub struct StatusPoller {
    api: Arc<dyn StoryApi>,
    renderer: Arc<ResultRenderer>,
    ui: UiContext,
    events: UnboundedSender<AppEvent>,
    policy: PollPolicy,
    slot: SharedSlot,
    task: Option<PollTask>,
}

impl StatusPoller {
    pub fn new(
        api: Arc<dyn StoryApi>,
        renderer: Arc<ResultRenderer>,
        ui: UiContext,
        events: UnboundedSender<AppEvent>,
        policy: PollPolicy,
    ) -> Self {
        Self {
            api,
            renderer,
            ui,
            events,
            policy,
            slot: SharedSlot::default(),
            task: None,
        }
    }

    pub fn state(&self) -> PollerState {
        lock(&self.slot).state
    }

    /// Latest state of the active (or last) session.
    pub fn session(&self) -> Option<JobSession> {
        lock(&self.slot).session.clone()
    }

    pub fn active_generation(&self) -> Option<Generation> {
        lock(&self.slot).generation
    }

    /// Starts polling `session`, cancelling whatever was polled before.
    /// A session that is already terminal skips straight to its result.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, session: JobSession) {
        self.cancel();

        let generation = session.generation();
        {
            let mut slot = lock(&self.slot);
            slot.generation = Some(generation);
            slot.state = PollerState::Polling;
            slot.session = Some(session.clone());
        }
        info!(job_id = %session.id(), %generation, "polling started");

        let cancel = CancellationToken::new();
        let run = SessionRun {
            api: self.api.clone(),
            renderer: self.renderer.clone(),
            ui: self.ui.clone(),
            events: self.events.clone(),
            policy: self.policy.clone(),
            slot: self.slot.clone(),
            generation,
            cancel: cancel.clone(),
        };
        let handle = tokio::spawn(run.drive(session));
        self.task = Some(PollTask { cancel, handle });
    }

    /// Stops the active session without a terminal event. Safe to call any
    /// number of times.
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.cancel.cancel();
            task.handle.abort();
        }

        let mut slot = lock(&self.slot);
        if slot.state == PollerState::Polling {
            if let (Some(session), Some(generation)) = (&slot.session, slot.generation) {
                debug!(job_id = %session.id(), %generation, "polling cancelled");
            }
            slot.state = PollerState::Stopped;
        }
        slot.generation = None;
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.cancel();
    }
}

enum Termination {
    Completed,
    Failed(AppError),
}

fn termination(step: PollStep) -> Option<Termination> {
    match step {
        PollStep::Continue => None,
        PollStep::Completed => Some(Termination::Completed),
        PollStep::Failed { reason, timed_out } => Some(Termination::Failed(AppError::TerminalFailure {
            reason: match (reason, timed_out) {
                (_, true) => "video processing timed out".to_string(),
                (Some(reason), false) => reason,
                (None, false) => GENERIC_FAILURE.to_string(),
            },
            timed_out,
        })),
        PollStep::LimitReached(max) => Some(Termination::Failed(AppError::PollLimit(max))),
    }
}

enum Applied {
    Continue,
    Stale,
    Done(Termination),
}

/// One polling session, owned by its spawned task.
struct SessionRun {
    api: Arc<dyn StoryApi>,
    renderer: Arc<ResultRenderer>,
    ui: UiContext,
    events: UnboundedSender<AppEvent>,
    policy: PollPolicy,
    slot: SharedSlot,
    generation: Generation,
    cancel: CancellationToken,
}

impl SessionRun {
    async fn drive(self, session: JobSession) {
        let Some(done) = termination(session.step()) else {
            self.poll(session).await;
            return;
        };

        debug!(job_id = %session.id(), status = %session.status(), "status final at submission, not polling");
        let display = presenter::render(&session.snapshot());
        let current = self.with_current(|slot| {
            slot.state = PollerState::Stopped;
            self.ui.show_status(&display);
        });
        if current.is_some() {
            self.finish(session, done).await;
        }
    }

    async fn poll(&self, mut session: JobSession) {
        let (tx, mut rx) = mpsc::unbounded_channel();
        // In-flight queries die with the loop.
        let queries = self.cancel.child_token();
        let _stop_queries = queries.clone().drop_guard();

        let period = self.policy.interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => self.spawn_query(session.id().clone(), &queries, tx.clone()),
                Some(result) = rx.recv() => match self.apply(&mut session, result) {
                    Applied::Continue => {}
                    Applied::Stale => return,
                    Applied::Done(done) => {
                        self.finish(session, done).await;
                        return;
                    }
                },
            }
        }
    }

    fn spawn_query(
        &self,
        job_id: JobId,
        cancel: &CancellationToken,
        tx: UnboundedSender<Result<JobSnapshot, ApiError>>,
    ) {
        let api = self.api.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                result = api.job_status(&job_id) => {
                    let _ = tx.send(result);
                }
            }
        });
    }

    fn apply(&self, session: &mut JobSession, result: Result<JobSnapshot, ApiError>) -> Applied {
        let mut slot = lock(&self.slot);
        if slot.generation != Some(self.generation) {
            debug!(job_id = %session.id(), generation = %self.generation, "discarding response for superseded session");
            return Applied::Stale;
        }

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(job_id = %session.id(), error = %e, "status check failed, giving up on job");
                self.ui.show_status(&DisplayText::error(format!("Error: {e}")));
                slot.state = PollerState::Stopped;
                return Applied::Done(Termination::Failed(AppError::PollTransport(e.to_string())));
            }
        };

        let advance = session.advance(snapshot, &self.policy);
        debug!(
            job_id = %session.id(),
            status = %session.status(),
            polls = session.polls(),
            "status update"
        );
        self.ui.show_status(&advance.display);
        slot.session = Some(session.clone());
        let _ = self.events.send(AppEvent::JobProgress {
            job_id: session.id().clone(),
            generation: self.generation,
            status: session.status().clone(),
        });

        match termination(advance.step) {
            None => Applied::Continue,
            Some(done) => {
                if let Termination::Failed(err @ AppError::PollLimit(_)) = &done {
                    self.ui.show_status(&DisplayText::error(format!("Error: {err}")));
                }
                slot.state = PollerState::Stopped;
                Applied::Done(done)
            }
        }
    }

    async fn finish(&self, session: JobSession, done: Termination) {
        let job_id = session.id().clone();
        let generation = self.generation;

        let outcome = match done {
            Termination::Completed => {
                info!(%job_id, %generation, "job finished, presenting video");
                let Some(url) = self.with_current(|_| self.renderer.prepare(&job_id)) else {
                    return;
                };
                match url {
                    Some(url) => tokio::select! {
                        _ = self.cancel.cancelled() => return,
                        loaded = self.renderer.load(&url) => Ok(Some(loaded)),
                    },
                    None => Ok(None),
                }
            }
            Termination::Failed(err) => Err(err),
        };

        // The load may have outlived a cancel; everything below re-checks.
        let current = self.with_current(|_| {
            let outcome = outcome.and_then(|loaded| match loaded {
                Some(loaded) => self.renderer.show(&job_id, loaded),
                None => Ok(()),
            });
            self.ui.set_busy(false);
            let event = match outcome {
                Ok(()) => AppEvent::JobComplete { job_id: job_id.clone(), generation },
                Err(err) => {
                    warn!(%job_id, %generation, error = %err, "job ended with an error");
                    AppEvent::JobFailed { job_id: job_id.clone(), generation, error: err.to_string() }
                }
            };
            let _ = self.events.send(event);
        });
        if current.is_none() {
            debug!(%job_id, %generation, "session superseded, dropping result");
        }
    }

    /// Runs `f` only while this run's generation is still the active one.
    fn with_current<R>(&self, f: impl FnOnce(&mut Slot) -> R) -> Option<R> {
        let mut slot = lock(&self.slot);
        if slot.generation != Some(self.generation) {
            return None;
        }
        Some(f(&mut slot))
    }
}
