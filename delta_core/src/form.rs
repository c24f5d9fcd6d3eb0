//! Form session - the challenge contract driven one submission at a time.
//!
//! Form front-ends render a page, wait for a submit, then render again. The
//! session keeps one in-flight challenge per handle between those rounds and
//! commits through the same path as the terminal runner.

use std::collections::HashMap;

use delta_rules::{Handle, PlayerProgress};
use rand::RngCore;
use tracing::{debug, warn};

use crate::challenge::{ChallengeRegistry, InteractionMode, LockStatus, Verdict};
use crate::runner::{
    settle, ActiveChallenge, ChallengeFault, Clock, Phase, RunnerError, Settlement, SystemClock,
};
use crate::store::ProgressionStore;

/// Log lines shown on a form page.
pub const FORM_LOG_LINES: usize = 5;

/// What a form page shows for one player.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub handle: Handle,
    /// Zero-based layer index.
    pub layer: u32,
    pub score: f64,
    /// Title of the current layer; `None` past the end of content.
    pub title: Option<&'static str>,
    pub prompt: Option<String>,
    /// Most recent log lines, newest first.
    pub recent_log: Vec<String>,
    /// Set when the current challenge could not be generated.
    pub fault: Option<String>,
}

impl FormView {
    pub fn is_beyond_content(&self) -> bool {
        self.title.is_none()
    }
}

/// Result of one form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum FormOutcome {
    Advanced {
        layer: u32,
        delta: f64,
        score: f64,
        consolation: bool,
        feedback: Option<String>,
    },
    Rejected {
        feedback: Option<String>,
        attempts_left: Option<u32>,
    },
    StageCleared {
        remaining: usize,
        feedback: Option<String>,
    },
    /// Attempts ran out. The next view starts the layer over.
    Halted { layer: u32, score: f64 },
    /// A timed challenge is still locked.
    Locked { status: LockStatus },
    Faulted { fault: String },
    BeyondContent,
}

/// Round-based adapter over the challenge contract.
pub struct FormSession<S: ProgressionStore, R: RngCore> {
    store: S,
    registry: ChallengeRegistry,
    rng: R,
    clock: Box<dyn Clock>,
    active: HashMap<Handle, ActiveChallenge>,
}

impl<S: ProgressionStore, R: RngCore> FormSession<S, R> {
    pub fn new(store: S, registry: ChallengeRegistry, rng: R) -> Self {
        Self {
            store,
            registry,
            rng,
            clock: Box::new(SystemClock),
            active: HashMap::new(),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Where `handle`'s current challenge stands. [`Phase::Idle`] until a
    /// page has been rendered and again once a layer is settled.
    pub fn phase(&self, handle: &Handle) -> Phase {
        self.active
            .get(handle)
            .map_or(Phase::Idle, ActiveChallenge::phase)
    }

    /// Render the page for `handle`, creating the record on first visit.
    pub fn view(&mut self, handle: &Handle) -> Result<FormView, RunnerError> {
        let progress = self.store.create(handle)?;

        let mut fault = None;
        let mut prompt = None;
        let title = self.registry.get(progress.layer).map(|d| d.title);
        match self.prepare(&progress) {
            Ok(true) => {
                if let Some(active) = self.active.get_mut(handle) {
                    match active.present() {
                        Ok(text) => prompt = Some(text),
                        Err(err) => fault = Some(self.discard(handle, err)),
                    }
                }
            }
            Ok(false) => {}
            Err(err) => fault = Some(err.to_string()),
        }

        Ok(FormView {
            handle: handle.clone(),
            layer: progress.layer,
            score: progress.score,
            title,
            prompt,
            recent_log: recent_log(&progress),
            fault,
        })
    }

    /// Verify one submitted answer and commit if it decides the layer.
    pub fn submit(&mut self, handle: &Handle, answer: &str) -> Result<FormOutcome, RunnerError> {
        let progress = self
            .store
            .load(handle)?
            .ok_or_else(|| RunnerError::UnknownPlayer(handle.clone()))?;

        match self.prepare(&progress) {
            Ok(true) => {}
            Ok(false) => return Ok(FormOutcome::BeyondContent),
            Err(fault) => return Ok(FormOutcome::Faulted { fault: fault.to_string() }),
        }
        let Some(mut active) = self.active.remove(handle) else {
            return Ok(FormOutcome::BeyondContent);
        };

        let (feedback, pending) = match self.play(&mut active, answer) {
            Ok(result) => result,
            Err(fault) => {
                warn!(
                    handle = %handle,
                    layer = progress.layer,
                    %fault,
                    "challenge faulted in form session"
                );
                return Ok(FormOutcome::Faulted { fault: fault.to_string() });
            }
        };
        if let Some(outcome) = pending {
            self.active.insert(handle.clone(), active);
            return Ok(outcome);
        }

        let resolution = match active.resolve(&mut self.rng) {
            Ok(resolution) => resolution,
            Err(fault) => return Ok(FormOutcome::Faulted { fault: fault.to_string() }),
        };
        let drift = active.pending_drift();
        let outcome = match settle(&mut self.store, handle, &progress, resolution, drift)? {
            Settlement::Advanced {
                layer,
                delta,
                consolation,
                record,
            } => FormOutcome::Advanced {
                layer,
                delta,
                score: record.score,
                consolation,
                feedback,
            },
            Settlement::Halted { layer, record } => FormOutcome::Halted {
                layer,
                score: record.score,
            },
            Settlement::Unsettled => {
                self.active.insert(handle.clone(), active);
                FormOutcome::Rejected {
                    feedback,
                    attempts_left: None,
                }
            }
        };
        Ok(outcome)
    }

    /// Feed one submission to the challenge. Returns the feedback plus an
    /// outcome when the layer is still in play.
    fn play(
        &mut self,
        active: &mut ActiveChallenge,
        answer: &str,
    ) -> Result<(Option<String>, Option<FormOutcome>), ChallengeFault> {
        if active.mode()? == InteractionMode::Timed {
            let status = active.poll(self.clock.now())?;
            debug!(layer = active.layer(), ?status, "timed challenge polled");
            return Ok(match status {
                LockStatus::RealUnlock => (None, None),
                status => (None, Some(FormOutcome::Locked { status })),
            });
        }

        let report = active.submit(answer, &mut self.rng)?;
        let feedback = report.feedback;
        let pending = match (report.phase, report.verdict) {
            (Phase::Solved | Phase::Exhausted, _) => None,
            (_, Verdict::StageCleared { remaining }) => Some(FormOutcome::StageCleared {
                remaining,
                feedback: feedback.clone(),
            }),
            _ => Some(FormOutcome::Rejected {
                feedback: feedback.clone(),
                attempts_left: report.attempts_left,
            }),
        };
        Ok((feedback, pending))
    }

    /// Make sure a challenge for the player's current layer is in flight.
    /// `Ok(false)` past the end of content.
    fn prepare(&mut self, progress: &PlayerProgress) -> Result<bool, ChallengeFault> {
        if let Some(active) = self.active.get(&progress.handle) {
            if active.layer() == progress.layer {
                return Ok(true);
            }
        }
        self.active.remove(&progress.handle);

        let Some(definition) = self.registry.get(progress.layer) else {
            return Ok(false);
        };
        let active = ActiveChallenge::enter(definition, progress, &mut self.rng, self.clock.now())?;
        self.active.insert(progress.handle.clone(), active);
        Ok(true)
    }

    fn discard(&mut self, handle: &Handle, fault: ChallengeFault) -> String {
        warn!(handle = %handle, %fault, "discarding faulted challenge");
        self.active.remove(handle);
        fault.to_string()
    }
}

fn recent_log(progress: &PlayerProgress) -> Vec<String> {
    progress
        .recent_log(FORM_LOG_LINES)
        .into_iter()
        .map(|entry| entry.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::puzzles::{Calibration, MirrorTwin};
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn session() -> FormSession<MemoryStore, ChaCha8Rng> {
        let mut registry = ChallengeRegistry::new();
        registry
            .register("mirror_twin", "MIRROR SELF", |_| {
                Box::new(MirrorTwin::with_fragment("delta"))
            })
            .register("calibration", "CALIBRATION", |_| Box::new(Calibration::new()));
        FormSession::new(MemoryStore::new(), registry, ChaCha8Rng::seed_from_u64(4))
    }

    #[test]
    fn test_view_creates_record() {
        let mut form = session();
        let alice = Handle::new("alice").unwrap();

        let view = form.view(&alice).unwrap();
        assert_eq!(view.layer, 0);
        assert_eq!(view.score, 0.666);
        assert_eq!(view.title, Some("MIRROR SELF"));
        assert_eq!(view.prompt.as_deref(), Some("Reverse this to prove you are not me: delta"));
        assert!(view.recent_log.is_empty());
    }

    #[test]
    fn test_submit_advances_and_logs() {
        let mut form = session();
        let alice = Handle::new("alice").unwrap();
        form.view(&alice).unwrap();

        let outcome = form.submit(&alice, "ATLED").unwrap();
        assert!(matches!(outcome, FormOutcome::Rejected { attempts_left: Some(2), .. }));

        let FormOutcome::Advanced { layer: 0, delta, consolation: false, .. } =
            form.submit(&alice, "atled").unwrap()
        else {
            panic!("expected advance");
        };

        let view = form.view(&alice).unwrap();
        assert_eq!(view.layer, 1);
        assert!(view.recent_log[0].ends_with(&format!("LAYER1_SOLVED Δ+{delta}")));
        assert!(view.prompt.unwrap().starts_with("Calibration step 1"));
    }

    #[test]
    fn test_phase_is_idle_between_layers() {
        let mut form = session();
        let alice = Handle::new("alice").unwrap();
        assert_eq!(form.phase(&alice), Phase::Idle);

        form.view(&alice).unwrap();
        assert_eq!(form.phase(&alice), Phase::AwaitingInput);

        form.submit(&alice, "atled").unwrap();
        assert_eq!(form.phase(&alice), Phase::Idle);

        form.view(&alice).unwrap();
        assert_eq!(form.phase(&alice), Phase::AwaitingInput);
    }

    #[test]
    fn test_stage_cleared_keeps_challenge() {
        let mut form = session();
        let alice = Handle::new("alice").unwrap();
        form.view(&alice).unwrap();
        form.submit(&alice, "atled").unwrap();

        let outcome = form.submit(&alice, "23").unwrap();
        assert!(matches!(outcome, FormOutcome::StageCleared { remaining: 4, .. }));
        let view = form.view(&alice).unwrap();
        assert!(view.prompt.unwrap().starts_with("Calibration step 2"));
    }

    #[test]
    fn test_halt_restarts_layer() {
        let mut form = session();
        let alice = Handle::new("alice").unwrap();
        form.view(&alice).unwrap();

        for _ in 0..2 {
            form.submit(&alice, "nope").unwrap();
        }
        let outcome = form.submit(&alice, "nope").unwrap();
        assert!(matches!(outcome, FormOutcome::Halted { layer: 0, .. }));

        let view = form.view(&alice).unwrap();
        assert_eq!(view.layer, 0);
        assert!(view.recent_log[0].ends_with("LAYER1_EXHAUSTED"));
        assert!(matches!(
            form.submit(&alice, "nope").unwrap(),
            FormOutcome::Rejected { attempts_left: Some(2), .. }
        ));
    }

    #[test]
    fn test_submit_without_record() {
        let mut form = session();
        let err = form.submit(&Handle::new("ghost").unwrap(), "x").unwrap_err();
        assert!(matches!(err, RunnerError::UnknownPlayer(_)));
    }
}
