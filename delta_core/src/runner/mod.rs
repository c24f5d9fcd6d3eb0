//! Challenge runner - drives one operator through the layer table.
//!
//! A session works as follows:
//! 1. **Boot**: Create or load the player's record and log a `BOOT` entry
//! 2. **Enter**: Look up the layer the player is on and generate its challenge
//! 3. **Interact**: Read attempts (or poll the clock) until the layer is decided
//! 4. **Commit**: Write score, layer and log entry in one store call
//! 5. **Repeat**: Continue with the next layer until a halt, an exit or the end of content
//!
//! Nothing is written mid-challenge. The record on disk always reflects the
//! last decided layer.

mod active;
mod commit;

pub use active::*;
pub use commit::*;

use std::time::Duration;

use chrono::{DateTime, Utc};
use delta_rules::{
    render_meter, DivergenceLevel, GameConfig, Handle, PlayerProgress, ProgressUpdate,
};
use rand::{Rng, RngCore};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::challenge::{ChallengeRegistry, InteractionMode, LockStatus};
use crate::events::LayerEvent;
use crate::store::{ProgressionStore, StoreError};
use crate::twin::Twin;

/// The human (or script) on the other side of the terminal.
pub trait Operator {
    /// Print a block of text.
    fn show(&mut self, text: &str);

    /// Read one line. `None` means the operator has left.
    fn read_line(&mut self, prompt: &str) -> Option<String>;

    /// Wait for `duration`.
    fn pause(&mut self, duration: Duration);
}

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Timing and display settings for a runner.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerSettings {
    /// Delay between narrative beats. Zero disables pacing.
    pub pacing: Duration,

    /// Delay between polls of a timed challenge.
    pub poll_interval: Duration,

    /// Score above which the twin raises instability warnings.
    pub divergence_threshold: f64,
}

impl From<&GameConfig> for RunnerSettings {
    fn from(config: &GameConfig) -> Self {
        Self {
            pacing: Duration::from_millis(config.pacing_ms),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            divergence_threshold: config.divergence_threshold,
        }
    }
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self::from(&GameConfig::default())
    }
}

/// Failures that end a session.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("no record for player `{0}`; start a session first")]
    UnknownPlayer(Handle),
}

/// How a single layer ended.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerOutcome {
    /// The layer was committed and the player moved on.
    Advanced {
        layer: u32,
        delta: f64,
        score: f64,
        consolation: bool,
    },
    /// Attempts ran out; the layer stays locked.
    Halted { layer: u32, score: f64 },
    /// The challenge panicked. Nothing was written.
    Faulted { layer: u32, fault: String },
    /// The operator left mid-challenge. Nothing was written.
    Abandoned { layer: u32 },
    /// The player has cleared every defined layer.
    BeyondContent { layer: u32 },
}

impl LayerOutcome {
    /// Whether the session should go on to the next layer.
    pub fn continues(&self) -> bool {
        matches!(self, LayerOutcome::Advanced { .. })
    }
}

/// Everything that happened in one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub handle: Handle,
    pub outcomes: Vec<LayerOutcome>,
    pub final_progress: PlayerProgress,
}

impl SessionSummary {
    /// Number of layers the player advanced through.
    pub fn layers_advanced(&self) -> usize {
        self.outcomes.iter().filter(|o| o.continues()).count()
    }
}

/// Why interaction with a challenge stopped early.
enum Interrupt {
    Fault(ChallengeFault),
    Left,
}

impl From<ChallengeFault> for Interrupt {
    fn from(fault: ChallengeFault) -> Self {
        Interrupt::Fault(fault)
    }
}

const FALSE_POSITIVE_CHANCE: f64 = 0.7;

/// Drives the present / verify / reward cycle over a store.
pub struct ChallengeRunner<S: ProgressionStore, R: RngCore> {
    store: S,
    registry: ChallengeRegistry,
    rng: R,
    clock: Box<dyn Clock>,
    settings: RunnerSettings,
    twin: Twin,
}

impl<S: ProgressionStore, R: RngCore> ChallengeRunner<S, R> {
    /// Create a runner on the system clock with default settings.
    pub fn new(store: S, registry: ChallengeRegistry, rng: R) -> Self {
        Self {
            store,
            registry,
            rng,
            clock: Box::new(SystemClock),
            settings: RunnerSettings::default(),
            twin: Twin,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_settings(mut self, settings: RunnerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create or load `handle` and log the start of a session.
    pub fn start_session(&mut self, handle: &Handle) -> Result<PlayerProgress, RunnerError> {
        let record = self.store.create(handle)?;
        let boot = LayerEvent::Boot { score: record.score };
        let record = self.store.update(handle, ProgressUpdate::AppendLog(boot.to_entry()))?;
        info!(handle = %handle, layer = record.layer, score = record.score, "session started");
        Ok(record)
    }

    /// Run layers until one does not advance.
    pub fn run_session(
        &mut self,
        handle: &Handle,
        operator: &mut dyn Operator,
    ) -> Result<SessionSummary, RunnerError> {
        let record = self.start_session(handle)?;
        operator.show(&format!(
            ">> Welcome, {handle}. Layer {}. Δ = {}",
            record.layer + 1,
            record.score
        ));

        let mut outcomes = Vec::new();
        loop {
            let outcome = self.run_layer(handle, operator)?;
            let more = outcome.continues();
            outcomes.push(outcome);
            if !more {
                break;
            }
        }

        let final_progress = self.load(handle)?;
        info!(handle = %handle, layers = outcomes.len(), "session ended");
        Ok(SessionSummary {
            handle: handle.clone(),
            outcomes,
            final_progress,
        })
    }

    /// Play the player's current layer to a decision and commit it.
    pub fn run_layer(
        &mut self,
        handle: &Handle,
        operator: &mut dyn Operator,
    ) -> Result<LayerOutcome, RunnerError> {
        let progress = self.load(handle)?;
        let layer = progress.layer;

        let Some(definition) = self.registry.get(layer) else {
            info!(handle = %handle, layer, "no challenge defined past this layer");
            operator.show(">> The signal ends here. No further layers are defined.");
            return Ok(LayerOutcome::BeyondContent { layer });
        };

        // Generation must be the first draw on entering a layer.
        let now = self.clock.now();
        let mut active = match ActiveChallenge::enter(definition, &progress, &mut self.rng, now) {
            Ok(active) => active,
            Err(fault) => return Ok(self.faulted(operator, layer, fault)),
        };

        operator.show(&format!("\n--- LAYER {}: {} ---", layer + 1, active.title()));
        self.pace(operator);

        match self.interact(&mut active, &progress, operator) {
            Ok(()) => {}
            Err(Interrupt::Left) => {
                info!(handle = %handle, layer, "operator left mid-challenge");
                return Ok(LayerOutcome::Abandoned { layer });
            }
            Err(Interrupt::Fault(fault)) => return Ok(self.faulted(operator, layer, fault)),
        }

        let resolution = match active.resolve(&mut self.rng) {
            Ok(resolution) => resolution,
            Err(fault) => return Ok(self.faulted(operator, layer, fault)),
        };

        let drift = active.pending_drift();
        let outcome = match settle(&mut self.store, handle, &progress, resolution, drift)? {
            Settlement::Advanced {
                layer,
                delta,
                consolation,
                record,
            } => {
                self.announce_advance(operator, &record, delta, consolation);
                LayerOutcome::Advanced {
                    layer,
                    delta,
                    score: record.score,
                    consolation,
                }
            }
            Settlement::Halted { layer, record } => {
                operator.show(&format!(
                    ">> Attempts exhausted. Layer {} remains sealed. Δ = {}",
                    layer + 1,
                    record.score
                ));
                LayerOutcome::Halted {
                    layer,
                    score: record.score,
                }
            }
            Settlement::Unsettled => {
                // interact only returns once the phase is terminal
                warn!(handle = %handle, layer, "layer left unsettled");
                LayerOutcome::Abandoned { layer }
            }
        };
        Ok(outcome)
    }

    fn load(&self, handle: &Handle) -> Result<PlayerProgress, RunnerError> {
        self.store
            .load(handle)?
            .ok_or_else(|| RunnerError::UnknownPlayer(handle.clone()))
    }

    fn interact(
        &mut self,
        active: &mut ActiveChallenge,
        progress: &PlayerProgress,
        operator: &mut dyn Operator,
    ) -> Result<(), Interrupt> {
        let prompt = active.present()?;
        operator.show(&prompt);

        match active.mode()? {
            InteractionMode::Line => self.read_attempts(active, progress, operator),
            InteractionMode::Timed => self.wait_for_unlock(active, progress, operator),
        }
    }

    fn read_attempts(
        &mut self,
        active: &mut ActiveChallenge,
        progress: &PlayerProgress,
        operator: &mut dyn Operator,
    ) -> Result<(), Interrupt> {
        while !active.phase().is_terminal() {
            let attempt = operator.read_line(">> ").ok_or(Interrupt::Left)?;
            let report = active.submit(&attempt, &mut self.rng)?;

            if let Some(line) = &report.feedback {
                operator.show(line);
            }
            match report.phase {
                Phase::Solved => {
                    operator.show(self.twin.intermittent_feedback(true, &mut self.rng));
                }
                Phase::Retrying => {
                    operator.show(self.twin.intermittent_feedback(false, &mut self.rng));
                    if let Some(left) = report.attempts_left {
                        operator.show(&format!("[{left} attempts left]"));
                    }
                }
                Phase::Exhausted => {
                    let line = self
                        .twin
                        .speak("You ran out of doors.", progress.score, &mut self.rng);
                    operator.show(&line);
                }
                _ => {
                    // A stage was cleared; show the next one.
                    self.pace(operator);
                    operator.show(&active.present()?);
                }
            }
        }
        Ok(())
    }

    fn wait_for_unlock(
        &mut self,
        active: &mut ActiveChallenge,
        progress: &PlayerProgress,
        operator: &mut dyn Operator,
    ) -> Result<(), Interrupt> {
        loop {
            match active.poll(self.clock.now())? {
                LockStatus::RealUnlock => {
                    operator.show(">> Unlock signal confirmed. Timing accepted.");
                    return Ok(());
                }
                LockStatus::FalseSignal => {
                    debug!(layer = active.layer(), "false unlock signal");
                    operator.show(">> Unlock signal detected...");
                    let line = if self.rng.gen_bool(FALSE_POSITIVE_CHANCE) {
                        "[SYSTEM] False positive. Premature entropy detected."
                    } else {
                        "[SYSTEM] Ambiguous signal. Echo residue left behind."
                    };
                    operator.show(line);
                }
                LockStatus::Waiting => {
                    let dots = ".".repeat(self.rng.gen_range(1..=5));
                    let voice = self
                        .twin
                        .speak("Δ is still aligning. Stay still.", progress.score, &mut self.rng);
                    operator.show(&format!("[WAITING{dots}] {voice}"));
                }
            }
            operator.pause(self.settings.poll_interval);
        }
    }

    fn announce_advance(
        &mut self,
        operator: &mut dyn Operator,
        record: &PlayerProgress,
        delta: f64,
        consolation: bool,
    ) {
        if consolation {
            operator.show(&format!(">> The gate relents. Δ +{delta}. New Δ: {}", record.score));
        } else {
            operator.show(&format!(
                "[Δ ENGINE] Δ increased by {delta}. New Δ: {}",
                record.score
            ));
        }

        let threshold = self.settings.divergence_threshold;
        operator.show(&format!("Divergence Meter [Δ]: {}", render_meter(record.score, threshold)));
        let level = DivergenceLevel::classify(record.score, threshold);
        operator.show(self.twin.meter_warning(level));
        if let Some(warning) = self
            .twin
            .instability_warning(record.score, threshold, &mut self.rng)
        {
            operator.show(&warning);
        }
        self.pace(operator);
    }

    fn faulted(
        &self,
        operator: &mut dyn Operator,
        layer: u32,
        fault: ChallengeFault,
    ) -> LayerOutcome {
        warn!(layer, %fault, "challenge faulted; nothing committed");
        operator.show(">> [SYSTEM FAULT] The layer collapsed. No progress was recorded.");
        LayerOutcome::Faulted {
            layer,
            fault: fault.to_string(),
        }
    }

    fn pace(&self, operator: &mut dyn Operator) {
        if !self.settings.pacing.is_zero() {
            operator.pause(self.settings.pacing);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::challenge::puzzles::MirrorTwin;
    use crate::store::MemoryStore;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::VecDeque;

    #[derive(Default)]
    struct Script {
        lines: VecDeque<String>,
        shown: Vec<String>,
    }

    impl Script {
        fn with(lines: &[&str]) -> Self {
            Self {
                lines: lines.iter().map(|l| l.to_string()).collect(),
                shown: Vec::new(),
            }
        }
    }

    impl Operator for Script {
        fn show(&mut self, text: &str) {
            self.shown.push(text.to_string());
        }

        fn read_line(&mut self, _prompt: &str) -> Option<String> {
            self.lines.pop_front()
        }

        fn pause(&mut self, _duration: Duration) {}
    }

    fn mirror_only() -> ChallengeRegistry {
        let mut registry = ChallengeRegistry::new();
        registry.register("mirror_twin", "MIRROR SELF", |_| {
            Box::new(MirrorTwin::with_fragment("delta"))
        });
        registry
    }

    fn runner(registry: ChallengeRegistry) -> ChallengeRunner<MemoryStore, ChaCha8Rng> {
        ChallengeRunner::new(MemoryStore::new(), registry, ChaCha8Rng::seed_from_u64(3))
    }

    #[test]
    fn test_start_session_logs_boot() {
        let mut runner = runner(mirror_only());
        let alice = Handle::new("alice").unwrap();

        let record = runner.start_session(&alice).unwrap();
        assert_eq!(record.layer, 0);
        assert_eq!(record.log.len(), 1);
        assert_eq!(record.log[0].event, "BOOT Δ=0.666");
    }

    #[test]
    fn test_run_layer_requires_record() {
        let mut runner = runner(mirror_only());
        let err = runner
            .run_layer(&Handle::new("ghost").unwrap(), &mut Script::default())
            .unwrap_err();
        assert!(matches!(err, RunnerError::UnknownPlayer(_)));
    }

    #[test]
    fn test_session_runs_to_end_of_content() {
        let mut runner = runner(mirror_only());
        let alice = Handle::new("alice").unwrap();
        let mut operator = Script::with(&["wrong", "atled"]);

        let summary = runner.run_session(&alice, &mut operator).unwrap();
        assert_eq!(summary.layers_advanced(), 1);
        assert_eq!(summary.outcomes.last(), Some(&LayerOutcome::BeyondContent { layer: 1 }));
        assert_eq!(summary.final_progress.layer, 1);
        assert!(operator.shown.iter().any(|l| l.contains("LAYER 1: MIRROR SELF")));
    }

    #[test]
    fn test_operator_leaving_writes_nothing() {
        let mut runner = runner(mirror_only());
        let alice = Handle::new("alice").unwrap();
        runner.start_session(&alice).unwrap();
        let writes = runner.store().write_count();

        let outcome = runner.run_layer(&alice, &mut Script::with(&["nope"])).unwrap();
        assert_eq!(outcome, LayerOutcome::Abandoned { layer: 0 });
        assert_eq!(runner.store().write_count(), writes);
    }

    #[test]
    fn test_settings_from_config() {
        let config = GameConfig {
            pacing_ms: 250,
            ..GameConfig::default()
        };
        let settings = RunnerSettings::from(&config);
        assert_eq!(settings.pacing, Duration::from_millis(250));
        assert_eq!(settings.poll_interval, Duration::from_secs(1));
    }
}
