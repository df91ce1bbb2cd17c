//! Match Controller
//!
//! Drives repeated rounds. Bounded mode runs a match to its end on the calling
//! thread; persistent mode ticks on a fixed cadence in a tokio task while other
//! tasks read snapshots and register agents.

use std::sync::Arc;
use std::time::Duration;

use arena_events::{MatchOutcome, MatchResult, WorldSnapshot};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::bots::Bot;
use crate::engine::{RoundReport, TurnEngine};
use crate::sink::RoundSink;
use crate::world::WorldError;

/// Runs a match to completion, one round after another
#[derive(Debug)]
pub struct MatchController {
    engine: TurnEngine,
    max_rounds: Option<u64>,
}

impl MatchController {
    pub fn new(engine: TurnEngine) -> Self {
        Self {
            engine,
            max_rounds: None,
        }
    }

    /// Stop after this many rounds even if several agents are still alive
    pub fn with_max_rounds(mut self, max_rounds: Option<u64>) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn engine(&self) -> &TurnEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut TurnEngine {
        &mut self.engine
    }

    pub fn into_engine(self) -> TurnEngine {
        self.engine
    }

    /// Step until at most one agent is alive (or the round cap is hit)
    pub fn run_to_completion(&mut self) -> MatchResult {
        self.run_with(|_| {})
    }

    /// Like [`run_to_completion`](Self::run_to_completion), handing every
    /// round's report to `on_round` as it completes.
    pub fn run_with<F>(&mut self, mut on_round: F) -> MatchResult
    where
        F: FnMut(&RoundReport),
    {
        let started_at = self.engine.world().round();
        while !self.engine.is_match_over() {
            if let Some(max) = self.max_rounds {
                if self.engine.world().round() - started_at >= max {
                    warn!(max_rounds = max, "round limit reached");
                    break;
                }
            }
            let report = self.engine.resolve_round();
            on_round(&report);
        }

        let result = self.result();
        info!(rounds = result.rounds, winner = ?result.winner(), "match finished");
        result
    }

    /// Summary of the match as it stands
    pub fn result(&self) -> MatchResult {
        match_result(&self.engine)
    }
}

fn match_result(engine: &TurnEngine) -> MatchResult {
    let world = engine.world();
    let survivors: Vec<String> = world
        .agents()
        .iter()
        .filter(|a| a.is_alive())
        .map(|a| a.name.clone())
        .collect();

    let outcome = match survivors.len() {
        0 => MatchOutcome::NoSurvivors,
        1 => MatchOutcome::Victory {
            winner: survivors[0].clone(),
        },
        _ => MatchOutcome::RoundLimit { survivors },
    };

    MatchResult {
        rounds: world.round(),
        outcome,
    }
}

/// Cloneable access to a match running in persistent mode.
///
/// All reads and registrations go through the same lock as the tick loop, so a
/// snapshot always reflects fully applied rounds. The lock is released before
/// the round's snapshot is handed to the sink.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    engine: Arc<Mutex<TurnEngine>>,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl MatchHandle {
    pub async fn snapshot(&self) -> WorldSnapshot {
        self.engine.lock().await.snapshot()
    }

    /// Add a bot between ticks. Works after the match looked finished too,
    /// in which case play resumes on the next tick.
    pub async fn register_agent<B: Bot + 'static>(&self, bot: B) -> Result<String, WorldError> {
        self.engine.lock().await.register_agent(bot)
    }

    pub async fn is_match_over(&self) -> bool {
        self.engine.lock().await.is_match_over()
    }

    pub async fn winner(&self) -> Option<String> {
        self.engine.lock().await.winner().map(str::to_string)
    }

    /// Summary of the match as it currently stands
    pub async fn result(&self) -> MatchResult {
        match_result(&*self.engine.lock().await)
    }

    /// Ask the tick loop to stop at the next round boundary
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.stop_tx.borrow()
    }

    /// Resolves once [`stop`](Self::stop) has been called
    pub async fn stopped(&self) {
        let mut rx = self.stop_tx.subscribe();
        let _ = rx.wait_for(|stopped| *stopped).await;
    }
}

/// A match ticking in the background on a fixed interval
#[derive(Debug)]
pub struct PersistentMatch {
    handle: MatchHandle,
    task: JoinHandle<WorldSnapshot>,
}

impl PersistentMatch {
    /// Start ticking `engine` every `interval`, handing each round's snapshot
    /// to `sink`. Must be called from within a tokio runtime.
    pub fn spawn<S>(engine: TurnEngine, interval: Duration, sink: S) -> Self
    where
        S: RoundSink + 'static,
    {
        let engine = Arc::new(Mutex::new(engine));
        let (stop_tx, stop_rx) = watch::channel(false);
        let handle = MatchHandle {
            engine: engine.clone(),
            stop_tx: Arc::new(stop_tx),
        };
        let task = tokio::spawn(tick_loop(engine, interval, sink, stop_rx));
        Self { handle, task }
    }

    pub fn handle(&self) -> MatchHandle {
        self.handle.clone()
    }

    /// Signal a stop and wait for the loop to finish its current round.
    /// Returns the final snapshot.
    pub async fn shutdown(self) -> Result<WorldSnapshot, tokio::task::JoinError> {
        self.handle.stop();
        self.task.await
    }
}

/// Hand `snapshot` to the sink on the blocking pool so file writes never stall
/// the runtime. `None` if the sink panicked.
async fn deliver<S: RoundSink + 'static>(mut sink: S, snapshot: WorldSnapshot) -> Option<S> {
    let delivery = tokio::task::spawn_blocking(move || {
        let result = sink.on_round_complete(&snapshot);
        (sink, snapshot.round, result)
    })
    .await;

    match delivery {
        Ok((sink, round, result)) => {
            if let Err(e) = result {
                warn!(round, error = %e, "failed to deliver snapshot");
            }
            Some(sink)
        }
        Err(e) => {
            error!(error = %e, "round sink panicked, stopping the match");
            None
        }
    }
}

async fn tick_loop<S: RoundSink + 'static>(
    engine: Arc<Mutex<TurnEngine>>,
    interval: Duration,
    mut sink: S,
    mut stop_rx: watch::Receiver<bool>,
) -> WorldSnapshot {
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; rounds start one interval in
    ticker.tick().await;

    info!(interval_ms = interval.as_millis() as u64, "persistent match started");

    loop {
        if *stop_rx.borrow() {
            break;
        }
        tokio::select! {
            biased;
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let snapshot = engine.lock().await.step();
                // The next round waits for this delivery; readers and
                // registrations do not.
                match deliver(sink, snapshot).await {
                    Some(returned) => sink = returned,
                    None => break,
                }
            }
        }
    }

    let snapshot = engine.lock().await.snapshot();
    info!(round = snapshot.round, "persistent match stopped");
    snapshot
}
