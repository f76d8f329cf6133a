//! Background search thread and the command side that drives it.
//!
//! The command thread owns the game state. A `go` ships a snapshot of the position and its
//! history to the worker over a channel, so the worker never reads anything the command side
//! can mutate. Every call that changes the game state first collects the outcome of the search
//! in flight, stopping it if necessary.

use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use tracing::{debug, error, info, warn};

use crate::board::{CandidateMove, ChessMove, Position};
use crate::error::{EngineError, EngineResult};
use crate::search::{SearchControl, Searcher};
use crate::types::{EngineConfig, IterationReport, SearchLimits, SearchResult};

/// Receives progress from the search thread.
pub trait Reporter: Send {
    fn iteration(&mut self, report: &IterationReport);
    fn finished(&mut self, result: &SearchResult);
}

/// Discards everything.
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn iteration(&mut self, _: &IterationReport) {}
    fn finished(&mut self, _: &SearchResult) {}
}

enum Command {
    Go {
        position: Position,
        history: Vec<u64>,
        limits: SearchLimits,
    },
    Stop,
    NewGame,
    Configure(EngineConfig),
    Quit,
}

struct Worker {
    searcher: Searcher,
    reporter: Box<dyn Reporter>,
    commands: Receiver<Command>,
    outcomes: Sender<EngineResult<SearchResult>>,
    /// commands that arrived while a search was running
    deferred: VecDeque<Command>,
}

/// Feeds iteration reports to the reporter and watches the channel for a stop.
struct WorkerControl<'a> {
    reporter: &'a mut dyn Reporter,
    commands: &'a Receiver<Command>,
    deferred: &'a mut VecDeque<Command>,
    stopped: bool,
    quit: &'a mut bool,
}

impl WorkerControl<'_> {
    fn interrupted(&mut self) -> bool {
        while let Ok(command) = self.commands.try_recv() {
            match command {
                Command::Stop => self.stopped = true,
                Command::Quit => {
                    self.stopped = true;
                    *self.quit = true;
                }
                other => self.deferred.push_back(other),
            }
        }
        self.stopped
    }
}

impl SearchControl for WorkerControl<'_> {
    fn iteration(&mut self, report: &IterationReport) -> ControlFlow<()> {
        self.reporter.iteration(report);
        if self.interrupted() { ControlFlow::Break(()) } else { ControlFlow::Continue(()) }
    }

    fn should_abort(&mut self) -> bool {
        self.interrupted()
    }
}

impl Worker {
    fn run(mut self) {
        loop {
            let command = match self.deferred.pop_front() {
                Some(command) => command,
                None => match self.commands.recv() {
                    Ok(command) => command,
                    Err(_) => break,
                },
            };

            match command {
                Command::Go { position, history, limits } => {
                    if self.go(&position, &history, limits) {
                        break;
                    }
                }
                // nothing running
                Command::Stop => {}
                Command::NewGame => self.searcher.new_game(),
                Command::Configure(config) => self.searcher.configure(config),
                Command::Quit => break,
            }
        }
        debug!("search thread exiting");
    }

    /// Run one search to completion or until stopped. Returns true if a quit arrived meanwhile.
    fn go(&mut self, position: &Position, history: &[u64], limits: SearchLimits) -> bool {
        let Worker { searcher, reporter, commands, deferred, outcomes } = self;
        let mut quit = false;
        let control = WorkerControl {
            reporter: reporter.as_mut(),
            commands,
            deferred,
            stopped: false,
            quit: &mut quit,
        };

        let outcome = catch_unwind(AssertUnwindSafe(|| searcher.search(position, history, limits, control)));

        let (result, outcome) = match outcome {
            Ok(result) => (result.clone(), Ok(result)),
            Err(_) => {
                // the tables may be half-written; start over with empty ones
                error!(fen = %position, "search panicked; search state reset");
                let config = *searcher.config();
                *searcher = Searcher::new(config);
                (SearchResult::default(), Err(EngineError::SearchPanicked))
            }
        };

        reporter.finished(&result);
        if outcomes.send(outcome).is_err() {
            warn!("search outcome dropped; command side is gone");
        }
        quit
    }
}

/// Command side of the engine: game state plus a handle on the search thread.
pub struct SearchOrchestrator {
    commands: Sender<Command>,
    outcomes: Receiver<EngineResult<SearchResult>>,
    worker: Option<JoinHandle<()>>,
    position: Position,
    /// hashes of the positions before `position`, back to the last irreversible move
    history: Vec<u64>,
    config: EngineConfig,
    pending: bool,
}

impl SearchOrchestrator {
    /// Start the search thread. The thread lives until `quit` or drop.
    pub fn spawn<R: Reporter + 'static>(config: EngineConfig, reporter: R) -> EngineResult<Self> {
        let (command_tx, command_rx) = unbounded();
        let (outcome_tx, outcome_rx) = unbounded();

        let worker = Worker {
            searcher: Searcher::new(config),
            reporter: Box::new(reporter),
            commands: command_rx,
            outcomes: outcome_tx,
            deferred: VecDeque::new(),
        };
        let handle = thread::Builder::new().name("search".into()).spawn(move || worker.run())?;
        info!(hash_mb = config.hash_mb, "search thread started");

        Ok(Self {
            commands: command_tx,
            outcomes: outcome_rx,
            worker: Some(handle),
            position: Position::default(),
            history: Vec::new(),
            config,
            pending: false,
        })
    }

    fn send(&self, command: Command) -> EngineResult<()> {
        self.commands.send(command).map_err(|_| EngineError::WorkerDisconnected)
    }

    /// Block until the outstanding search, if any, reports back. Does not stop it.
    pub fn wait(&mut self) -> EngineResult<Option<SearchResult>> {
        if !self.pending {
            return Ok(None);
        }
        self.pending = false;
        let outcome = self.outcomes.recv().map_err(|_| EngineError::WorkerDisconnected)?;
        outcome.map(Some)
    }

    /// Ask the running search to stop and collect its result. The search finishes its current
    /// poll interval first, so this returns within a few thousand nodes.
    pub fn stop(&mut self) -> EngineResult<Option<SearchResult>> {
        if !self.pending {
            return Ok(None);
        }
        self.send(Command::Stop)?;
        self.wait()
    }

    /// Stop whatever is running before the game state changes under it.
    fn settle(&mut self) -> EngineResult<()> {
        match self.stop() {
            Err(EngineError::SearchPanicked) => {
                warn!("previous search panicked");
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }

    /// True while a search runs; false once it is done, even before its result is collected.
    pub fn is_searching(&self) -> bool {
        self.pending && self.outcomes.is_empty()
    }

    /// Start a search on the current position. Returns immediately; progress and the final
    /// result go to the reporter, and `wait`/`stop` hand the result back here.
    pub fn go(&mut self, limits: SearchLimits) -> EngineResult<()> {
        self.settle()?;
        debug!(fen = %self.position, ?limits, "go");
        self.send(Command::Go {
            position: self.position,
            history: self.history.clone(),
            limits,
        })?;
        self.pending = true;
        Ok(())
    }

    pub fn new_game(&mut self) -> EngineResult<()> {
        self.settle()?;
        self.position = Position::default();
        self.history.clear();
        self.send(Command::NewGame)
    }

    /// Replace the current position. Repetition history starts over.
    pub fn set_position(&mut self, position: Position) -> EngineResult<()> {
        self.settle()?;
        self.position = position;
        self.history.clear();
        Ok(())
    }

    /// Play one move on the current position. An illegal move leaves the position untouched.
    pub fn apply_move(&mut self, candidate: CandidateMove) -> EngineResult<ChessMove> {
        self.settle()?;
        let before = self.position.hash();
        let mv = self.position.apply_move(candidate)?;
        if self.position.halfmove_clock() == 0 {
            // nothing before an irreversible move can recur
            self.history.clear();
        } else {
            self.history.push(before);
        }
        Ok(mv)
    }

    /// Play moves in order, stopping at the first that fails. Moves before it stay played.
    pub fn apply_moves(&mut self, candidates: &[CandidateMove]) -> EngineResult<()> {
        for &candidate in candidates {
            self.apply_move(candidate)?;
        }
        Ok(())
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn history(&self) -> &[u64] {
        &self.history
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn configure(&mut self, config: EngineConfig) -> EngineResult<()> {
        self.settle()?;
        self.config = config;
        self.send(Command::Configure(config))
    }

    /// Stop any search and shut the thread down.
    pub fn quit(mut self) -> EngineResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> EngineResult<()> {
        let Some(handle) = self.worker.take() else {
            return Ok(());
        };
        // the worker may already be gone; joining tells us how it ended
        let _ = self.commands.send(Command::Quit);
        handle.join().map_err(|_| EngineError::SearchPanicked)
    }
}

impl Drop for SearchOrchestrator {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            error!("search thread ended abnormally: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn small() -> EngineConfig {
        EngineConfig { hash_mb: 1, ..EngineConfig::default() }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        depths: Arc<Mutex<Vec<u8>>>,
        finished: Arc<Mutex<Vec<SearchResult>>>,
    }

    impl Reporter for Recorder {
        fn iteration(&mut self, report: &IterationReport) {
            self.depths.lock().unwrap().push(report.depth);
        }

        fn finished(&mut self, result: &SearchResult) {
            self.finished.lock().unwrap().push(result.clone());
        }
    }

    fn candidate(text: &str) -> CandidateMove {
        text.parse().unwrap()
    }

    #[test]
    fn test_go_and_wait() {
        let recorder = Recorder::default();
        let mut engine = SearchOrchestrator::spawn(small(), recorder.clone()).unwrap();
        engine.go(SearchLimits::depth(3)).unwrap();
        let result = engine.wait().unwrap().unwrap();

        assert_eq!(result.depth, 3);
        assert!(result.best_move.is_some());
        assert_eq!(*recorder.depths.lock().unwrap(), vec![1, 2, 3]);
        assert_eq!(*recorder.finished.lock().unwrap(), vec![result]);
        assert!(!engine.is_searching());
        assert!(engine.wait().unwrap().is_none());
    }

    #[test]
    fn test_stop_infinite_search() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        engine.go(SearchLimits::infinite()).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(50));
        let result = engine.stop().unwrap().unwrap();
        assert!(result.best_move.is_some());
        assert!(result.depth >= 1);
    }

    #[test]
    fn test_stop_when_idle() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        assert!(engine.stop().unwrap().is_none());
        assert!(!engine.is_searching());
    }

    #[test]
    fn test_apply_moves_stops_at_illegal() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        let err = engine
            .apply_moves(&[candidate("g1f3"), candidate("g8f6"), candidate("f3f6"), candidate("f6g8")])
            .unwrap_err();
        assert!(matches!(err, EngineError::IllegalMove(ref m) if m == "f3f6"));
        let expected: Position = "rnbqkb1r/pppppppp/5n2/8/8/5N2/PPPPPPPP/RNBQKB1R w KQkq - 2 2".parse().unwrap();
        assert_eq!(engine.position(), expected);
        assert_eq!(engine.history().len(), 2);
    }

    #[test]
    fn test_irreversible_move_clears_history() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        engine.apply_moves(&[candidate("g1f3"), candidate("g8f6")]).unwrap();
        assert_eq!(engine.history().len(), 2);
        engine.apply_move(candidate("e2e4")).unwrap();
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_position_change_waits_for_search() {
        let recorder = Recorder::default();
        let mut engine = SearchOrchestrator::spawn(small(), recorder.clone()).unwrap();
        engine.go(SearchLimits::depth(4)).unwrap();
        // the running search is stopped and reported before the move lands
        engine.apply_move(candidate("e2e4")).unwrap();
        assert_eq!(recorder.finished.lock().unwrap().len(), 1);
        assert!(!engine.is_searching());

        engine.go(SearchLimits::depth(2)).unwrap();
        let result = engine.wait().unwrap().unwrap();
        // black to move now
        let reply = result.best_move.unwrap();
        assert!(engine.position().legal_moves().contains(&reply));
    }

    #[test]
    fn test_new_game_resets_position() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        engine.apply_move(candidate("d2d4")).unwrap();
        engine.new_game().unwrap();
        assert_eq!(engine.position(), Position::default());
        assert!(engine.history().is_empty());
    }

    #[test]
    fn test_mated_position_reports_no_move() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        let mated: Position = "rnb1kbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3".parse().unwrap();
        engine.set_position(mated).unwrap();
        engine.go(SearchLimits::depth(4)).unwrap();
        let result = engine.wait().unwrap().unwrap();
        assert_eq!(result.best_move, None);
    }

    #[test]
    fn test_configure_reaches_worker() {
        let mut engine = SearchOrchestrator::spawn(small(), SilentReporter).unwrap();
        let config = EngineConfig { hash_mb: 2, default_depth: 2, keep_history: true };
        engine.configure(config).unwrap();
        assert_eq!(*engine.config(), config);
        // no depth given: the configured default applies
        engine.go(SearchLimits::default()).unwrap();
        assert_eq!(engine.wait().unwrap().unwrap().depth, 2);
    }

    struct PanicOnce {
        panicked: bool,
    }

    impl Reporter for PanicOnce {
        fn iteration(&mut self, _: &IterationReport) {
            if !self.panicked {
                self.panicked = true;
                panic!("reporter failure");
            }
        }

        fn finished(&mut self, _: &SearchResult) {}
    }

    #[test]
    fn test_recovers_from_panicking_search() {
        let mut engine = SearchOrchestrator::spawn(small(), PanicOnce { panicked: false }).unwrap();
        engine.go(SearchLimits::depth(2)).unwrap();
        assert!(matches!(engine.wait(), Err(EngineError::SearchPanicked)));

        // the thread survives and searches again
        engine.go(SearchLimits::depth(2)).unwrap();
        let result = engine.wait().unwrap().unwrap();
        assert!(result.best_move.is_some());
        engine.quit().unwrap();
    }
}
