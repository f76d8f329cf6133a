use std::io::{self, BufRead};

use tracing::{debug, trace, warn};

use crate::board::{CandidateMove, Color, Position, divide};
use crate::error::{EngineError, EngineResult};
use crate::orchestrator::{Reporter, SearchOrchestrator};
use crate::types::{EngineConfig, IterationReport, MAX_DEPTH, Score, SearchLimits, SearchResult, mate_distance};

const ENGINE_NAME: &str = "lodestar";
const MAX_HASH_MB: usize = 4096;

/// Read commands from stdin until `quit` or end of input.
pub fn run() -> EngineResult<()> {
    let stdin = io::stdin();
    let mut engine = SearchOrchestrator::spawn(EngineConfig::default(), UciReporter)?;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else {
            continue;
        };
        trace!(%line, "command");

        match command {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author the {ENGINE_NAME} developers");
                println!("option name Hash type spin default {} min 1 max {MAX_HASH_MB}", engine.config().hash_mb);
                println!(
                    "option name Depth type spin default {} min 1 max {MAX_DEPTH}",
                    engine.config().default_depth
                );
                println!("option name KeepHistory type check default {}", engine.config().keep_history);
                println!("uciok");
            }
            // commands are handled in order, so anything sent before this is already applied
            "isready" => println!("readyok"),
            "ucinewgame" => report(engine.new_game()),
            "position" => report(load_position(&mut engine, &tokens)),
            "go" => {
                let params = parse_go(&tokens);
                let limits = params.limits(engine.position().side_to_move());
                report(engine.go(limits));
            }
            "stop" => report(engine.stop().map(|_| ())),
            "setoption" => {
                let config = parse_setoption(&tokens, *engine.config());
                report(engine.configure(config));
            }
            "d" | "print" => {
                let position = engine.position();
                println!("{}", position.diagram());
                println!("Fen: {position}");
                println!("Key: {:016x}", position.hash());
            }
            "perft" => {
                let depth = tokens.get(1).and_then(|t| t.parse().ok()).unwrap_or(1);
                print_divide(&engine.position(), depth);
            }
            "quit" => break,
            _ => debug!(command, "unknown command"),
        }
    }

    engine.stop()?;
    engine.quit()
}

/// Errors from a single command are logged and the session continues.
fn report(outcome: EngineResult<()>) {
    if let Err(e) = outcome {
        warn!("{e}");
    }
}

/// Prints `info` lines and the final `bestmove`.
struct UciReporter;

impl Reporter for UciReporter {
    fn iteration(&mut self, report: &IterationReport) {
        let elapsed_ms = report.elapsed_ms.max(1);
        let nps = report.nodes * 1000 / elapsed_ms;
        let pv: Vec<String> = report.pv.iter().map(|m| m.to_string()).collect();
        println!(
            "info depth {} score {} nodes {} time {} nps {} pv {}",
            report.depth,
            format_score(report.score),
            report.nodes,
            report.elapsed_ms,
            nps,
            pv.join(" ")
        );
    }

    fn finished(&mut self, result: &SearchResult) {
        match result.best_move {
            Some(m) => println!("bestmove {m}"),
            None => println!("bestmove 0000"),
        }
    }
}

/// UCI score text: `mate N` for forced mates (negative when being mated), `cp N` otherwise.
pub fn format_score(score: Score) -> String {
    match mate_distance(score) {
        Some(moves) => format!("mate {moves}"),
        None => format!("cp {score}"),
    }
}

fn print_divide(position: &Position, depth: u32) {
    let mut total = 0;
    for (mv, count) in divide(position, depth) {
        println!("{mv}: {count}");
        total += count;
    }
    println!();
    println!("Nodes searched: {total}");
}

/// Parsed `go` command parameters.
#[derive(Debug, Default)]
struct GoParams {
    depth: Option<u8>,
    movetime: Option<u64>,
    wtime: Option<u64>,
    btime: Option<u64>,
    winc: Option<u64>,
    binc: Option<u64>,
    moves_to_go: Option<u64>,
    infinite: bool,
}

impl GoParams {
    /// Time budget for this search in milliseconds, `None` without a time control. A given
    /// clock always yields at least 1 ms, even when it is nearly or fully spent.
    fn compute_time_ms(&self, side: Color) -> Option<u64> {
        if self.infinite {
            return None;
        }
        if let Some(mt) = self.movetime {
            return Some(mt.max(1));
        }

        let (my_time, my_inc) = match side {
            Color::White => (self.wtime?, self.winc.unwrap_or(0)),
            Color::Black => (self.btime?, self.binc.unwrap_or(0)),
        };

        let moves_left = self.moves_to_go.unwrap_or(30);
        let allocated = my_time / moves_left.max(1) + my_inc * 3 / 4;

        // never more than 80% of the clock
        Some(allocated.min(my_time * 4 / 5).max(1))
    }

    fn limits(&self, side: Color) -> SearchLimits {
        SearchLimits {
            depth: self.depth,
            time_ms: self.compute_time_ms(side),
            infinite: self.infinite,
        }
    }
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams::default();
    let mut iter = tokens.iter().skip(1);

    while let Some(&token) = iter.next() {
        let mut value = || iter.next().and_then(|t| t.parse::<u64>().ok());
        match token {
            "depth" => params.depth = value().map(|d| d.clamp(1, MAX_DEPTH as u64) as u8),
            "movetime" => params.movetime = value(),
            "wtime" => params.wtime = value(),
            "btime" => params.btime = value(),
            "winc" => params.winc = value(),
            "binc" => params.binc = value(),
            "movestogo" => params.moves_to_go = value(),
            "infinite" => params.infinite = true,
            _ => {}
        }
    }

    params
}

/// `position [startpos | fen <fen>] [moves <m1> ...]`. Moves are played in order; the first
/// one that fails to parse or is illegal stops the batch and is reported, the ones before it
/// stay on the board.
fn load_position(engine: &mut SearchOrchestrator, tokens: &[&str]) -> EngineResult<()> {
    let moves_idx = tokens.iter().position(|&t| t == "moves").unwrap_or(tokens.len());

    let position = match tokens.get(1) {
        Some(&"startpos") => Position::default(),
        Some(&"fen") => tokens[2..moves_idx].join(" ").parse()?,
        _ => {
            return Err(EngineError::InvalidFen {
                fen: tokens[1..].join(" "),
                reason: "expected 'startpos' or 'fen'".into(),
            });
        }
    };
    engine.set_position(position)?;

    for &text in tokens.iter().skip(moves_idx + 1) {
        let candidate: CandidateMove = text.parse()?;
        engine.apply_move(candidate)?;
    }
    Ok(())
}

fn parse_setoption(tokens: &[&str], mut config: EngineConfig) -> EngineConfig {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");

    let (Some(ni), Some(vi)) = (name_idx, value_idx) else {
        return config;
    };
    if vi <= ni {
        return config;
    }
    let name = tokens[ni + 1..vi].join(" ");
    let value = tokens[vi + 1..].join(" ");

    match name.to_lowercase().as_str() {
        "hash" => {
            if let Ok(mb) = value.parse::<usize>() {
                config.hash_mb = mb.clamp(1, MAX_HASH_MB);
            }
        }
        "depth" => {
            if let Ok(depth) = value.parse::<u8>() {
                config.default_depth = depth.clamp(1, MAX_DEPTH);
            }
        }
        "keephistory" => {
            if let Ok(keep) = value.parse::<bool>() {
                config.keep_history = keep;
            }
        }
        _ => debug!(%name, "unknown option"),
    }
    config
}


// Commands run on the stdin thread; searches run on the orchestrator's thread and print their
// own `info`/`bestmove` lines.
