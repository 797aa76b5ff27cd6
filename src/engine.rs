//! The engine protocol driver: owns one child process speaking UCI over its
//! stdin/stdout and exchanges line-oriented commands with it.

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{DriverError, Res};
use crate::options::{EngineOptions, Score, SCORE_MATE_NEG, SCORE_MATE_POS};

/// An append-only transcript of the UCI lines exchanged with an engine.
/// Shared (not owned) because a single log file may record several engines.
pub type LogSink = Arc<Mutex<dyn Write + Send>>;

fn log_line(sink: &LogSink, name: &str, arrow: &str, line: &str) -> Res<()> {
    let mut guard = sink.lock().unwrap_or_else(|poison| poison.into_inner());
    writeln!(guard, "{name} {arrow} {line}")
        .and_then(|()| guard.flush())
        .map_err(|source| DriverError::LogWrite { name: name.to_string(), source })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Ready,
    Searching,
    Destroyed,
}

/// What `request_best_move` observed: a move (with whatever score preceded
/// it), or an expired deadline. Re-architected from the source's
/// out-parameter style into a single returned value (see SPEC_FULL.md §4.1).
#[derive(Debug, Clone)]
pub enum BestMoveOutcome {
    Found { score: Option<Score>, mv: String, time_left_ms: i64 },
    Timeout { time_left_ms: i64 },
}

/// Drives one external UCI engine process.
///
/// The handle exclusively owns its child process and the two streams bound
/// to it; a log sink, if configured, is shared and not owned. There is no
/// state between "live" (process running, both streams open) and
/// "destroyed" -- once dropped, the handle is gone.
pub struct EngineDriver {
    display_name: String,
    child: Option<Child>,
    reader: Box<dyn BufRead + Send>,
    writer: Box<dyn Write + Send>,
    log: Option<LogSink>,
    state: EngineState,
}

impl std::fmt::Debug for EngineDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineDriver")
            .field("display_name", &self.display_name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl EngineDriver {
    /// Spawns `cmd`, performs the UCI handshake, and applies `options`.
    ///
    /// `name` overrides the display name; when absent it is derived from the
    /// engine's own `id name` line during the handshake (falling back to
    /// `cmd` if the engine never sends one).
    pub fn spawn(
        cmd: &str,
        name: Option<String>,
        log: Option<LogSink>,
        options: &EngineOptions,
    ) -> Res<Self> {
        let mut command = Command::new(cmd);
        command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::null());
        let mut child =
            command.spawn().map_err(|source| DriverError::Spawn { cmd: cmd.to_string(), source })?;
        let stdin = child.stdin.take().expect("stdin was piped");
        let stdout = child.stdout.take().expect("stdout was piped");

        let fallback_name = name.clone().unwrap_or_else(|| cmd.to_string());
        let mut driver = Self {
            display_name: fallback_name,
            child: Some(child),
            reader: Box::new(BufReader::new(stdout)),
            writer: Box::new(stdin),
            log,
            state: EngineState::Ready,
        };
        debug!(engine = %driver.display_name, "spawned");
        driver.handshake(name.is_some())?;
        for (opt_name, value) in &options.assignments {
            driver.write_line(&format!("setoption name {opt_name} value {value}"))?;
        }
        Ok(driver)
    }

    /// Builds a driver over caller-supplied streams instead of a spawned
    /// process, still performing the full UCI handshake. Used by tests to
    /// exercise the protocol against a scripted engine without spawning a
    /// real binary.
    pub fn from_streams(
        name: Option<String>,
        reader: impl BufRead + Send + 'static,
        writer: impl Write + Send + 'static,
        log: Option<LogSink>,
    ) -> Res<Self> {
        let has_name = name.is_some();
        let mut driver = Self {
            display_name: name.unwrap_or_default(),
            child: None,
            reader: Box::new(reader),
            writer: Box::new(writer),
            log,
            state: EngineState::Ready,
        };
        driver.handshake(has_name)?;
        Ok(driver)
    }

    pub fn name(&self) -> &str {
        &self.display_name
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    fn handshake(&mut self, name_given: bool) -> Res<()> {
        self.write_line("uci")?;
        let mut name_captured = name_given;
        loop {
            let line = self.read_line()?;
            if !name_captured {
                if let Some(rest) = line.strip_prefix("id name ") {
                    self.display_name = rest.to_string();
                    name_captured = true;
                }
            }
            if line == "uciok" {
                break;
            }
        }
        Ok(())
    }

    fn read_line(&mut self) -> Res<String> {
        let mut buf = String::new();
        let read = self
            .reader
            .read_line(&mut buf)
            .map_err(|source| DriverError::Io { name: self.display_name.clone(), source })?;
        if read == 0 {
            return Err(DriverError::StreamClosed { name: self.display_name.clone() });
        }
        let line = buf.trim_end_matches(['\n', '\r']).to_string();
        if let Some(log) = &self.log {
            log_line(log, &self.display_name, "->", &line)?;
        }
        Ok(line)
    }

    fn write_line(&mut self, line: &str) -> Res<()> {
        writeln!(self.writer, "{line}")
            .and_then(|()| self.writer.flush())
            .map_err(|source| DriverError::Io { name: self.display_name.clone(), source })?;
        if let Some(log) = &self.log {
            log_line(log, &self.display_name, "<-", line)?;
        }
        Ok(())
    }

    /// Sends one UCI command line, e.g. a `position ...` command.
    pub fn send_line(&mut self, line: &str) -> Res<()> {
        self.write_line(line)
    }

    /// Blocks until `readyok`, discarding anything else received meanwhile.
    pub fn synchronize(&mut self) -> Res<()> {
        self.write_line("isready")?;
        loop {
            if self.read_line()? == "readyok" {
                return Ok(());
            }
        }
    }

    /// Sends `go_line` and waits for a move within `time_left_ms`. On
    /// expiry, sends `stop` and drains to `bestmove` before returning, so
    /// the next `go` never observes a stale search.
    pub fn request_best_move(&mut self, go_line: &str, time_left_ms: i64) -> Res<BestMoveOutcome> {
        self.state = EngineState::Searching;
        self.write_line(go_line)?;

        let deadline = Instant::now() + Duration::from_millis(time_left_ms.max(0) as u64);
        let mut score = None;
        loop {
            // Always attempt a read before checking the deadline, so a
            // response already sitting in the buffer is never pre-empted by
            // a zero or expired budget.
            let line = self.read_line()?;
            let mut tokens = line.split_whitespace();
            match tokens.next() {
                Some("info") => {
                    if let Some(s) = parse_info_score(&line, &self.display_name)? {
                        score = Some(s);
                    }
                }
                Some("bestmove") => {
                    let mv = tokens.next().unwrap_or_default().to_string();
                    self.state = EngineState::Ready;
                    let remaining = deadline.saturating_duration_since(Instant::now()).as_millis() as i64;
                    return Ok(BestMoveOutcome::Found { score, mv, time_left_ms: remaining });
                }
                _ => {}
            }
            if Instant::now() >= deadline {
                warn!(engine = %self.display_name, "timed out waiting for bestmove");
                self.drain_to_bestmove()?;
                return Ok(BestMoveOutcome::Timeout { time_left_ms: 0 });
            }
        }
    }

    fn drain_to_bestmove(&mut self) -> Res<()> {
        self.write_line("stop")?;
        loop {
            let line = self.read_line()?;
            if line.starts_with("bestmove ") || line == "bestmove" {
                self.state = EngineState::Ready;
                return Ok(());
            }
        }
    }
}

/// Parses the `score` sub-record of an `info` line, if present. Any other
/// token following `score` is a fatal protocol error (spec §4.1/§7).
fn parse_info_score(line: &str, name: &str) -> Res<Option<Score>> {
    let mut tokens = line.split_whitespace();
    while let Some(token) = tokens.next() {
        if token != "score" {
            continue;
        }
        let kind = tokens.next();
        let value = tokens.next();
        let parse_err = || DriverError::ScoreParse { name: name.to_string(), line: line.to_string() };
        return match (kind, value) {
            (Some("cp"), Some(v)) => Ok(Some(v.parse().map_err(|_| parse_err())?)),
            (Some("mate"), Some(v)) => {
                let plies: i32 = v.parse().map_err(|_| parse_err())?;
                Ok(Some(if plies < 0 { SCORE_MATE_NEG } else { SCORE_MATE_POS }))
            }
            _ => Err(parse_err()),
        };
    }
    Ok(None)
}

impl Drop for EngineDriver {
    fn drop(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.state = EngineState::Destroyed;
        let _ = self.write_line("quit");

        let Some(mut child) = self.child.take() else { return };
        let grace = Duration::from_millis(5000);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => return,
                Ok(None) => {}
                Err(err) => {
                    warn!(engine = %self.display_name, %err, "try_wait failed while reaping engine");
                    break;
                }
            }
            if start.elapsed() >= grace {
                break;
            }
            sleep(Duration::from_millis(50));
        }
        if let Err(err) = child.kill() {
            warn!(engine = %self.display_name, %err, "failed to kill unresponsive engine");
        }
        if let Err(err) = child.wait() {
            warn!(engine = %self.display_name, %err, "failed to reap engine after kill");
        }
    }
}
