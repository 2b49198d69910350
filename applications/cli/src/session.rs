//! Interactive session
//!
//! Owns the engine and funnels the three input streams (typed commands,
//! device signals, progress ticks) through one task, so every engine
//! command runs to completion before the next one starts.

use crate::command::{Command, HELP};
use crate::config::LoopdeckConfig;
use crate::error::Result;
use crate::render::{OutputFormat, Renderer};
use loopdeck_engine::{DeviceSignal, PlaylistEngine, RawSource, TickerToken};
use loopdeck_media::{ClockDevice, FileLoader, MediaRegistry, TokioTicker};
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, info};

/// What to do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session<W: Write> {
    engine: PlaylistEngine,
    signals: UnboundedReceiver<DeviceSignal>,
    ticks: UnboundedReceiver<TickerToken>,
    renderer: Renderer,
    out: W,
}

impl<W: Write> Session<W> {
    /// Wire the engine to local media and a tokio clock
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(config: &LoopdeckConfig, out: W) -> Result<Self> {
        let registry = MediaRegistry::new();
        let (signal_tx, signals) = mpsc::unbounded_channel();
        let (tick_tx, ticks) = mpsc::unbounded_channel();

        let engine = PlaylistEngine::new(
            config.engine.clone(),
            Box::new(ClockDevice::new(registry.clone(), signal_tx)?),
            Box::new(FileLoader::new(registry, config.media.clone())),
            Box::new(TokioTicker::new(tick_tx)?),
        );

        let format = if config.log.json_events {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        Ok(Self {
            engine,
            signals,
            ticks,
            renderer: Renderer::new(format),
            out,
        })
    }

    /// Engine driven by this session
    pub fn engine(&self) -> &PlaylistEngine {
        &self.engine
    }

    /// Output sink
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Load files and append them to the playlist
    pub fn import(&mut self, paths: Vec<PathBuf>) -> Result<()> {
        let added = self.engine.import(paths.into_iter().map(RawSource::from_path));
        debug!(added = added.len(), "Files imported");
        self.flush_events()
    }

    /// Run one command
    pub fn apply(&mut self, command: Command) -> Result<Flow> {
        debug!(?command, "Command");

        let outcome = match command {
            Command::Add(paths) => return self.import(paths).map(|()| Flow::Continue),
            Command::TogglePlay => {
                self.engine.toggle_play_pause();
                Ok(())
            }
            Command::ToggleDirection => {
                self.engine.toggle_direction();
                Ok(())
            }
            Command::Direction(direction) => {
                self.engine.set_direction(direction);
                Ok(())
            }
            Command::Select(index) => self.engine.select_track(index),
            Command::Move { from, to } => self.engine.move_track(from, to),
            Command::Rename { index, name } => self.engine.rename_track(index, &name).map(|_| ()),
            Command::Remove(index) => self.engine.remove_track(index).map(|_| ()),
            Command::Clear => {
                self.engine.clear();
                Ok(())
            }
            Command::Reset => {
                self.engine.reset();
                Ok(())
            }
            Command::Status => {
                let snapshot = self.engine.snapshot();
                self.renderer.render_snapshot(&mut self.out, &snapshot)?;
                Ok(())
            }
            Command::Help => {
                self.renderer.message(&mut self.out, HELP)?;
                Ok(())
            }
            Command::Quit => return Ok(Flow::Quit),
        };

        if let Err(err) = outcome {
            self.renderer.message(&mut self.out, &err.to_string())?;
        }
        self.flush_events()?;
        Ok(Flow::Continue)
    }

    /// Process input lines, device signals and ticks until quit or end of input
    ///
    /// Input that is not valid UTF-8 is decoded lossily rather than ending
    /// the session.
    pub async fn run<R>(&mut self, mut input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        // Survives cancelled reads, so a partial line is kept for the next pass
        let mut buf = Vec::new();
        info!("Session started");

        loop {
            tokio::select! {
                biased;

                read = input.read_until(b'\n', &mut buf) => {
                    if read? == 0 && buf.is_empty() {
                        debug!("End of input");
                        break;
                    }
                    let line = decode_line(&buf);
                    buf.clear();
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                Some(signal) = self.signals.recv() => {
                    self.engine.handle_device_signal(signal);
                    self.flush_events()?;
                }
                Some(token) = self.ticks.recv() => {
                    self.engine.on_progress_tick(token);
                    self.flush_events()?;
                }
            }
        }

        self.engine.reset();
        self.engine.drain_events();
        self.out.flush()?;
        info!("Session ended");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match Command::parse(line) {
            Ok(command) => self.apply(command),
            Err(err) => {
                self.renderer.message(&mut self.out, &err.to_string())?;
                Ok(Flow::Continue)
            }
        }
    }

    fn flush_events(&mut self) -> Result<()> {
        for event in self.engine.drain_events() {
            self.renderer.render(&mut self.out, &event)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Strip the line terminator, replacing invalid UTF-8
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_line_strips_terminators_only() {
        assert_eq!(decode_line(b"play\r\n"), "play");
        assert_eq!(decode_line(b" \n"), " ");
        assert_eq!(decode_line(b""), "");
        assert_eq!(decode_line(b"ls"), "ls");
    }

    #[test]
    fn decode_line_replaces_invalid_utf8() {
        assert_eq!(decode_line(b"add \xff.mp3\n"), "add \u{fffd}.mp3");
    }
}
