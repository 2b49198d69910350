//! Terminal rendering of engine events
//!
//! Text mode redraws the playlist from every `StateChanged` snapshot and keeps
//! a single progress line updated in place. JSON mode prints one event per
//! line.

use crate::error::Result;
use loopdeck_engine::{format_clock, EngineEvent, PlaybackStatus, PlaylistSnapshot, TrackId};
use serde_json::json;
use std::io::Write;

/// Width of the progress bar in text mode
const BAR_WIDTH: usize = 20;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Stateful renderer
///
/// Remembers the last snapshot to resolve track names and the scroll window
/// of long playlists.
pub struct Renderer {
    format: OutputFormat,
    max_rows: usize,
    scroll: usize,
    last: Option<PlaylistSnapshot>,
    progress_open: bool,
}

impl Renderer {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            max_rows: 15,
            scroll: 0,
            last: None,
            progress_open: false,
        }
    }

    /// Limit the number of playlist rows shown at once
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows.max(1);
        self
    }

    /// Render one engine event
    pub fn render<W: Write>(&mut self, out: &mut W, event: &EngineEvent) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut *out, event)?;
            writeln!(out)?;
            return Ok(());
        }

        match event {
            EngineEvent::StateChanged { snapshot } => self.draw_playlist(out, snapshot)?,
            EngineEvent::TrackStarted { track_id, .. } => {
                let name = self.name_of(*track_id);
                self.line(out, &format!("Now playing: {name}"))?;
            }
            EngineEvent::Progress {
                track_id,
                position_ms,
                remaining_ms,
                ratio,
            } => {
                let name = self.name_of(*track_id);
                let filled = ((*ratio * BAR_WIDTH as f32).round() as usize).min(BAR_WIDTH);
                write!(
                    out,
                    "\r{name} [{}{}] {} -{}",
                    "#".repeat(filled),
                    "-".repeat(BAR_WIDTH - filled),
                    format_clock(std::time::Duration::from_millis(*position_ms)),
                    format_clock(std::time::Duration::from_millis(*remaining_ms)),
                )?;
                out.flush()?;
                self.progress_open = true;
            }
            EngineEvent::ImportRejected { name, reason } => {
                self.line(out, &format!("Skipped {name}: {reason}"))?;
            }
            EngineEvent::DeviceFailed { reason, .. } => {
                self.line(out, &format!("Playback failed: {reason}"))?;
            }
            EngineEvent::TrackCompleted { .. }
            | EngineEvent::TrackAdded { .. }
            | EngineEvent::TrackRemoved { .. } => {}
        }

        Ok(())
    }

    /// Print the playlist regardless of pending events
    pub fn render_snapshot<W: Write>(&mut self, out: &mut W, snapshot: &PlaylistSnapshot) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut *out, snapshot)?;
            writeln!(out)?;
            return Ok(());
        }
        self.draw_playlist(out, snapshot)
    }

    /// Print a message for the user (help, command errors)
    pub fn message<W: Write>(&mut self, out: &mut W, text: &str) -> Result<()> {
        if self.format == OutputFormat::Json {
            serde_json::to_writer(&mut *out, &json!({ "type": "message", "text": text }))?;
            writeln!(out)?;
            return Ok(());
        }
        self.line(out, text)
    }

    fn line<W: Write>(&mut self, out: &mut W, text: &str) -> Result<()> {
        if std::mem::take(&mut self.progress_open) {
            writeln!(out)?;
        }
        writeln!(out, "{text}")?;
        Ok(())
    }

    fn name_of(&self, track_id: TrackId) -> String {
        self.last
            .as_ref()
            .and_then(|s| s.tracks.iter().find(|t| t.id == track_id))
            .map(|t| t.display_name.clone())
            .unwrap_or_else(|| track_id.to_string())
    }

    fn draw_playlist<W: Write>(&mut self, out: &mut W, snapshot: &PlaylistSnapshot) -> Result<()> {
        let status = match snapshot.status {
            PlaybackStatus::Idle => "idle",
            PlaybackStatus::Playing => "playing",
            PlaybackStatus::Paused => "paused",
        };
        self.line(
            out,
            &format!(
                "Playlist: {} tracks, {}, {}",
                snapshot.tracks.len(),
                snapshot.direction,
                status
            ),
        )?;

        let (start, end) = self.window(snapshot);
        if start > 0 {
            writeln!(out, "   ...")?;
        }
        for (i, track) in snapshot.tracks.iter().enumerate().take(end).skip(start) {
            let marker = match (snapshot.current_index == Some(i), snapshot.status) {
                (true, PlaybackStatus::Playing) => '>',
                (true, PlaybackStatus::Paused) => '=',
                (true, PlaybackStatus::Idle) => '*',
                (false, _) => ' ',
            };
            writeln!(
                out,
                "{marker} {:>3}. {:<40} {:>6}",
                i + 1,
                track.display_name,
                format_clock(track.remaining)
            )?;
        }
        if end < snapshot.tracks.len() {
            writeln!(out, "   ...")?;
        }

        self.last = Some(snapshot.clone());
        Ok(())
    }

    /// Rows to show: scroll only when the snapshot asks to reveal the current
    /// track, otherwise keep the previous window
    fn window(&mut self, snapshot: &PlaylistSnapshot) -> (usize, usize) {
        let len = snapshot.tracks.len();
        if len <= self.max_rows {
            self.scroll = 0;
            return (0, len);
        }

        if snapshot.reveal_current {
            if let Some(current) = snapshot.current_index {
                if current < self.scroll {
                    self.scroll = current;
                } else if current >= self.scroll + self.max_rows {
                    self.scroll = current + 1 - self.max_rows;
                }
            }
        }
        self.scroll = self.scroll.min(len - self.max_rows);

        (self.scroll, self.scroll + self.max_rows)
    }
}
