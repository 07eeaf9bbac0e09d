//! Event recording for diagnosing interaction bugs.
//!
//! A recording is a JSON-lines file. The first line captures the config and
//! screen metrics the reactor started with; every following line is one
//! event with the uptime it arrived at. Replaying feeds the events to a fresh
//! reactor on a manual clock, so every animation frame lands exactly where it
//! did originally.

use std::fs::File;
use std::io::{BufRead, BufReader, LineWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Event, Reactor, ReactorError};
use crate::actor::broadcast::BroadcastSender;
use crate::common::config::Config;
use crate::sys::haptics::HapticSink;
use crate::sys::screen::ScreenMetrics;
use crate::sys::timer::{ManualClock, Millis};
use crate::sys::window::OverlayHost;

/// How long animations may run after the last replayed event.
const SETTLE_MS: Millis = 2000;

#[derive(Serialize, Deserialize, Debug)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Line {
    Start {
        at: Millis,
        config: Config,
        metrics: ScreenMetrics,
    },
    Event {
        at: Millis,
        event: Event,
    },
}

#[derive(Default)]
pub struct Record {
    file: Option<LineWriter<File>>,
}

impl Record {
    pub fn new(path: Option<&Path>) -> Result<Record, ReactorError> {
        let file = match path {
            Some(path) => Some(LineWriter::new(File::create(path)?)),
            None => None,
        };
        Ok(Record { file })
    }

    pub(super) fn start(&mut self, at: Millis, config: &Config, metrics: &ScreenMetrics) {
        self.write(&Line::Start {
            at,
            config: config.clone(),
            metrics: *metrics,
        });
    }

    pub(super) fn on_event(&mut self, at: Millis, event: &Event) {
        if self.file.is_some() {
            self.write(&Line::Event { at, event: event.clone() });
        }
    }

    fn write(&mut self, line: &Line) {
        let Some(file) = &mut self.file else {
            return;
        };
        let result = serde_json::to_string(line)
            .map_err(ReactorError::from)
            .and_then(|json| Ok(writeln!(file, "{json}")?));
        if let Err(err) = result {
            warn!(%err, "Recording failed; disabling it");
            self.file = None;
        }
    }
}

/// Replays the recording at `path` against the given collaborators and
/// returns the reactor once its animations have settled.
pub fn replay(
    path: &Path,
    host: Box<dyn OverlayHost>,
    haptics: Box<dyn HapticSink>,
    broadcast_tx: Option<BroadcastSender>,
) -> Result<Reactor, ReactorError> {
    let mut lines = BufReader::new(File::open(path)?).lines();

    let header = loop {
        let Some(line) = lines.next() else {
            return Err(ReactorError::MissingHeader);
        };
        let line = line?;
        if !line.trim().is_empty() {
            break serde_json::from_str::<Line>(&line)?;
        }
    };
    let Line::Start { at, config, metrics } = header else {
        return Err(ReactorError::MissingHeader);
    };

    let clock = ManualClock::new(at);
    let mut reactor = Reactor::new(
        config,
        metrics,
        host,
        haptics,
        Box::new(clock.clone()),
        Record::default(),
        broadcast_tx,
    );

    let mut last = at;
    let mut count = 0usize;
    for line in lines {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Line>(&line)? {
            Line::Event { at, event } => {
                reactor.run_until(&clock, at);
                reactor.handle_event(event);
                last = at;
                count += 1;
            }
            Line::Start { .. } => warn!("Ignoring repeated recording header"),
        }
    }
    reactor.run_until(&clock, last + SETTLE_MS);
    info!(count, "Replayed recording");
    Ok(reactor)
}
