//! Round Sinks
//!
//! Where snapshots go after each completed round in persistent mode.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use arena_events::WorldSnapshot;
use tokio::sync::broadcast;
use tracing::info;

/// Errors a sink may report. The match keeps running regardless.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Receives the world state once per completed round
pub trait RoundSink: Send {
    fn on_round_complete(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError>;
}

/// Discards every snapshot
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl RoundSink for NullSink {
    fn on_round_complete(&mut self, _snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Appends one JSON snapshot per line to a file
#[derive(Debug)]
pub struct JsonlSink {
    writer: BufWriter<File>,
    written: u64,
}

impl JsonlSink {
    /// Create (or truncate) the file, creating parent directories as needed
    pub fn create(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Number of snapshots written so far
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl RoundSink for JsonlSink {
    fn on_round_complete(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        let json = serde_json::to_string(snapshot)?;
        writeln!(self.writer, "{}", json)?;
        // Flushed per round so tailing readers see whole lines
        self.writer.flush()?;
        self.written += 1;
        Ok(())
    }
}

/// Fans snapshots out to any number of in-process observers.
///
/// Having no subscribers is not an error; the snapshot is simply dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: broadcast::Sender<WorldSnapshot>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.tx.subscribe()
    }
}

impl RoundSink for ChannelSink {
    fn on_round_complete(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        let _ = self.tx.send(snapshot.clone());
        Ok(())
    }
}

/// Logs a one-line summary per round
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl RoundSink for LogSink {
    fn on_round_complete(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        let standings: Vec<String> = snapshot
            .living()
            .map(|a| format!("{}:{}", a.name, a.health))
            .collect();
        info!(
            round = snapshot.round,
            living = standings.len(),
            "round complete [{}]",
            standings.join(" ")
        );
        Ok(())
    }
}

/// Delivers each snapshot to several sinks in order.
///
/// Every sink is tried even if an earlier one fails; the first error is returned.
#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn RoundSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl RoundSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl RoundSink for FanoutSink {
    fn on_round_complete(&mut self, snapshot: &WorldSnapshot) -> Result<(), SinkError> {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = sink.on_round_complete(snapshot) {
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_events::{AgentSnapshot, Position};
    use std::io::BufRead;
    use uuid::Uuid;

    fn snapshot(round: u64) -> WorldSnapshot {
        WorldSnapshot {
            match_id: Uuid::new_v4(),
            round,
            board_size: 5,
            agents: vec![AgentSnapshot {
                name: "A".to_string(),
                health: 10,
                position: Position::new(1, 2),
                alive: true,
            }],
        }
    }

    #[test]
    fn test_jsonl_sink_writes_one_line_per_round() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snapshots.jsonl");

        let mut sink = JsonlSink::create(&path).unwrap();
        sink.on_round_complete(&snapshot(1)).unwrap();
        sink.on_round_complete(&snapshot(2)).unwrap();
        assert_eq!(sink.written(), 2);

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed: WorldSnapshot = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(parsed.round, 2);
        assert_eq!(parsed.agents[0].position, Position::new(1, 2));
    }

    #[test]
    fn test_channel_sink_without_subscribers() {
        let mut sink = ChannelSink::new(4);
        assert!(sink.on_round_complete(&snapshot(1)).is_ok());
    }

    #[test]
    fn test_channel_sink_delivers() {
        let mut sink = ChannelSink::new(4);
        let mut rx = sink.subscribe();
        sink.on_round_complete(&snapshot(7)).unwrap();
        assert_eq!(rx.try_recv().unwrap().round, 7);
    }

    #[test]
    fn test_fanout_reaches_every_sink() {
        let channel = ChannelSink::new(4);
        let mut a = channel.subscribe();
        let other = ChannelSink::new(4);
        let mut b = other.subscribe();

        let mut fanout = FanoutSink::new().with(channel).with(NullSink).with(other);
        assert_eq!(fanout.len(), 3);
        fanout.on_round_complete(&snapshot(3)).unwrap();

        assert_eq!(a.try_recv().unwrap().round, 3);
        assert_eq!(b.try_recv().unwrap().round, 3);
    }
}
