//! Action Logger
//!
//! Append-only JSONL logging of every committed (or refused) action,
//! one record per line.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use mossgard_world::{Action, ActorId};

/// One logged action with the actor who performed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub tick: u64,
    pub actor: ActorId,
    pub name: String,
    pub kind: String,
    #[serde(flatten)]
    pub action: Action,
}

/// Writes action records to a JSONL file.
pub struct ActionLogger {
    writer: Option<BufWriter<File>>,
    record_count: u64,
}

impl ActionLogger {
    /// Create a logger writing to `path`, truncating any previous log.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            writer: Some(BufWriter::new(file)),
            record_count: 0,
        })
    }

    /// Create a logger that discards records (for testing).
    pub fn null() -> Self {
        Self {
            writer: None,
            record_count: 0,
        }
    }

    pub fn record_count(&self) -> u64 {
        self.record_count
    }

    /// Log one record.
    pub fn log(&mut self, record: &ActionRecord) -> std::io::Result<()> {
        self.record_count += 1;
        if let Some(writer) = &mut self.writer {
            let json = serde_json::to_string(record)?;
            writeln!(writer, "{json}")?;
        }
        Ok(())
    }

    /// Flush the buffer to disk.
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for ActionLogger {
    fn drop(&mut self) {
        if let Err(error) = self.flush() {
            eprintln!("Warning: failed to flush action log: {error}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mossgard_world::Direction;
    use std::io::BufRead;

    fn record() -> ActionRecord {
        ActionRecord {
            tick: 3,
            actor: ActorId::random(),
            name: "goblin 1".into(),
            kind: "goblin".into(),
            action: Action::Move {
                time: 3,
                success: true,
                previous_position: None,
                direction: Direction::Left,
            },
        }
    }

    #[test]
    fn null_logger_counts_without_writing() {
        let mut logger = ActionLogger::null();
        logger.log(&record()).unwrap();
        logger.log(&record()).unwrap();
        assert_eq!(logger.record_count(), 2);
    }

    #[test]
    fn records_round_trip_through_jsonl() {
        let path = std::env::temp_dir().join("mossgard_logger_test.jsonl");
        let expected = record();
        {
            let mut logger = ActionLogger::new(&path).unwrap();
            logger.log(&expected).unwrap();
        }

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|line| line.unwrap())
            .collect();
        assert_eq!(lines.len(), 1);
        let parsed: ActionRecord = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed, expected);

        std::fs::remove_file(&path).ok();
    }
}
