//! Blackbox recorder: a bounded, append-only attitude log.
//!
//! Records are appended at a decimated rate while flying and streamed out
//! over the link on request. Once full, new records are dropped and counted;
//! the earliest part of the flight is what survives.

use crate::types::TelemetryRecord;
use quad_proto::{Serialize, SerializeError, TelemetryLine};

/// Fixed-capacity telemetry log holding at most `N` records.
#[derive(Debug, Clone, Default)]
pub struct TelemetryRecorder<const N: usize> {
    records: heapless::Vec<TelemetryRecord, N>,
    dropped: u32,
}

impl<const N: usize> TelemetryRecorder<N> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: heapless::Vec::new(),
            dropped: 0,
        }
    }

    /// Append a record.
    ///
    /// Returns `false` and counts the record as dropped once the log is full.
    pub fn record(&mut self, record: TelemetryRecord) -> bool {
        match self.records.push(record) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    /// All records, oldest first. Does not consume anything.
    pub fn drain(&self) -> impl Iterator<Item = &TelemetryRecord> + '_ {
        self.records.iter()
    }

    /// Forget every record and reset the dropped counter.
    pub fn clear(&mut self) {
        self.records.clear();
        self.dropped = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.records.is_full()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Records rejected because the log was full.
    #[must_use]
    pub const fn dropped(&self) -> u32 {
        self.dropped
    }

    /// Stream every record as a dump line, oldest first.
    ///
    /// Returns the number of lines written.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError::WriteError`] if the writer fails. Records
    /// already written stay written; the log itself is not modified.
    pub fn write_to<W: embedded_io::Write>(&self, writer: &mut W) -> Result<usize, SerializeError> {
        for record in &self.records {
            TelemetryLine::from(*record).serialize_io(writer)?;
        }
        writer.flush().map_err(|_| SerializeError::WriteError)?;
        Ok(self.records.len())
    }
}
