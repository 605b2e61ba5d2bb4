//! Per-epoch collection of step records

use super::AccumulatorError;
use crate::fusion::FusionMode;
use crate::train::StepRecord;

/// Append-only record store for one epoch
///
/// Lifecycle: `push`* → `drain` → `reset` → `push`* → ... Draining twice or
/// pushing into a drained epoch is an error, so no record is ever counted in
/// two epochs or silently dropped.
#[derive(Debug, Default)]
pub struct EpochAccumulator {
    records: Vec<StepRecord>,
    mode: Option<FusionMode>,
    drained: bool,
}

impl EpochAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one step's record.
    ///
    /// Every record of an epoch must come from the same fusion mode.
    pub fn push(&mut self, record: StepRecord) -> Result<(), AccumulatorError> {
        if self.drained {
            return Err(AccumulatorError::AlreadyDrained);
        }
        match self.mode {
            Some(expected) if expected != record.mode => {
                return Err(AccumulatorError::MixedFusionModes { expected, found: record.mode });
            }
            Some(_) => {}
            None => self.mode = Some(record.mode),
        }
        self.records.push(record);
        Ok(())
    }

    /// Take every record of the epoch, leaving the accumulator drained
    pub fn drain(&mut self) -> Result<Vec<StepRecord>, AccumulatorError> {
        if self.drained {
            return Err(AccumulatorError::AlreadyDrained);
        }
        self.drained = true;
        Ok(std::mem::take(&mut self.records))
    }

    /// Start a new epoch
    pub fn reset(&mut self) {
        self.records.clear();
        self.mode = None;
        self.drained = false;
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Number of steps held
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of samples held across all steps
    pub fn num_samples(&self) -> usize {
        self.records.iter().map(|r| r.batch_size).sum()
    }
}
