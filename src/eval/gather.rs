//! Cross-worker collection of epoch records
//!
//! Epoch metrics (EER above all) need every sample of the epoch, not a
//! per-worker average. [`Gather::all_gather`] is the epoch-end barrier: each
//! worker contributes its local records and receives every worker's records
//! in rank order.

use crate::train::StepRecord;
use crate::{Error, Result};
use std::sync::{Arc, Barrier, Mutex, MutexGuard, PoisonError};

/// How a value is synchronised across workers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossSync {
    /// Worker-local value; used for online per-step logging
    Local,
    /// Gathered from every worker before use; used for epoch metrics
    Gathered,
}

/// Epoch-end all-gather over step records
pub trait Gather {
    /// Contribute this worker's epoch outcome and return every worker's
    /// records, ordered by rank.
    ///
    /// A worker whose epoch already failed still calls this with its error,
    /// so its peers are released with an error instead of waiting for it.
    fn exchange(&self, local: Result<Vec<StepRecord>>) -> Result<Vec<StepRecord>>;

    /// Contribute `local` and return every worker's records, ordered by rank
    fn all_gather(&self, local: Vec<StepRecord>) -> Result<Vec<StepRecord>> {
        self.exchange(Ok(local))
    }

    fn rank(&self) -> usize {
        0
    }

    fn world_size(&self) -> usize {
        1
    }
}

/// Single-worker gather: the local records are the whole epoch
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalGather;

impl Gather for LocalGather {
    fn exchange(&self, local: Result<Vec<StepRecord>>) -> Result<Vec<StepRecord>> {
        local
    }
}

/// One rank's contribution: its records, or the message of its failure
type Slot = Option<std::result::Result<Vec<StepRecord>, String>>;

struct GroupState {
    barrier: Barrier,
    slots: Mutex<Vec<Slot>>,
}

/// In-process worker group synchronised with a [`Barrier`]
///
/// Each handle is moved into one worker thread; every handle must call
/// [`Gather::exchange`] once per epoch, failed or not, or the others block.
/// If any rank contributes an error, every rank returns an error.
#[derive(Clone)]
pub struct ThreadGroup {
    state: Arc<GroupState>,
    rank: usize,
    world_size: usize,
}

impl ThreadGroup {
    /// One handle per rank for a group of `world_size` workers
    pub fn new(world_size: usize) -> Vec<ThreadGroup> {
        let world_size = world_size.max(1);
        let state = Arc::new(GroupState {
            barrier: Barrier::new(world_size),
            slots: Mutex::new(vec![None; world_size]),
        });
        (0..world_size)
            .map(|rank| ThreadGroup { state: Arc::clone(&state), rank, world_size })
            .collect()
    }

    // Critical sections never panic, so a poisoned lock still holds
    // consistent slots.
    fn lock_slots(&self) -> MutexGuard<'_, Vec<Slot>> {
        self.state.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn collect(slots: &[Slot]) -> Result<Vec<StepRecord>> {
    let mut all = Vec::new();
    for (rank, slot) in slots.iter().enumerate() {
        match slot {
            Some(Ok(records)) => all.extend(records.iter().cloned()),
            Some(Err(reason)) => {
                return Err(Error::Gather(format!("rank {rank} failed: {reason}")));
            }
            None => return Err(Error::Gather(format!("rank {rank} contributed nothing"))),
        }
    }
    Ok(all)
}

impl std::fmt::Debug for ThreadGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThreadGroup")
            .field("rank", &self.rank)
            .field("world_size", &self.world_size)
            .finish()
    }
}

impl Gather for ThreadGroup {
    fn exchange(&self, local: Result<Vec<StepRecord>>) -> Result<Vec<StepRecord>> {
        let (contribution, own_error) = match local {
            Ok(records) => (Ok(records), None),
            Err(e) => (Err(e.to_string()), Some(e)),
        };
        self.lock_slots()[self.rank] = Some(contribution);

        // every slot written
        self.state.barrier.wait();
        let gathered = collect(&self.lock_slots());
        // every slot read; the next epoch may overwrite
        self.state.barrier.wait();

        if let Some(e) = own_error {
            return Err(e);
        }
        let gathered = gathered?;
        tracing::trace!(rank = self.rank, records = gathered.len(), "gathered epoch records");
        Ok(gathered)
    }

    fn rank(&self) -> usize {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.world_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::FusionMode;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn record(tag: f32) -> StepRecord {
        StepRecord {
            loss: tag,
            batch_size: 1,
            predictions: vec![1],
            targets: vec![1],
            scores: vec![tag],
            mode: FusionMode::Learned,
        }
    }

    #[test]
    fn test_local_gather_is_identity() {
        let records = vec![record(1.0), record(2.0)];
        assert_eq!(LocalGather.all_gather(records.clone()).expect("local"), records);
        assert_eq!(LocalGather.world_size(), 1);
    }

    #[test]
    fn test_thread_group_gathers_in_rank_order() {
        let handles: Vec<_> = ThreadGroup::new(3)
            .into_iter()
            .map(|group| {
                thread::spawn(move || {
                    let rank = group.rank() as f32;
                    let first = group.all_gather(vec![record(rank)]).expect("gather");
                    let second = group.all_gather(vec![record(rank + 10.0)]).expect("gather");
                    (first, second)
                })
            })
            .collect();

        for handle in handles {
            let (first, second) = handle.join().expect("worker");
            let losses: Vec<f32> = first.iter().map(|r| r.loss).collect();
            assert_eq!(losses, vec![0.0, 1.0, 2.0]);
            let losses: Vec<f32> = second.iter().map(|r| r.loss).collect();
            assert_eq!(losses, vec![10.0, 11.0, 12.0]);
        }
    }

    #[test]
    fn test_failed_rank_releases_peers_with_error() {
        let (tx, rx) = mpsc::channel();
        for group in ThreadGroup::new(3) {
            let tx = tx.clone();
            thread::spawn(move || {
                let local = if group.rank() == 1 {
                    Err(Error::Gather("local epoch failed".into()))
                } else {
                    Ok(vec![record(group.rank() as f32)])
                };
                let outcome = group.exchange(local);
                tx.send((group.rank(), outcome)).expect("send");
            });
        }
        drop(tx);

        let mut outcomes = Vec::new();
        for _ in 0..3 {
            outcomes.push(rx.recv_timeout(Duration::from_secs(10)).expect("no rank may block"));
        }
        for (rank, outcome) in outcomes {
            let err = outcome.unwrap_err().to_string();
            if rank == 1 {
                assert!(err.contains("local epoch failed"));
            } else {
                assert!(err.contains("rank 1 failed"), "rank {rank}: {err}");
            }
        }
    }

    #[test]
    fn test_group_recovers_after_failed_epoch() {
        let handles: Vec<_> = ThreadGroup::new(2)
            .into_iter()
            .map(|group| {
                thread::spawn(move || {
                    let rank = group.rank() as f32;
                    let failed = if group.rank() == 0 {
                        group.exchange(Err(Error::Gather("bad epoch".into())))
                    } else {
                        group.all_gather(vec![record(rank)])
                    };
                    assert!(failed.is_err());
                    group.all_gather(vec![record(rank + 10.0)]).expect("next epoch")
                })
            })
            .collect();

        for handle in handles {
            let losses: Vec<f32> = handle.join().expect("worker").iter().map(|r| r.loss).collect();
            assert_eq!(losses, vec![10.0, 11.0]);
        }
    }
}
