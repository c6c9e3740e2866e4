// ===== cipherforge/src/generator/mod.rs =====
//! Resumable, concurrent enumeration of the permutation space.
//!
//! The space is cut into blocks of `block_size` consecutive ordinals. Every
//! block handed out stays in a sliding window until it and all of its
//! predecessors are completed. After each mutation the counters and the
//! window are written to the state file, so a restarted process continues
//! from the first unfinished block and re-offers anything that was in flight.

pub mod block;
pub mod persist;

pub use self::block::{Block, BlockMappings, BlockRecord, BlockState};

use self::persist::{load_from_disk, save_to_disk, PersistedGenerator};
use crate::error::{CfResult, CipherForgeError};
use crate::permutation::TOTAL_PERMUTATIONS;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

pub const DEFAULT_BLOCK_SIZE: u64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub block_size: u64,
    /// `None` keeps the generator in memory only.
    pub state_path: Option<PathBuf>,
    /// Upper bound of the ordinal space. Lower it to search a prefix only.
    pub space_size: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            state_path: None,
            space_size: TOTAL_PERMUTATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorState {
    pub block_size: u64,
    /// Ordinal space the block indices refer to.
    pub space_size: u64,
    pub next_block_index: u64,
    pub oldest_block_index: u64,
    pub blocks_generated: u64,
    pub blocks_completed: u64,
    /// No further blocks can be allocated.
    pub exhausted: bool,
}

impl GeneratorState {
    fn fresh(block_size: u64, space_size: u64) -> Self {
        Self {
            block_size,
            space_size,
            next_block_index: 0,
            oldest_block_index: 0,
            blocks_generated: 0,
            blocks_completed: 0,
            exhausted: false,
        }
    }
}

struct Inner {
    state: GeneratorState,
    window: VecDeque<BlockRecord>,
}

pub struct BlockGenerator {
    config: GeneratorConfig,
    inner: Mutex<Inner>,
}

impl BlockGenerator {
    /// Opens a generator, resuming from `state_path` when the file exists.
    pub fn open(config: GeneratorConfig) -> CfResult<Self> {
        if config.block_size == 0 {
            return Err(CipherForgeError::Config(
                "Block size must be greater than zero".into(),
            ));
        }
        if config.space_size == 0 || config.space_size > TOTAL_PERMUTATIONS {
            return Err(CipherForgeError::Config(format!(
                "Search space must be within 1..={}",
                TOTAL_PERMUTATIONS
            )));
        }

        let inner = match config.state_path.as_deref() {
            Some(path) if path.exists() => {
                let snapshot = load_from_disk(path)?;
                if snapshot.state.block_size != config.block_size {
                    return Err(CipherForgeError::Config(format!(
                        "State file '{}' was written with block size {}, but {} is configured",
                        path.display(),
                        snapshot.state.block_size,
                        config.block_size
                    )));
                }
                if snapshot.state.space_size != config.space_size {
                    return Err(CipherForgeError::Config(format!(
                        "State file '{}' was written for a search space of {}, but {} is configured",
                        path.display(),
                        snapshot.state.space_size,
                        config.space_size
                    )));
                }
                info!(
                    "📂 Resuming generator: next block {}, {} completed, {} in window",
                    snapshot.state.next_block_index,
                    snapshot.state.blocks_completed,
                    snapshot.blocks.len()
                );
                Inner {
                    state: snapshot.state,
                    window: snapshot.blocks.into(),
                }
            }
            _ => Inner {
                state: GeneratorState::fresh(config.block_size, config.space_size),
                window: VecDeque::new(),
            },
        };

        Ok(Self {
            config,
            inner: Mutex::new(inner),
        })
    }

    /// In-memory generator with default space.
    pub fn in_memory(block_size: u64) -> CfResult<Self> {
        Self::open(GeneratorConfig {
            block_size,
            ..Default::default()
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // a panicking holder cannot leave the counters half-updated
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn block_size(&self) -> u64 {
        self.config.block_size
    }

    pub fn space_size(&self) -> u64 {
        self.config.space_size
    }

    /// Claims a block for `worker`.
    ///
    /// If the worker still owns a block, that block is treated as abandoned:
    /// it goes back to pending and the worker receives a different one.
    /// Pending blocks in the window are handed out before new ones are
    /// allocated. Returns `None` once nothing is left to hand out.
    pub fn get_next_block(&self, worker: usize) -> Option<Block> {
        let mut inner = self.lock();

        let abandoned = inner
            .window
            .iter_mut()
            .find(|b| b.state == BlockState::Assigned && b.owner == Some(worker))
            .map(|b| {
                b.release();
                b.index
            });
        if let Some(index) = abandoned {
            warn!(
                "Worker {} requested a new block while holding block {}; releasing it",
                worker, index
            );
        }

        let reclaimed = inner
            .window
            .iter_mut()
            .find(|b| b.state == BlockState::Pending && Some(b.index) != abandoned)
            .map(|b| {
                b.state = BlockState::Assigned;
                b.owner = Some(worker);
                b.assigned_at = Some(Utc::now());
                b.index
            });

        let index = match reclaimed {
            Some(index) => {
                debug!("Re-offering block {} to worker {}", index, worker);
                Some(index)
            }
            None => self.allocate(&mut inner, worker),
        };

        self.persist_quietly(&inner);
        index.map(|i| self.block_bounds(i))
    }

    fn allocate(&self, inner: &mut Inner, worker: usize) -> Option<u64> {
        if inner.state.exhausted {
            return None;
        }

        let index = inner.state.next_block_index;
        let start = index.checked_mul(self.config.block_size);
        if start.map_or(true, |s| s >= self.config.space_size) {
            inner.state.exhausted = true;
            return None;
        }

        inner.window.push_back(BlockRecord::assigned(index, worker));
        inner.state.next_block_index += 1;
        inner.state.blocks_generated += 1;

        let next_start = inner
            .state
            .next_block_index
            .checked_mul(self.config.block_size);
        if next_start.map_or(true, |s| s >= self.config.space_size) {
            inner.state.exhausted = true;
            info!("🏁 Last block {} allocated", index);
        }

        debug!("Allocated block {} to worker {}", index, worker);
        Some(index)
    }

    fn block_bounds(&self, index: u64) -> Block {
        let start = index
            .saturating_mul(self.config.block_size)
            .min(self.config.space_size);
        let end = start
            .saturating_add(self.config.block_size)
            .min(self.config.space_size);
        Block { index, start, end }
    }

    /// Marks the worker's block completed and evicts the completed prefix of
    /// the window. Returns `false` if the worker held no block.
    pub fn complete_block(&self, worker: usize) -> bool {
        let mut inner = self.lock();

        let Some(record) = inner
            .window
            .iter_mut()
            .find(|b| b.state == BlockState::Assigned && b.owner == Some(worker))
        else {
            return false;
        };
        record.state = BlockState::Completed;
        record.completed_at = Some(Utc::now());
        let index = record.index;
        inner.state.blocks_completed += 1;

        // only an unbroken completed prefix can leave the window
        while inner
            .window
            .front()
            .is_some_and(|b| b.state == BlockState::Completed)
        {
            inner.window.pop_front();
            inner.state.oldest_block_index += 1;
        }

        debug!("Worker {} completed block {}", worker, index);
        self.persist_quietly(&inner);
        true
    }

    /// Gives the worker's block back without completing it.
    pub fn release_block(&self, worker: usize) -> bool {
        let mut inner = self.lock();
        let released = inner
            .window
            .iter_mut()
            .find(|b| b.state == BlockState::Assigned && b.owner == Some(worker))
            .map(|b| {
                b.release();
                b.index
            });

        match released {
            Some(index) => {
                debug!("Worker {} released block {}", worker, index);
                self.persist_quietly(&inner);
                true
            }
            None => false,
        }
    }

    /// True once allocation is exhausted and every block has left the window.
    pub fn is_generation_complete(&self) -> bool {
        let inner = self.lock();
        inner.state.exhausted && inner.window.is_empty()
    }

    pub fn state(&self) -> GeneratorState {
        self.lock().state
    }

    pub fn window(&self) -> Vec<BlockRecord> {
        self.lock().window.iter().cloned().collect()
    }

    fn completed_mappings(&self, state: &GeneratorState) -> u64 {
        state
            .blocks_completed
            .saturating_mul(self.config.block_size)
            .min(self.config.space_size)
    }

    pub fn progress_percentage(&self) -> f64 {
        let state = self.state();
        self.completed_mappings(&state) as f64 / self.config.space_size as f64 * 100.0
    }

    pub fn remaining_mappings(&self) -> u64 {
        let state = self.state();
        self.config.space_size - self.completed_mappings(&state)
    }

    /// Forces a write of the current state. `false` on failure.
    pub fn save_state(&self) -> bool {
        let inner = self.lock();
        self.persist_quietly(&inner)
    }

    /// Starts over from ordinal 0 and removes the state file.
    pub fn reset(&self) -> CfResult<()> {
        let mut inner = self.lock();
        inner.state = GeneratorState::fresh(self.config.block_size, self.config.space_size);
        inner.window.clear();
        if let Some(path) = self.config.state_path.as_deref() {
            if path.exists() {
                fs::remove_file(path)?;
            }
        }
        info!("🔄 Generator reset");
        Ok(())
    }

    fn persist_quietly(&self, inner: &Inner) -> bool {
        let Some(path) = self.config.state_path.as_deref() else {
            return true;
        };

        let snapshot = PersistedGenerator {
            state: inner.state,
            blocks: inner.window.iter().cloned().collect(),
        };
        match save_to_disk(&snapshot, path) {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    "Failed to save generator state to '{}': {}. Continuing in memory.",
                    path.display(),
                    e
                );
                false
            }
        }
    }
}
