use crate::mapping::Mapping;
use crate::permutation::{next_permutation, ordinal_to_permutation, Permutation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockState {
    /// Allocated but not owned: abandoned by a worker or reloaded after restart.
    Pending,
    Assigned,
    Completed,
}

/// One entry of the generator's sliding window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub index: u64,
    pub state: BlockState,
    pub owner: Option<usize>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl BlockRecord {
    pub fn assigned(index: u64, owner: usize) -> Self {
        Self {
            index,
            state: BlockState::Assigned,
            owner: Some(owner),
            assigned_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    pub fn release(&mut self) {
        self.state = BlockState::Pending;
        self.owner = None;
    }
}

/// A claimed unit of work: the half-open ordinal range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub index: u64,
    pub start: u64,
    pub end: u64,
}

impl Block {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// `(ordinal, mapping)` pairs in ascending ordinal order, produced lazily.
    pub fn mappings(&self) -> BlockMappings {
        BlockMappings {
            next: self.start,
            end: self.end,
            current: None,
        }
    }

    /// Materializes the whole block. Memory grows with the block size.
    pub fn to_vec(&self) -> Vec<Mapping> {
        self.mappings().map(|(_, m)| m).collect()
    }
}

pub struct BlockMappings {
    next: u64,
    end: u64,
    current: Option<Permutation>,
}

impl Iterator for BlockMappings {
    type Item = (u64, Mapping);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }

        let perm = match self.current.as_mut() {
            Some(p) => {
                // successor of the previous ordinal
                next_permutation(p);
                *p
            }
            None => {
                let p = ordinal_to_permutation(self.next);
                self.current = Some(p);
                p
            }
        };

        let ordinal = self.next;
        self.next += 1;
        Some((ordinal, Mapping::from_permutation(&perm)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.end.saturating_sub(self.next) as usize;
        (n, Some(n))
    }
}
