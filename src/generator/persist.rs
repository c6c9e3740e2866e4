use super::block::{BlockRecord, BlockState};
use super::GeneratorState;
use crate::error::CfResult;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// On-disk form of the generator: counters plus the whole block window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedGenerator {
    pub state: GeneratorState,
    pub blocks: Vec<BlockRecord>,
}

/// Writes to a temp file next to `path`, then renames over it, so a crash
/// mid-write leaves the previous state intact.
pub fn save_to_disk(snapshot: &PersistedGenerator, path: &Path) -> CfResult<()> {
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush()?;
    }
    temp_file.persist(path)?;
    Ok(())
}

/// Loads a saved generator. Blocks that were assigned to workers of the
/// previous process are handed back as pending.
pub fn load_from_disk(path: &Path) -> CfResult<PersistedGenerator> {
    let file = File::open(path)?;
    let mut snapshot: PersistedGenerator = serde_json::from_reader(BufReader::new(file))?;

    for block in &mut snapshot.blocks {
        if block.state == BlockState::Assigned {
            block.release();
        }
    }
    Ok(snapshot)
}
