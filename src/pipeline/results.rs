use crate::error::CfResult;
use chrono::{DateTime, Local};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const RULE: &str =
    "================================================================================";

#[derive(Debug, Clone)]
pub struct HighScoreEntry {
    pub mapping_id: u64,
    pub score: f64,
    pub matched_words: usize,
    pub total_words: usize,
    pub timestamp: DateTime<Local>,
    pub visualization: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HighScoresSummary {
    pub total_results: usize,
    pub highest_score: f64,
    pub average_score: f64,
    pub total_words_validated: usize,
}

/// Append-only, human-readable log of high-scoring mappings.
///
/// Appends are serialized by a single lock. High scores are rare, so no
/// batching is done.
#[derive(Debug)]
pub struct ResultsLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ResultsLog {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, entry: &HighScoreEntry) -> CfResult<()> {
        let record = format!(
            "{rule}\nDate/Time: {}\nMapping ID: {}\nScore: {:.2}% ({}/{} matches)\n{rule}\n{}\n\n",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.mapping_id,
            entry.score,
            entry.matched_words,
            entry.total_words,
            entry.visualization,
            rule = RULE
        );

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(record.as_bytes())?;
        Ok(())
    }

    /// Reads the log back. A missing file is an empty summary.
    pub fn summary(&self) -> CfResult<HighScoresSummary> {
        let content = {
            let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
            match fs::read_to_string(&self.path) {
                Ok(c) => c,
                Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
                Err(e) => return Err(e.into()),
            }
        };

        let mut summary = HighScoresSummary::default();
        let mut score_sum = 0.0;
        for (score, total) in content.lines().filter_map(parse_score_line) {
            summary.total_results += 1;
            summary.highest_score = summary.highest_score.max(score);
            summary.total_words_validated += total;
            score_sum += score;
        }
        if summary.total_results > 0 {
            summary.average_score = score_sum / summary.total_results as f64;
        }
        Ok(summary)
    }

    pub fn clear(&self) -> CfResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        fs::write(&self.path, "")?;
        Ok(())
    }
}

/// `Score: 83.51% (1/1 matches)` -> `(83.51, 1)`
fn parse_score_line(line: &str) -> Option<(f64, usize)> {
    let rest = line.strip_prefix("Score: ")?;
    let (score, rest) = rest.split_once("% (")?;
    let (_, rest) = rest.split_once('/')?;
    let (total, _) = rest.split_once(' ')?;
    Some((score.trim().parse().ok()?, total.parse().ok()?))
}
