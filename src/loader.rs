use crate::error::CfResult;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Reads a UTF-8 word list, one word per line. Trailing `\r` is removed and
/// empty lines are skipped; spaces inside a line are kept since the blank is
/// an alphabet symbol.
pub fn load_word_list<P: AsRef<Path>>(path: P) -> CfResult<Vec<String>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);

    let mut words = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if !line.is_empty() {
            words.push(line.to_string());
        }
    }

    debug!("Read {} words from '{}'", words.len(), path.display());
    Ok(words)
}
