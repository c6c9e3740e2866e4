pub mod reset;
pub mod results;
pub mod run;
pub mod show;
pub mod status;

use cipherforge::config::DecoderConfig;
use cipherforge::generator::persist::load_from_disk;
use cipherforge::generator::{BlockGenerator, GeneratorConfig};
use cipherforge::CfResult;
use clap::Args;
use std::path::PathBuf;

/// Decoder settings from flags, or from a JSON file when `--config` is given.
#[derive(Args, Debug, Clone)]
pub struct ConfigSource {
    #[command(flatten)]
    pub config: DecoderConfig,

    /// JSON config file; replaces the flag values when present
    #[arg(long = "config")]
    pub config_file: Option<PathBuf>,
}

impl ConfigSource {
    pub fn resolve(&self) -> CfResult<DecoderConfig> {
        let config = match &self.config_file {
            Some(path) => {
                println!("📂 Loading config: {}", path.display());
                DecoderConfig::load_from_file(path)?
            }
            None => self.config.clone(),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Opens the saved generator with the block size and search space it was
/// written with.
/// `None` when there is no state file.
pub fn open_saved_generator(config: &DecoderConfig) -> CfResult<Option<BlockGenerator>> {
    if !config.state_path.exists() {
        return Ok(None);
    }
    let saved = load_from_disk(&config.state_path)?;
    let generator = BlockGenerator::open(GeneratorConfig {
        block_size: saved.state.block_size,
        state_path: Some(config.state_path.clone()),
        space_size: saved.state.space_size,
    })?;
    Ok(Some(generator))
}
