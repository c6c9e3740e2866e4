use super::ConfigSource;
use crate::reports;
use cipherforge::mapping::Mapping;
use cipherforge::permutation::{ordinal_to_permutation, TOTAL_PERMUTATIONS};
use cipherforge::{CfResult, CipherForgeError};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Ordinal in the permutation space
    #[arg(short, long)]
    pub ordinal: u64,
}

pub fn run(args: ShowArgs) -> CfResult<()> {
    if args.ordinal >= TOTAL_PERMUTATIONS {
        return Err(CipherForgeError::Validation(format!(
            "Ordinal {} is outside the search space (< {})",
            args.ordinal, TOTAL_PERMUTATIONS
        )));
    }

    let config = args.source.resolve()?;
    let source = config.source()?;
    let target = config.target()?;

    let perm = ordinal_to_permutation(args.ordinal);
    let mapping = Mapping::from_permutation(&perm);
    reports::print_mapping(args.ordinal, &perm, &mapping, &source, &target);
    Ok(())
}
