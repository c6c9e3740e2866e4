use super::{open_saved_generator, ConfigSource};
use crate::reports;
use cipherforge::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

pub fn run(args: StatusArgs) -> CfResult<()> {
    let config = args.source.resolve()?;

    let Some(generator) = open_saved_generator(&config)? else {
        println!(
            "⚠️  No saved state at '{}'. A run would start from ordinal 0.",
            config.state_path.display()
        );
        return Ok(());
    };

    reports::print_generator_report(
        &generator.state(),
        &generator.window(),
        generator.progress_percentage(),
        generator.remaining_mappings(),
    );
    Ok(())
}
