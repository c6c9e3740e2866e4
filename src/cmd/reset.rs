use super::{open_saved_generator, ConfigSource};
use cipherforge::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ResetArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

pub fn run(args: ResetArgs) -> CfResult<()> {
    let config = args.source.resolve()?;

    match open_saved_generator(&config)? {
        Some(generator) => {
            generator.reset()?;
            println!("🔄 Removed '{}'", config.state_path.display());
        }
        None => println!("Nothing to reset at '{}'", config.state_path.display()),
    }
    Ok(())
}
