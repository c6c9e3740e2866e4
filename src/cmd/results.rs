use super::ConfigSource;
use crate::reports;
use cipherforge::pipeline::ResultsLog;
use cipherforge::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ResultsArgs {
    #[command(flatten)]
    pub source: ConfigSource,

    /// Empty the log after printing the summary
    #[arg(long, default_value_t = false)]
    pub clear: bool,
}

pub fn run(args: ResultsArgs) -> CfResult<()> {
    let config = args.source.resolve()?;
    let log = ResultsLog::new(config.results_path.clone());

    let summary = log.summary()?;
    reports::print_results_summary(&log.path().display().to_string(), &summary);

    if args.clear {
        log.clear()?;
        println!("🧹 Cleared '{}'", log.path().display());
    }
    Ok(())
}
