use super::ConfigSource;
use crate::reports;
use cipherforge::pipeline::Decoder;
use cipherforge::CfResult;
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: ConfigSource,
}

pub fn run(args: RunArgs) -> CfResult<()> {
    let config = args.source.resolve()?;

    println!("\n🚀 Initializing CipherForge...");
    let mut decoder = Decoder::initialize(config)?;
    println!(
        "   {} corpus words | backend: {} [{}]",
        decoder.corpus_len(),
        decoder.engine().provider_name(),
        decoder.engine().device_description()
    );

    decoder.start()?;
    let snapshot = decoder.wait_for_completion();

    reports::print_run_report(&snapshot);

    let generator = decoder.generator();
    reports::print_generator_report(
        &generator.state(),
        &generator.window(),
        generator.progress_percentage(),
        generator.remaining_mappings(),
    );

    if generator.is_generation_complete() {
        println!("\n🏁 Search space exhausted.");
    }
    Ok(())
}
