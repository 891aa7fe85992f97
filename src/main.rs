use anyhow::Context;
use clap::{CommandFactory, Parser};
use file_squeeze::cli::Args;
use file_squeeze::{
    CompressorRegistry, Config, Dispatcher, ImageCompressor, Logger, PdfCompressor,
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install the log subscriber")?;

    if args.paths.is_empty() {
        Args::command().print_help()?;
        println!();
        return Ok(());
    }

    let logger = Logger::new(args.verbose);

    let mut config = Config {
        replace_original: args.replace,
        verbose: args.verbose,
        show_progress: !args.verbose,
        ..Config::default()
    };
    if let Some(requested) = args.workers {
        if let Some(clamp) = config.set_workers(requested) {
            logger.warn(clamp.to_string());
        }
    }

    let mut registry = CompressorRegistry::new();
    registry.register(PdfCompressor::new(logger.named("pdf")));
    registry.register(ImageCompressor::new(logger.named("image")));

    let dispatcher = Dispatcher::new(registry, config, logger.named("dispatch"));
    let summary = dispatcher
        .run(&args.paths)
        .context("Compression run failed")?;

    println!("{}", summary);
    Ok(())
}
