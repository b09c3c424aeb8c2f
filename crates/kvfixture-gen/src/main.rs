mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, GenerateArgs};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Cli::parse().into_generate();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    generate(&args)
}

fn generate(args: &GenerateArgs) -> Result<()> {
    let config = args.to_config();
    tracing::debug!(?config, "fixture configuration");

    kvfixture_onnx::generate(&config, &args.out)
        .with_context(|| format!("failed to generate {}", args.out.display()))?;
    Ok(())
}
