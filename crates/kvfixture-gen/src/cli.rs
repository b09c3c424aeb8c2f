use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use kvfixture_core::{OpsetId, VersionPolicy};
use kvfixture_onnx::{FixtureConfig, FIXTURE_FILE_NAME, IR_VERSION, NUM_LAYERS, OPSET_VERSION};

#[derive(Parser, Debug)]
#[command(
    name = "kvfixture",
    version,
    about = "Generate the past/present KV-cache ONNX test fixture",
    args_conflicts_with_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub generate: GenerateArgs,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Write the fixture model (the default when no subcommand is given)
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Output path of the ONNX file
    #[arg(long, default_value = FIXTURE_FILE_NAME)]
    pub out: PathBuf,

    /// Number of transformer layers with a key/value cache pair
    #[arg(long, default_value_t = NUM_LAYERS)]
    pub layers: usize,

    /// ONNX IR version stamped on the model
    #[arg(long, default_value_t = IR_VERSION)]
    pub ir_version: i64,

    /// Default-domain operator set version
    #[arg(long, default_value_t = OPSET_VERSION)]
    pub opset: i64,

    /// Emit the IR/opset pair even if it is not a released combination
    #[arg(long)]
    pub skip_version_check: bool,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Cli {
    /// Arguments of the generate run, whether or not it was named.
    pub fn into_generate(self) -> GenerateArgs {
        match self.command {
            Some(Command::Generate(args)) => args,
            None => self.generate,
        }
    }
}

impl GenerateArgs {
    pub fn to_config(&self) -> FixtureConfig {
        FixtureConfig {
            layers: self.layers,
            ir_version: self.ir_version,
            opset: OpsetId::onnx(self.opset),
            version_policy: if self.skip_version_check {
                VersionPolicy::Unchecked
            } else {
                VersionPolicy::Strict
            },
            ..FixtureConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_reproduces_fixed_fixture() {
        let args = Cli::try_parse_from(["kvfixture"]).unwrap().into_generate();
        assert_eq!(args.out, PathBuf::from("with_past_kv.onnx"));
        assert_eq!(args.log, "info");
        assert_eq!(args.to_config(), FixtureConfig::default());
    }

    #[test]
    fn generate_subcommand_accepts_overrides() {
        let args = Cli::try_parse_from([
            "kvfixture",
            "generate",
            "--out",
            "fixtures/kv.onnx",
            "--layers",
            "3",
            "--ir-version",
            "99",
            "--skip-version-check",
        ])
        .unwrap()
        .into_generate();

        let config = args.to_config();
        assert_eq!(args.out, PathBuf::from("fixtures/kv.onnx"));
        assert_eq!(config.layers, 3);
        assert_eq!(config.ir_version, 99);
        assert_eq!(config.opset, OpsetId::onnx(21));
        assert_eq!(config.version_policy, VersionPolicy::Unchecked);
    }

    #[test]
    fn top_level_flags_work_without_subcommand() {
        let args = Cli::try_parse_from(["kvfixture", "--opset", "22"])
            .unwrap()
            .into_generate();
        assert_eq!(args.to_config().opset.version, 22);
    }
}
