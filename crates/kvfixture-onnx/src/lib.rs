pub mod builder;
pub mod fixture;
pub mod lower;
pub mod writer;

pub use builder::*;
pub use fixture::*;
pub use lower::*;
pub use writer::*;

use std::path::Path;

use anyhow::Result;

/// Builds the KV fixture described by `config` and writes it to `path`.
pub fn generate(config: &FixtureConfig, path: impl AsRef<Path>) -> Result<WrittenModel> {
    let model = build_kv_fixture(config)?;
    save_model(&model, path)
}
