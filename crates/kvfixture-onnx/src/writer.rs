use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytes::{Bytes, BytesMut};
use kvfixture_core::ModelSpec;
use prost::Message;
use tempfile::{Builder, NamedTempFile};
use tracing::info;

use crate::to_model_proto;

#[derive(Clone, Debug)]
pub struct WrittenModel {
    pub path: PathBuf,
    pub bytes: usize,
    pub inputs: usize,
    pub outputs: usize,
}

/// Serialized `ModelProto` bytes. The encoding has no maps or timestamps,
/// so equal specs always produce equal bytes.
pub fn encode_model(model: &ModelSpec) -> Result<Bytes> {
    let proto = to_model_proto(model)?;
    let mut buf = BytesMut::with_capacity(proto.encoded_len());
    proto
        .encode(&mut buf)
        .context("failed to encode ONNX model")?;
    Ok(buf.freeze())
}

/// Writes the model next to `path` first and renames it into place, so an
/// interrupted run never leaves a truncated file under the final name.
pub fn save_model(model: &ModelSpec, path: impl AsRef<Path>) -> Result<WrittenModel> {
    let path = path.as_ref();
    let bytes = encode_model(model)?;

    let dir = temp_dir_for(path);
    let mut tmp = create_temp(dir)
        .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
    tmp.write_all(&bytes)
        .with_context(|| format!("failed to write {}", tmp.path().display()))?;
    tmp.as_file()
        .sync_all()
        .context("failed to flush model to disk")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("failed to move model into {}", path.display()))?;

    let written = WrittenModel {
        path: path.to_path_buf(),
        bytes: bytes.len(),
        inputs: model.graph.inputs.len(),
        outputs: model.graph.outputs.len(),
    };
    info!(
        path = %written.path.display(),
        bytes = written.bytes,
        inputs = written.inputs,
        outputs = written.outputs,
        ir_version = model.ir_version,
        "wrote ONNX model"
    );
    Ok(written)
}

/// Directory the temp file goes into: the target's parent, or the
/// current directory for a bare file name.
fn temp_dir_for(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Temp files default to 0600; ask for 0666 so the umask applies and the
/// fixture ends up with the same mode `fs::write` would give it.
#[cfg(unix)]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    Builder::new()
        .prefix(".kvfixture")
        .permissions(Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().prefix(".kvfixture").tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_kv_fixture, FixtureConfig};

    #[test]
    fn encoding_is_deterministic() {
        let config = FixtureConfig::default();
        let a = encode_model(&build_kv_fixture(&config).unwrap()).unwrap();
        let b = encode_model(&build_kv_fixture(&config).unwrap()).unwrap();
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn temp_dir_follows_target_parent() {
        assert_eq!(temp_dir_for(Path::new("with_past_kv.onnx")), Path::new("."));
        assert_eq!(temp_dir_for(Path::new("a/b.onnx")), Path::new("a"));
        assert_eq!(temp_dir_for(Path::new("/abs/b.onnx")), Path::new("/abs"));
    }

    #[test]
    fn missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/model.onnx");
        let model = build_kv_fixture(&FixtureConfig::default()).unwrap();

        let err = save_model(&model, &path).unwrap_err();
        assert!(err.to_string().starts_with("failed to create temp file in"));
        assert!(!path.exists());
    }
}
