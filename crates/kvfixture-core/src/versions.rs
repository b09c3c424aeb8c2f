//! Compatibility between the container IR version and the default-domain
//! operator set version, following the ONNX release table.

use std::collections::HashSet;

use anyhow::{bail, ensure, Result};

use crate::OpsetId;

/// Highest IR version in [`OPSET_MIN_IR`].
pub const MAX_KNOWN_IR_VERSION: i64 = 11;

/// Highest default-domain opset in [`OPSET_MIN_IR`].
pub const MAX_KNOWN_OPSET: i64 = 23;

/// `(first opset, last opset, IR version that introduced them)`.
const OPSET_MIN_IR: &[(i64, i64, i64)] = &[
    (1, 8, 3),
    (9, 9, 4),
    (10, 10, 5),
    (11, 11, 6),
    (12, 14, 7),
    (15, 18, 8),
    (19, 20, 9),
    (21, 22, 10),
    (23, 23, 11),
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VersionPolicy {
    /// Reject pairs outside the release table.
    #[default]
    Strict,
    /// Emit whatever was asked for, e.g. to check that a consumer rejects it.
    Unchecked,
}

/// Lowest IR version able to carry `opset`, or `None` for unknown opsets.
pub fn min_ir_version_for_opset(opset: i64) -> Option<i64> {
    OPSET_MIN_IR
        .iter()
        .find(|(lo, hi, _)| (*lo..=*hi).contains(&opset))
        .map(|(_, _, ir)| *ir)
}

pub fn check_compatible(ir_version: i64, opsets: &[OpsetId]) -> Result<()> {
    ensure!(ir_version >= 3, "IR version {ir_version} predates operator sets");
    ensure!(
        ir_version <= MAX_KNOWN_IR_VERSION,
        "IR version {ir_version} is newer than the highest known ({MAX_KNOWN_IR_VERSION})"
    );
    ensure!(!opsets.is_empty(), "model imports no operator set");

    let mut seen = HashSet::with_capacity(opsets.len());
    let mut default_opset = None;
    for opset in opsets {
        let domain = if opset.is_default_domain() {
            ""
        } else {
            opset.domain.as_str()
        };
        ensure!(
            seen.insert(domain),
            "operator set domain `{}` imported twice",
            opset.domain
        );
        ensure!(
            opset.version >= 1,
            "operator set `{}` has invalid version {}",
            opset.domain,
            opset.version
        );
        if opset.is_default_domain() {
            default_opset = Some(opset.version);
        }
    }

    let Some(version) = default_opset else {
        bail!("model does not import the default ONNX operator set");
    };
    let Some(min_ir) = min_ir_version_for_opset(version) else {
        bail!("opset {version} is unknown (highest known is {MAX_KNOWN_OPSET})");
    };
    ensure!(
        ir_version >= min_ir,
        "opset {version} requires IR version {min_ir} or newer, got {ir_version}"
    );
    Ok(())
}
