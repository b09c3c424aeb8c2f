//! Layout of the past/present key-value cache fixture.
//!
//! The model stands in for one decoding step of a small transformer:
//! a primary `INPUT__0 -> OUTPUT__0` pair plus, for every layer, the
//! `past_key_values.N.{key,value}` inputs copied unchanged onto the
//! `present_key_values.N.{key,value}` outputs. Runtimes under test match
//! these tensors by name, so the names are part of the contract.

use anyhow::{Context, Result};
use kvfixture_core::{DType, ModelSpec, OpsetId, VersionPolicy};
use tracing::debug;

use crate::GraphBuilder;

pub const FIXTURE_FILE_NAME: &str = "with_past_kv.onnx";
pub const GRAPH_NAME: &str = "with_past_kv";

pub const PRIMARY_INPUT: &str = "INPUT__0";
pub const PRIMARY_OUTPUT: &str = "OUTPUT__0";
pub const PRIMARY_DIMS: [usize; 2] = [1, 1];
pub const KV_DIMS: [usize; 2] = [1, 2];
pub const NUM_LAYERS: usize = 2;

pub const IR_VERSION: i64 = 10;
pub const OPSET_VERSION: i64 = 21;

pub const PRODUCER_NAME: &str = "kvfixture";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KvSlot {
    Key,
    Value,
}

impl KvSlot {
    pub const ALL: [KvSlot; 2] = [KvSlot::Key, KvSlot::Value];

    pub fn as_str(self) -> &'static str {
        match self {
            KvSlot::Key => "key",
            KvSlot::Value => "value",
        }
    }
}

/// Cache input fed into `layer`.
pub fn past_name(layer: usize, slot: KvSlot) -> String {
    format!("past_key_values.{layer}.{}", slot.as_str())
}

/// Cache output produced by `layer`.
pub fn present_name(layer: usize, slot: KvSlot) -> String {
    format!("present_key_values.{layer}.{}", slot.as_str())
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureConfig {
    pub graph_name: String,
    pub layers: usize,
    pub primary_dtype: DType,
    pub primary_dims: Vec<usize>,
    pub kv_dtype: DType,
    pub kv_dims: Vec<usize>,
    pub ir_version: i64,
    pub opset: OpsetId,
    pub version_policy: VersionPolicy,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            graph_name: GRAPH_NAME.to_string(),
            layers: NUM_LAYERS,
            primary_dtype: DType::F32,
            primary_dims: PRIMARY_DIMS.to_vec(),
            kv_dtype: DType::I64,
            kv_dims: KV_DIMS.to_vec(),
            ir_version: IR_VERSION,
            opset: OpsetId::onnx(OPSET_VERSION),
            version_policy: VersionPolicy::Strict,
        }
    }
}

/// Declares the primary pair, then each layer's key and value pairs, and
/// wraps the graph with the configured IR version and opset import.
pub fn build_kv_fixture(config: &FixtureConfig) -> Result<ModelSpec> {
    let mut graph = GraphBuilder::new(config.graph_name.clone());
    graph.pass_through(
        PRIMARY_INPUT,
        PRIMARY_OUTPUT,
        config.primary_dtype,
        &config.primary_dims,
    );

    for layer in 0..config.layers {
        for slot in KvSlot::ALL {
            graph.pass_through(
                past_name(layer, slot),
                present_name(layer, slot),
                config.kv_dtype,
                &config.kv_dims,
            );
        }
    }

    let graph = graph.build()?;
    debug!(
        graph = %graph.name,
        inputs = graph.inputs.len(),
        outputs = graph.outputs.len(),
        nodes = graph.nodes.len(),
        "assembled kv fixture graph"
    );

    let model = ModelSpec::new(graph, config.ir_version, vec![config.opset.clone()])
        .with_producer(PRODUCER_NAME, env!("CARGO_PKG_VERSION"));
    model.validate(config.version_policy).with_context(|| {
        format!(
            "IR version {} is not usable with opset {}",
            config.ir_version, config.opset.version
        )
    })?;
    Ok(model)
}
