use anyhow::Result;

use crate::{check_compatible, GraphSpec, VersionPolicy};

/// Operator-set domain of the standard ONNX operators.
pub const DEFAULT_DOMAIN: &str = "";

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OpsetId {
    pub domain: String,
    pub version: i64,
}

impl OpsetId {
    /// An import of the default ONNX operator set.
    pub fn onnx(version: i64) -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_string(),
            version,
        }
    }

    pub fn is_default_domain(&self) -> bool {
        self.domain == DEFAULT_DOMAIN || self.domain == "ai.onnx"
    }
}

/// A graph plus the container metadata a consumer checks before loading it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSpec {
    pub ir_version: i64,
    pub opsets: Vec<OpsetId>,
    pub producer_name: String,
    pub producer_version: String,
    pub graph: GraphSpec,
}

impl ModelSpec {
    pub fn new(graph: GraphSpec, ir_version: i64, opsets: Vec<OpsetId>) -> Self {
        Self {
            ir_version,
            opsets,
            producer_name: String::new(),
            producer_version: String::new(),
            graph,
        }
    }

    pub fn with_producer(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.producer_name = name.into();
        self.producer_version = version.into();
        self
    }

    pub fn validate(&self, policy: VersionPolicy) -> Result<()> {
        self.graph.validate()?;
        match policy {
            VersionPolicy::Strict => check_compatible(self.ir_version, &self.opsets),
            VersionPolicy::Unchecked => Ok(()),
        }
    }
}
