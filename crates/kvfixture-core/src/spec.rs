use std::collections::{HashMap, HashSet};
use std::fmt;

use anyhow::{bail, ensure, Result};

use crate::{DType, Shape};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IOName(pub String);

impl IOName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IOName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for IOName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for IOName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named, typed, statically shaped graph input or output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TensorSpec {
    pub name: IOName,
    pub dtype: DType,
    pub shape: Shape,
}

impl TensorSpec {
    pub fn new(name: impl Into<IOName>, dtype: DType, dims: &[usize]) -> Self {
        Self {
            name: name.into(),
            dtype,
            shape: Shape::from_slice(dims),
        }
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OpKind {
    Identity,
}

impl OpKind {
    pub fn op_type(self) -> &'static str {
        match self {
            OpKind::Identity => "Identity",
        }
    }
}

/// One single-input, single-output computation step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeSpec {
    pub op: OpKind,
    pub name: Option<String>,
    pub input: IOName,
    pub output: IOName,
}

impl NodeSpec {
    pub fn identity(input: impl Into<IOName>, output: impl Into<IOName>) -> Self {
        Self {
            op: OpKind::Identity,
            name: None,
            input: input.into(),
            output: output.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphSpec {
    pub name: String,
    pub inputs: Vec<TensorSpec>,
    pub outputs: Vec<TensorSpec>,
    pub nodes: Vec<NodeSpec>,
}

impl GraphSpec {
    pub fn input(&self, name: &str) -> Option<&TensorSpec> {
        self.inputs.iter().find(|t| t.name.as_str() == name)
    }

    pub fn output(&self, name: &str) -> Option<&TensorSpec> {
        self.outputs.iter().find(|t| t.name.as_str() == name)
    }

    /// Checks that the graph is a flat pass-through: unique boundary names,
    /// every node reads a graph input and writes a graph output, and every
    /// output has exactly one producer of matching type and shape.
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.name.is_empty(), "graph name must not be empty");

        let inputs = index_unique(&self.inputs, "input")?;
        let outputs = index_unique(&self.outputs, "output")?;

        for name in outputs.keys() {
            ensure!(
                !inputs.contains_key(name),
                "graph output `{name}` shadows a graph input of the same name"
            );
        }

        let produced: HashSet<&IOName> = self.nodes.iter().map(|n| &n.output).collect();
        let mut producers: HashMap<&IOName, usize> = HashMap::with_capacity(self.nodes.len());

        for (idx, node) in self.nodes.iter().enumerate() {
            if let Some(prev) = producers.insert(&node.output, idx) {
                bail!(
                    "`{}` is produced by both node {prev} and node {idx}",
                    node.output
                );
            }

            let Some(src) = inputs.get(&node.input) else {
                if produced.contains(&node.input) {
                    bail!(
                        "node {idx} reads `{}`, which is another node's output; \
                         pass-through graphs read graph inputs only",
                        node.input
                    );
                }
                bail!("node {idx} reads undeclared tensor `{}`", node.input);
            };
            let Some(dst) = outputs.get(&node.output) else {
                bail!("node {idx} writes undeclared output `{}`", node.output);
            };

            match node.op {
                OpKind::Identity => {
                    ensure!(
                        src.dtype == dst.dtype,
                        "identity node {idx} maps {} `{}` to {} `{}`",
                        src.dtype,
                        src.name,
                        dst.dtype,
                        dst.name
                    );
                    ensure!(
                        src.shape == dst.shape,
                        "identity node {idx} maps shape {} of `{}` to shape {} of `{}`",
                        src.shape,
                        src.name,
                        dst.shape,
                        dst.name
                    );
                }
            }
        }

        for out in &self.outputs {
            ensure!(
                producers.contains_key(&out.name),
                "graph output `{}` is not produced by any node",
                out.name
            );
        }

        Ok(())
    }
}

fn index_unique<'a>(
    specs: &'a [TensorSpec],
    kind: &str,
) -> Result<HashMap<&'a IOName, &'a TensorSpec>> {
    let mut index = HashMap::with_capacity(specs.len());
    for spec in specs {
        ensure!(!spec.name.0.is_empty(), "graph {kind} with an empty name");
        if index.insert(&spec.name, spec).is_some() {
            bail!("duplicate graph {kind} `{}`", spec.name);
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pass_through() -> GraphSpec {
        GraphSpec {
            name: "g".to_string(),
            inputs: vec![
                TensorSpec::new("a", DType::F32, &[1, 1]),
                TensorSpec::new("b", DType::I64, &[1, 2]),
            ],
            outputs: vec![
                TensorSpec::new("a_out", DType::F32, &[1, 1]),
                TensorSpec::new("b_out", DType::I64, &[1, 2]),
            ],
            nodes: vec![
                NodeSpec::identity("a", "a_out"),
                NodeSpec::identity("b", "b_out"),
            ],
        }
    }

    fn err_of(graph: &GraphSpec) -> String {
        graph.validate().unwrap_err().to_string()
    }

    #[test]
    fn accepts_flat_pass_through() {
        pass_through().validate().unwrap();
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut g = pass_through();
        g.inputs.push(TensorSpec::new("a", DType::F32, &[1, 1]));
        assert!(err_of(&g).contains("duplicate graph input `a`"));

        let mut g = pass_through();
        g.outputs.push(TensorSpec::new("b_out", DType::I64, &[1, 2]));
        assert!(err_of(&g).contains("duplicate graph output `b_out`"));
    }

    #[test]
    fn rejects_unknown_references() {
        let mut g = pass_through();
        g.nodes[0].input = IOName::from("missing");
        assert!(err_of(&g).contains("undeclared tensor `missing`"));

        let mut g = pass_through();
        g.nodes[1].output = IOName::from("nowhere");
        assert!(err_of(&g).contains("undeclared output `nowhere`"));
    }

    #[test]
    fn rejects_chained_nodes() {
        let mut g = pass_through();
        g.nodes[1].input = IOName::from("a_out");
        assert!(err_of(&g).contains("another node's output"));
    }

    #[test]
    fn rejects_double_and_missing_producers() {
        let mut g = pass_through();
        g.nodes.push(NodeSpec::identity("a", "a_out"));
        assert!(err_of(&g).contains("produced by both node 0 and node 2"));

        let mut g = pass_through();
        g.nodes.pop();
        assert!(err_of(&g).contains("`b_out` is not produced"));
    }

    #[test]
    fn rejects_type_or_shape_mismatch() {
        let mut g = pass_through();
        g.outputs[1].dtype = DType::I32;
        assert!(err_of(&g).contains("maps int64 `b` to int32 `b_out`"));

        let mut g = pass_through();
        g.outputs[0].shape = Shape::from_slice(&[2, 1]);
        assert!(err_of(&g).contains("shape [1, 1] of `a` to shape [2, 1]"));
    }

    #[test]
    fn rejects_output_shadowing_input() {
        let mut g = pass_through();
        g.outputs.push(TensorSpec::new("a", DType::F32, &[1, 1]));
        assert!(err_of(&g).contains("shadows a graph input"));
    }

    #[test]
    fn lookups_by_name() {
        let g = pass_through();
        assert_eq!(g.input("b").map(|t| t.dtype), Some(DType::I64));
        assert_eq!(g.output("a_out").map(TensorSpec::rank), Some(2));
        assert!(g.input("a_out").is_none());
    }
}
