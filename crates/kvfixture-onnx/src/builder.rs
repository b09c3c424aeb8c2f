use anyhow::{Context, Result};
use kvfixture_core::{DType, GraphSpec, IOName, NodeSpec, TensorSpec};
use tracing::debug;

/// Accumulates graph inputs, outputs and nodes in declaration order.
pub struct GraphBuilder {
    name: String,
    inputs: Vec<TensorSpec>,
    outputs: Vec<TensorSpec>,
    nodes: Vec<NodeSpec>,
}

impl GraphBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            nodes: Vec::new(),
        }
    }

    pub fn input(&mut self, name: impl Into<IOName>, dtype: DType, dims: &[usize]) -> &mut Self {
        let spec = TensorSpec::new(name, dtype, dims);
        debug!(name = %spec.name, %dtype, shape = %spec.shape, "declared input");
        self.inputs.push(spec);
        self
    }

    pub fn output(&mut self, name: impl Into<IOName>, dtype: DType, dims: &[usize]) -> &mut Self {
        let spec = TensorSpec::new(name, dtype, dims);
        debug!(name = %spec.name, %dtype, shape = %spec.shape, "declared output");
        self.outputs.push(spec);
        self
    }

    pub fn identity(&mut self, input: impl Into<IOName>, output: impl Into<IOName>) -> &mut Self {
        let node = NodeSpec::identity(input, output);
        debug!(input = %node.input, output = %node.output, "identity node");
        self.nodes.push(node);
        self
    }

    /// Declares an input, an output of the same type, and the Identity node
    /// that copies one to the other.
    pub fn pass_through(
        &mut self,
        input: impl Into<IOName>,
        output: impl Into<IOName>,
        dtype: DType,
        dims: &[usize],
    ) -> &mut Self {
        let input = input.into();
        let output = output.into();
        self.input(input.clone(), dtype, dims)
            .output(output.clone(), dtype, dims)
            .identity(input, output)
    }

    pub fn build(self) -> Result<GraphSpec> {
        let graph = GraphSpec {
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
            nodes: self.nodes,
        };
        graph
            .validate()
            .with_context(|| format!("invalid graph `{}`", graph.name))?;
        Ok(graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_declaration_order() {
        let mut b = GraphBuilder::new("order");
        b.pass_through("x0", "y0", DType::F32, &[1])
            .pass_through("x1", "y1", DType::I64, &[2]);
        let graph = b.build().unwrap();

        assert_eq!(names(&graph.inputs), ["x0", "x1"]);
        assert_eq!(names(&graph.outputs), ["y0", "y1"]);
        assert_eq!(graph.nodes[1], NodeSpec::identity("x1", "y1"));
    }

    fn names(specs: &[TensorSpec]) -> Vec<String> {
        specs.iter().map(|t| t.name.0.clone()).collect()
    }

    #[test]
    fn build_reports_graph_name_on_failure() {
        let mut b = GraphBuilder::new("broken");
        b.input("x", DType::F32, &[1])
            .input("x", DType::F32, &[1])
            .output("y", DType::F32, &[1])
            .identity("x", "y");
        let err = b.build().unwrap_err();
        assert_eq!(err.to_string(), "invalid graph `broken`");
        assert!(format!("{err:#}").contains("duplicate graph input `x`"));
    }
}
