use anyhow::{Context, Result};
use kvfixture_core::{DType, GraphSpec, ModelSpec, NodeSpec, OpsetId, TensorSpec};
use kvfixture_proto::onnx as pb;
use pb::tensor_shape_proto::{dimension, Dimension};

pub fn to_model_proto(model: &ModelSpec) -> Result<pb::ModelProto> {
    Ok(pb::ModelProto {
        ir_version: model.ir_version,
        opset_import: model.opsets.iter().map(opset_to_pb).collect(),
        producer_name: model.producer_name.clone(),
        producer_version: model.producer_version.clone(),
        graph: Some(graph_to_pb(&model.graph)?),
        ..Default::default()
    })
}

fn graph_to_pb(graph: &GraphSpec) -> Result<pb::GraphProto> {
    let input = graph
        .inputs
        .iter()
        .map(value_info_to_pb)
        .collect::<Result<Vec<_>>>()?;
    let output = graph
        .outputs
        .iter()
        .map(value_info_to_pb)
        .collect::<Result<Vec<_>>>()?;

    Ok(pb::GraphProto {
        node: graph.nodes.iter().map(node_to_pb).collect(),
        name: graph.name.clone(),
        input,
        output,
        ..Default::default()
    })
}

fn node_to_pb(node: &NodeSpec) -> pb::NodeProto {
    pb::NodeProto {
        input: vec![node.input.0.clone()],
        output: vec![node.output.0.clone()],
        name: node.name.clone().unwrap_or_default(),
        op_type: node.op.op_type().to_string(),
        ..Default::default()
    }
}

fn value_info_to_pb(spec: &TensorSpec) -> Result<pb::ValueInfoProto> {
    let dims = spec
        .shape
        .dims_i64()
        .with_context(|| format!("tensor `{}` has an unrepresentable shape", spec.name))?;

    let tensor_type = pb::type_proto::Tensor {
        elem_type: to_proto_dtype(spec.dtype) as i32,
        shape: Some(pb::TensorShapeProto {
            dim: dims
                .into_iter()
                .map(|d| Dimension {
                    value: Some(dimension::Value::DimValue(d)),
                    ..Default::default()
                })
                .collect(),
        }),
    };

    Ok(pb::ValueInfoProto {
        name: spec.name.0.clone(),
        r#type: Some(pb::TypeProto {
            value: Some(pb::type_proto::Value::TensorType(tensor_type)),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn opset_to_pb(opset: &OpsetId) -> pb::OperatorSetIdProto {
    pb::OperatorSetIdProto {
        domain: opset.domain.clone(),
        version: opset.version,
    }
}

pub fn to_proto_dtype(dtype: DType) -> pb::tensor_proto::DataType {
    use pb::tensor_proto::DataType;
    match dtype {
        DType::F32 => DataType::Float,
        DType::F16 => DataType::Float16,
        DType::I64 => DataType::Int64,
        DType::I32 => DataType::Int32,
        DType::U8 => DataType::Uint8,
    }
}
