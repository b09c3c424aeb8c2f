//! ONNX protobuf messages used by the fixture builder.
//!
//! Only the parts of `onnx.proto` that a static graph of typed inputs,
//! outputs and attribute-free nodes needs are declared here. Field tags
//! follow the upstream schema so the encoded bytes are a valid `ModelProto`.

pub mod onnx;

pub use prost::Message;
