use std::fmt;

use anyhow::{Context, Result};
use smallvec::SmallVec;

/// Element type of a declared tensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F16,
    I64,
    I32,
    U8,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::F32 => "float32",
            DType::F16 => "float16",
            DType::I64 => "int64",
            DType::I32 => "int32",
            DType::U8 => "uint8",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Static tensor shape. Dims are unsigned, so a shape is never negative;
/// the only way to make an unrepresentable one is a dim above `i64::MAX`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Shape(pub SmallVec<[usize; 6]>);

impl Shape {
    pub fn from_slice(d: &[usize]) -> Self {
        Self(d.iter().copied().collect())
    }
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Dims as the signed 64-bit integers ONNX stores.
    pub fn dims_i64(&self) -> Result<Vec<i64>> {
        self.0
            .iter()
            .map(|d| {
                i64::try_from(*d).with_context(|| format!("dimension {d} does not fit in i64"))
            })
            .collect()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{d}")?;
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_display() {
        assert_eq!(Shape::from_slice(&[1, 2]).to_string(), "[1, 2]");
        assert_eq!(Shape::from_slice(&[]).to_string(), "[]");
        assert_eq!(Shape::from_slice(&[4, 0, 3]).rank(), 3);
    }

    #[test]
    fn oversized_dim_is_rejected() {
        let shape = Shape::from_slice(&[1, usize::MAX]);
        let err = shape.dims_i64().unwrap_err();
        assert!(err.to_string().contains("does not fit in i64"));
        assert_eq!(Shape::from_slice(&[1, 2]).dims_i64().unwrap(), vec![1, 2]);
    }
}
