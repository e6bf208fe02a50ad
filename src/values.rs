//! Pin value currency shared between packages and the registry

use serde::{Deserialize, Serialize};

/// Data values that flow through pins and function nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PinValue {
    /// No value (structural pins, unset defaults)
    None,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Text string
    String(String),
    /// 3D vector (x, y, z)
    Vec3([f64; 3]),
    /// Homogeneous or mixed list of values
    List(Vec<PinValue>),
}

impl PinValue {
    /// Whether this value supports a hashing/equality contract.
    ///
    /// `Float` and `Vec3` carry `f64`, which has neither `Eq` nor `Hash`;
    /// lists are mutable containers and never hashable.
    pub fn is_hashable(&self) -> bool {
        matches!(
            self,
            PinValue::Bool(_) | PinValue::Int(_) | PinValue::String(_)
        )
    }

    /// Get a human-readable name for this value's variant
    pub fn type_name(&self) -> &'static str {
        match self {
            PinValue::None => "None",
            PinValue::Bool(_) => "Bool",
            PinValue::Int(_) => "Int",
            PinValue::Float(_) => "Float",
            PinValue::String(_) => "String",
            PinValue::Vec3(_) => "Vec3",
            PinValue::List(_) => "List",
        }
    }

    /// Numeric view of this value, if it has one
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PinValue::Float(v) => Some(*v),
            PinValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }
}

impl Default for PinValue {
    fn default() -> Self {
        PinValue::None
    }
}
