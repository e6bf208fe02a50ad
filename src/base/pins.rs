//! Standard pin classes exported by the base package

use crate::pins::{InternalType, PinClass};
use crate::values::PinValue;

/// Boolean value pin
pub struct BoolPin;

impl PinClass for BoolPin {
    fn data_type(&self) -> &str {
        "BoolPin"
    }

    fn internal_data_structure(&self) -> Option<InternalType> {
        Some(InternalType::of::<bool>())
    }

    fn default_value(&self) -> PinValue {
        PinValue::Bool(false)
    }

    fn is_value_pin(&self) -> bool {
        true
    }
}

/// Integer value pin
pub struct IntPin;

impl PinClass for IntPin {
    fn data_type(&self) -> &str {
        "IntPin"
    }

    fn internal_data_structure(&self) -> Option<InternalType> {
        Some(InternalType::of::<i64>())
    }

    fn default_value(&self) -> PinValue {
        PinValue::Int(0)
    }

    fn is_value_pin(&self) -> bool {
        true
    }
}

/// Floating point value pin
pub struct FloatPin;

impl PinClass for FloatPin {
    fn data_type(&self) -> &str {
        "FloatPin"
    }

    fn internal_data_structure(&self) -> Option<InternalType> {
        Some(InternalType::of::<f64>())
    }

    fn default_value(&self) -> PinValue {
        PinValue::Float(0.0)
    }

    fn is_value_pin(&self) -> bool {
        true
    }
}

/// Text string value pin
pub struct StringPin;

impl PinClass for StringPin {
    fn data_type(&self) -> &str {
        "StringPin"
    }

    fn internal_data_structure(&self) -> Option<InternalType> {
        Some(InternalType::of::<String>())
    }

    fn default_value(&self) -> PinValue {
        PinValue::String(String::new())
    }

    fn is_value_pin(&self) -> bool {
        true
    }
}

/// Execution-flow pin; structural, carries no data
pub struct ExecPin;

impl PinClass for ExecPin {
    fn data_type(&self) -> &str {
        "ExecPin"
    }

    fn internal_data_structure(&self) -> Option<InternalType> {
        None
    }

    fn default_value(&self) -> PinValue {
        PinValue::None
    }

    fn is_value_pin(&self) -> bool {
        false
    }
}
