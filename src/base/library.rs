//! Built-in function library

use crate::node::NodeFunction;
use crate::package::FunctionLibrary;
use crate::values::PinValue;

fn binary_float(args: &[PinValue], op: impl Fn(f64, f64) -> f64) -> PinValue {
    match (args.first().and_then(PinValue::as_float), args.get(1).and_then(PinValue::as_float)) {
        (Some(a), Some(b)) => PinValue::Float(op(a, b)),
        _ => PinValue::None,
    }
}

/// Arithmetic and logic entries exported under `DefaultLib`
pub fn default_library() -> FunctionLibrary {
    let mut library = FunctionLibrary::new();

    library.insert(NodeFunction::new("add", |args| {
        binary_float(args, |a, b| a + b)
    }));
    library.insert(NodeFunction::new("subtract", |args| {
        binary_float(args, |a, b| a - b)
    }));
    library.insert(NodeFunction::new("multiply", |args| {
        binary_float(args, |a, b| a * b)
    }));
    library.insert(NodeFunction::new("not", |args| match args.first() {
        Some(PinValue::Bool(v)) => PinValue::Bool(!v),
        _ => PinValue::None,
    }));

    library
}
