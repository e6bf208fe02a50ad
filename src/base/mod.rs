//! Built-in base package: standard pins, host node classes, default library

mod library;
mod nodes;
mod pins;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::loader::StaticPackage;
use crate::node::NodeClass;
use crate::package::{FunctionLibrary, PackageDescriptor};
use crate::pins::PinClass;

pub use nodes::{CompoundNode, ScriptNode};
pub use pins::{BoolPin, ExecPin, FloatPin, IntPin, StringPin};

/// Name of the built-in package
pub const BASE_PACKAGE_NAME: &str = "PyFlowBase";

/// Well-known host class for script-backed nodes
pub const SCRIPT_NODE_CLASS: &str = "pythonNode";

/// Well-known host class for compound-backed nodes
pub const COMPOUND_NODE_CLASS: &str = "compound";

/// Name of the built-in function library
pub const DEFAULT_LIB: &str = "DefaultLib";

/// Descriptor of the built-in package every registry carries by default.
///
/// Exports the standard value pins, the script/compound host classes the
/// resolver's file-backed strategies instantiate, and a small arithmetic
/// function library.
pub struct BasePackage;

impl PackageDescriptor for BasePackage {
    fn name(&self) -> &str {
        BASE_PACKAGE_NAME
    }

    fn node_classes(&self) -> HashMap<String, Arc<dyn NodeClass>> {
        let mut nodes: HashMap<String, Arc<dyn NodeClass>> = HashMap::new();
        nodes.insert(
            SCRIPT_NODE_CLASS.to_string(),
            Arc::new(nodes::ScriptNodeClass),
        );
        nodes.insert(
            COMPOUND_NODE_CLASS.to_string(),
            Arc::new(nodes::CompoundNodeClass),
        );
        nodes
    }

    fn pin_classes(&self) -> HashMap<String, Arc<dyn PinClass>> {
        let classes: Vec<Arc<dyn PinClass>> = vec![
            Arc::new(pins::BoolPin),
            Arc::new(pins::IntPin),
            Arc::new(pins::FloatPin),
            Arc::new(pins::StringPin),
            Arc::new(pins::ExecPin),
        ];
        classes
            .into_iter()
            .map(|class| (class.data_type().to_string(), class))
            .collect()
    }

    fn function_libraries(&self) -> HashMap<String, FunctionLibrary> {
        let mut libraries = HashMap::new();
        libraries.insert(DEFAULT_LIB.to_string(), library::default_library());
        libraries
    }
}

fn construct() -> Result<Box<dyn PackageDescriptor>, String> {
    Ok(Box::new(BasePackage))
}

/// Static registration entry for the base package.
///
/// The base package has no filesystem root; the empty path simply makes
/// the file-backed resolution strategies miss.
pub fn static_package() -> StaticPackage {
    StaticPackage::new(BASE_PACKAGE_NAME, PathBuf::new(), construct)
}
