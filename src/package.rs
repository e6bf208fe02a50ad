//! Package descriptors and loaded package units

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::Library;

use crate::node::{NodeClass, NodeFunction, NodeRecord};
use crate::pins::{PinClass, PinRecord};

/// Opaque UI factory handed through to the registration hooks.
///
/// The core never inspects factories; `as_any` lets the UI layer downcast
/// to whatever concrete type the package shipped.
pub trait UiFactory: Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// Wildcard entry in a tool's supported-software list
pub const ANY_SOFTWARE: &str = "any";

/// A tool exported by a package for registration with the host UI
pub trait ToolClass: Send + Sync {
    fn name(&self) -> &str;

    /// Target environments this tool supports; [`ANY_SOFTWARE`] matches all
    fn supported_softwares(&self) -> Vec<String> {
        vec![ANY_SOFTWARE.to_string()]
    }
}

/// Named collection of plain callables exported by a package
#[derive(Debug, Clone, Default)]
pub struct FunctionLibrary {
    functions: HashMap<String, NodeFunction>,
}

impl FunctionLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, function: NodeFunction) {
        self.functions.insert(function.name().to_string(), function);
    }

    pub fn get(&self, name: &str) -> Option<&NodeFunction> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &HashMap<String, NodeFunction> {
        &self.functions
    }
}

/// Interface every extension package implements.
///
/// Discovery is decoupled from any particular loading mechanism: built-in
/// packages supply descriptors through static constructors, external ones
/// through a shared-library symbol. All accessors have empty defaults so a
/// package only declares what it actually exports.
pub trait PackageDescriptor: Send + Sync {
    /// Unique package name
    fn name(&self) -> &str;

    /// Exported node-class names mapped to constructible node types
    fn node_classes(&self) -> HashMap<String, Arc<dyn NodeClass>> {
        HashMap::new()
    }

    /// Exported pin-type names mapped to pin classes
    fn pin_classes(&self) -> HashMap<String, Arc<dyn PinClass>> {
        HashMap::new()
    }

    /// Named function libraries
    fn function_libraries(&self) -> HashMap<String, FunctionLibrary> {
        HashMap::new()
    }

    /// Exported tool names mapped to tool classes
    fn tool_classes(&self) -> HashMap<String, Arc<dyn ToolClass>> {
        HashMap::new()
    }

    /// Optional factory for custom pin visuals
    fn ui_pins_factory(&self) -> Option<Arc<dyn UiFactory>> {
        None
    }

    /// Optional factory for pin input widgets
    fn pin_input_widgets_factory(&self) -> Option<Arc<dyn UiFactory>> {
        None
    }

    /// Optional factory for custom node visuals
    fn ui_nodes_factory(&self) -> Option<Arc<dyn UiFactory>> {
        None
    }
}

/// A loaded extension package.
///
/// Materializes the descriptor's export maps once at load time; lives until
/// the next full re-initialization rebuilds the registry. Packages loaded
/// from a shared library keep the library handle alive so the exported
/// trait objects stay valid.
pub struct Package {
    name: String,
    root: PathBuf,
    nodes: HashMap<String, NodeRecord>,
    pins: HashMap<String, PinRecord>,
    libraries: HashMap<String, FunctionLibrary>,
    tools: HashMap<String, Arc<dyn ToolClass>>,
    ui_pins_factory: Option<Arc<dyn UiFactory>>,
    pin_input_widgets_factory: Option<Arc<dyn UiFactory>>,
    ui_nodes_factory: Option<Arc<dyn UiFactory>>,
    _library: Option<Library>,
}

impl Package {
    pub(crate) fn from_descriptor(
        name: &str,
        root: &Path,
        descriptor: &dyn PackageDescriptor,
        library: Option<Library>,
    ) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_path_buf(),
            nodes: descriptor
                .node_classes()
                .into_iter()
                .map(|(n, c)| (n, NodeRecord::new(c)))
                .collect(),
            pins: descriptor
                .pin_classes()
                .into_iter()
                .map(|(n, c)| (n, PinRecord::new(c)))
                .collect(),
            libraries: descriptor.function_libraries(),
            tools: descriptor.tool_classes(),
            ui_pins_factory: descriptor.ui_pins_factory(),
            pin_input_widgets_factory: descriptor.pin_input_widgets_factory(),
            ui_nodes_factory: descriptor.ui_nodes_factory(),
            _library: library,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filesystem root of this package
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn node_class(&self, name: &str) -> Option<&NodeRecord> {
        self.nodes.get(name)
    }

    pub fn node_classes(&self) -> &HashMap<String, NodeRecord> {
        &self.nodes
    }

    pub fn pin_class(&self, data_type: &str) -> Option<&PinRecord> {
        self.pins.get(data_type)
    }

    pub fn pin_classes(&self) -> &HashMap<String, PinRecord> {
        &self.pins
    }

    pub fn function_library(&self, name: &str) -> Option<&FunctionLibrary> {
        self.libraries.get(name)
    }

    pub fn function_libraries(&self) -> &HashMap<String, FunctionLibrary> {
        &self.libraries
    }

    pub fn tool_classes(&self) -> &HashMap<String, Arc<dyn ToolClass>> {
        &self.tools
    }

    pub fn ui_pins_factory(&self) -> Option<Arc<dyn UiFactory>> {
        self.ui_pins_factory.clone()
    }

    pub fn pin_input_widgets_factory(&self) -> Option<Arc<dyn UiFactory>> {
        self.pin_input_widgets_factory.clone()
    }

    pub fn ui_nodes_factory(&self) -> Option<Arc<dyn UiFactory>> {
        self.ui_nodes_factory.clone()
    }

    /// Stamp every exported node and pin class with the owning package name
    pub(crate) fn stamp_exports(&mut self) {
        let name = self.name.clone();
        for record in self.nodes.values_mut() {
            record.stamp_package(&name);
        }
        for record in self.pins.values_mut() {
            record.stamp_package(&name);
        }
    }
}
