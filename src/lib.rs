//! Package registry and node-resolution engine for node-based visual
//! programming.
//!
//! At initialization the registry turns a set of root directories into
//! concrete package directories, loads every package it finds (isolating
//! failures per package), builds cross-package pin-type indexes and hands
//! UI factories and tools to the host's registration hooks. Afterward
//! [`NodeResolver`] turns symbolic node names into ready node instances
//! through an ordered set of lookup strategies: function library, exported
//! class, script file, compound descriptor.
//!
//! ```no_run
//! use pyflow_registry::{
//!     InitOptions, LoggingHooks, NodeResolver, PackageRegistry, ResolutionRequest,
//! };
//!
//! # fn main() -> Result<(), pyflow_registry::RegistryError> {
//! let registry = PackageRegistry::initialize(&InitOptions::default(), &LoggingHooks)?;
//! let resolver = NodeResolver::new();
//! let request = ResolutionRequest::new("add", "PyFlowBase").with_library("DefaultLib");
//! if let Some(node) = resolver.resolve(&registry, &request)? {
//!     println!("resolved {}", node.node().name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod base;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod node;
pub mod package;
pub mod paths;
pub mod pins;
pub mod registry;
pub mod resolver;
pub mod values;

// Re-export commonly used types
pub use error::{PackageLoadError, RegistryError};
pub use hooks::{LoggingHooks, RegistrationHooks};
pub use loader::{PackageHandle, StaticPackage, CREATE_PACKAGE_SYMBOL};
pub use node::{
    FunctionNode, NodeClass, NodeConfig, NodeFunction, NodeInstance, NodePayload, NodeRecord,
    ResolvedNode,
};
pub use package::{FunctionLibrary, Package, PackageDescriptor, ToolClass, UiFactory, ANY_SOFTWARE};
pub use pins::{InternalType, PinClass, PinDirection, PinRecord, RawPin};
pub use registry::{InitOptions, PackageRegistry};
pub use resolver::{
    NodeResolver, ResolutionRequest, ResolveStrategy, COMPOUND_NODES_DIR, SCRIPT_NODES_DIR,
};
pub use values::PinValue;
