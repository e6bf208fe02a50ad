//! Ordered multi-strategy resolution of symbolic node names

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::base::{BASE_PACKAGE_NAME, COMPOUND_NODE_CLASS, SCRIPT_NODE_CLASS};
use crate::error::RegistryError;
use crate::node::{FunctionNode, NodeConfig, NodeInstance, NodePayload, ResolvedNode};
use crate::registry::PackageRegistry;

/// Package subfolder holding script-node sources, one file per node
pub const SCRIPT_NODES_DIR: &str = "PyNodes";

/// Package subfolder holding compound-node JSON descriptors
pub const COMPOUND_NODES_DIR: &str = "Compounds";

/// One node-resolution call: symbolic name, owning package, optional
/// function library, arbitrary keyword configuration. Constructed per call,
/// never persisted.
#[derive(Debug, Clone)]
pub struct ResolutionRequest {
    pub node_class: String,
    pub package: String,
    pub library: Option<String>,
    pub config: NodeConfig,
}

impl ResolutionRequest {
    pub fn new(node_class: &str, package: &str) -> Self {
        Self {
            node_class: node_class.to_string(),
            package: package.to_string(),
            library: None,
            config: NodeConfig::new(),
        }
    }

    pub fn with_library(mut self, library: &str) -> Self {
        self.library = Some(library.to_string());
        self
    }

    pub fn with_config(mut self, config: NodeConfig) -> Self {
        self.config = config;
        self
    }
}

/// One lookup method in the resolver's fixed strategy order
pub trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(None)` is a miss for this strategy; the resolver moves on
    fn try_resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError>;
}

/// Resolves a symbolic node name into a ready node instance.
///
/// Strategies run in a fixed order, first success wins: function library,
/// exported class, script file, compound file. A resolution miss is an
/// ordinary `Ok(None)`, never an error.
///
/// Script and compound lookups walk the package directory on every call;
/// callers needing latency guarantees should cache resolved results by
/// `(package, node class, library)`.
pub struct NodeResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
}

impl NodeResolver {
    pub fn new() -> Self {
        Self {
            strategies: vec![
                Box::new(FunctionLookup),
                Box::new(ClassLookup),
                Box::new(ScriptFileLookup),
                Box::new(CompoundFileLookup),
            ],
        }
    }

    pub fn resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError> {
        // Naming an unloaded package is a caller error, not a miss
        registry.package_checked(&request.package)?;

        for strategy in &self.strategies {
            if let Some(resolved) = strategy.try_resolve(registry, request)? {
                debug!(
                    "resolved '{}' from package '{}' via {}",
                    request.node_class,
                    request.package,
                    strategy.name()
                );
                return Ok(Some(resolved));
            }
        }

        debug!(
            "no strategy matched '{}' in package '{}'",
            request.node_class, request.package
        );
        Ok(None)
    }
}

impl Default for NodeResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Strategy 1: exact function match inside a named library.
///
/// Only attempted when the request names a library.
struct FunctionLookup;

impl ResolveStrategy for FunctionLookup {
    fn name(&self) -> &'static str {
        "function lookup"
    }

    fn try_resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError> {
        let Some(library_name) = &request.library else {
            return Ok(None);
        };
        let package = registry.package_checked(&request.package)?;
        let function = package
            .function_library(library_name)
            .and_then(|library| library.get(&request.node_class));
        Ok(function.map(|function| {
            ResolvedNode::Function(Box::new(FunctionNode::from_function(function)))
        }))
    }
}

/// Strategy 2: direct instantiation of an exported node class
struct ClassLookup;

impl ClassLookup {
    /// Instantiate an exported class, shared with the file-backed
    /// strategies that need a host node
    fn instantiate(
        registry: &PackageRegistry,
        package_name: &str,
        class_name: &str,
        config: &NodeConfig,
    ) -> Result<Option<Box<dyn NodeInstance>>, RegistryError> {
        let package = registry.package_checked(package_name)?;
        Ok(package
            .node_class(class_name)
            .map(|record| record.class().instantiate(class_name, config)))
    }
}

impl ResolveStrategy for ClassLookup {
    fn name(&self) -> &'static str {
        "class lookup"
    }

    fn try_resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError> {
        let node = Self::instantiate(
            registry,
            &request.package,
            &request.node_class,
            &request.config,
        )?;
        Ok(node.map(ResolvedNode::Class))
    }
}

/// Instantiate one of the well-known host classes from the base package
fn instantiate_host(
    registry: &PackageRegistry,
    class_name: &str,
) -> Result<Option<Box<dyn NodeInstance>>, RegistryError> {
    let host = ClassLookup::instantiate(registry, BASE_PACKAGE_NAME, class_name, &NodeConfig::new())?;
    if host.is_none() {
        warn!(
            "host class '{}' missing from package '{}'",
            class_name, BASE_PACKAGE_NAME
        );
    }
    Ok(host)
}

/// Strategy 3: script files under the package's `PyNodes` folder, matched
/// by filename stem
struct ScriptFileLookup;

impl ResolveStrategy for ScriptFileLookup {
    fn name(&self) -> &'static str {
        "script file lookup"
    }

    fn try_resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError> {
        let Some(root) = registry.package_path(&request.package) else {
            return Ok(None);
        };
        let scripts_dir = root.join(SCRIPT_NODES_DIR);
        if !scripts_dir.is_dir() {
            return Ok(None);
        }

        for path in walk_files(&scripts_dir)? {
            let stem = path.file_stem().and_then(|s| s.to_str());
            if stem != Some(request.node_class.as_str()) {
                continue;
            }
            let Some(mut node) = instantiate_host(registry, SCRIPT_NODE_CLASS)? else {
                return Ok(None);
            };
            let source = fs::read_to_string(&path)?;
            node.inject_payload(NodePayload::ScriptSource(source));
            return Ok(Some(ResolvedNode::Script(node)));
        }
        Ok(None)
    }
}

/// Strategy 4: compound descriptors under the package's `Compounds`
/// folder, matched by the `name` field inside the file, independent of
/// filename
struct CompoundFileLookup;

impl ResolveStrategy for CompoundFileLookup {
    fn name(&self) -> &'static str {
        "compound file lookup"
    }

    fn try_resolve(
        &self,
        registry: &PackageRegistry,
        request: &ResolutionRequest,
    ) -> Result<Option<ResolvedNode>, RegistryError> {
        let Some(root) = registry.package_path(&request.package) else {
            return Ok(None);
        };
        let compounds_dir = root.join(COMPOUND_NODES_DIR);
        if !compounds_dir.is_dir() {
            return Ok(None);
        }

        for path in walk_files(&compounds_dir)? {
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    warn!(
                        "skipping unreadable compound descriptor {}: {}",
                        path.display(),
                        err
                    );
                    continue;
                }
            };
            let descriptor: serde_json::Value = match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(err) => {
                    warn!(
                        "skipping malformed compound descriptor {}: {}",
                        path.display(),
                        err
                    );
                    continue;
                }
            };
            let Some(name) = descriptor.get("name").and_then(|v| v.as_str()) else {
                warn!(
                    "skipping compound descriptor without a 'name' field: {}",
                    path.display()
                );
                continue;
            };
            if name != request.node_class {
                continue;
            }
            let Some(mut node) = instantiate_host(registry, COMPOUND_NODE_CLASS)? else {
                return Ok(None);
            };
            node.inject_payload(NodePayload::GraphJson(descriptor));
            return Ok(Some(ResolvedNode::Compound(node)));
        }
        Ok(None)
    }
}

/// Recursive file listing, directories first-in last-out
fn walk_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        for entry in fs::read_dir(&current)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.push(path);
            }
        }
    }
    Ok(files)
}
