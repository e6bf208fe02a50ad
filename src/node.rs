//! Node traits, resolved-node variants and function-backed nodes

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::values::PinValue;

/// Arbitrary keyword configuration handed to node constructors
pub type NodeConfig = HashMap<String, serde_json::Value>;

/// Behavior payload injected into script- and compound-backed nodes
#[derive(Debug, Clone)]
pub enum NodePayload {
    /// Raw source text of a script node, verbatim file contents
    ScriptSource(String),
    /// Full parsed descriptor of an embedded subgraph
    GraphJson(serde_json::Value),
}

/// A ready, instantiated node owned by the caller after resolution
pub trait NodeInstance: Send {
    /// Unique instance id
    fn uid(&self) -> Uuid;

    /// Instance name, normally the symbolic name it was resolved under
    fn name(&self) -> &str;

    /// Name of the node class this instance was created from
    fn class_name(&self) -> &str;

    /// Receive a behavior payload. Nodes that take no payload ignore it.
    fn inject_payload(&mut self, _payload: NodePayload) {}

    /// Downcast seam for callers that know the concrete node type
    fn as_any(&self) -> &dyn Any;
}

/// A constructible node type exported by a package
pub trait NodeClass: Send + Sync {
    /// Exported class name
    fn class_name(&self) -> &str;

    /// Instantiate this class under the given name and configuration
    fn instantiate(&self, name: &str, config: &NodeConfig) -> Box<dyn NodeInstance>;
}

/// A node class together with its registry-assigned ownership stamp
#[derive(Clone)]
pub struct NodeRecord {
    class: Arc<dyn NodeClass>,
    package_name: String,
}

impl NodeRecord {
    pub fn new(class: Arc<dyn NodeClass>) -> Self {
        Self {
            class,
            package_name: String::new(),
        }
    }

    pub fn class(&self) -> &dyn NodeClass {
        self.class.as_ref()
    }

    /// Owning package, assigned by the loader's post-load pass
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub(crate) fn stamp_package(&mut self, package_name: &str) {
        self.package_name = package_name.to_string();
    }
}

/// A plain callable exported through a function library
#[derive(Clone)]
pub struct NodeFunction {
    name: String,
    func: Arc<dyn Fn(&[PinValue]) -> PinValue + Send + Sync>,
}

impl NodeFunction {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&[PinValue]) -> PinValue + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[PinValue]) -> PinValue {
        (self.func)(args)
    }
}

impl std::fmt::Debug for NodeFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFunction")
            .field("name", &self.name)
            .finish()
    }
}

/// Function-backed node wrapping a library callable
pub struct FunctionNode {
    uid: Uuid,
    name: String,
    function: NodeFunction,
}

impl FunctionNode {
    /// Initialize a node from a plain library function
    pub fn from_function(function: &NodeFunction) -> Self {
        Self {
            uid: Uuid::new_v4(),
            name: function.name().to_string(),
            function: function.clone(),
        }
    }

    /// Invoke the wrapped callable
    pub fn call(&self, args: &[PinValue]) -> PinValue {
        self.function.call(args)
    }
}

impl NodeInstance for FunctionNode {
    fn uid(&self) -> Uuid {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        self.function.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Outcome of a successful node resolution.
///
/// The variant records which strategy produced the node; the caller owns
/// the instance afterward.
pub enum ResolvedNode {
    /// Wraps a plain callable found in a function library
    Function(Box<dyn NodeInstance>),
    /// Direct instantiation of an exported node class
    Class(Box<dyn NodeInstance>),
    /// Generic host node carrying raw script source loaded from a file
    Script(Box<dyn NodeInstance>),
    /// Generic host node carrying an embedded subgraph descriptor
    Compound(Box<dyn NodeInstance>),
}

impl ResolvedNode {
    pub fn node(&self) -> &dyn NodeInstance {
        match self {
            ResolvedNode::Function(n)
            | ResolvedNode::Class(n)
            | ResolvedNode::Script(n)
            | ResolvedNode::Compound(n) => n.as_ref(),
        }
    }

    pub fn node_mut(&mut self) -> &mut dyn NodeInstance {
        match self {
            ResolvedNode::Function(n)
            | ResolvedNode::Class(n)
            | ResolvedNode::Script(n)
            | ResolvedNode::Compound(n) => n.as_mut(),
        }
    }

    pub fn into_node(self) -> Box<dyn NodeInstance> {
        match self {
            ResolvedNode::Function(n)
            | ResolvedNode::Class(n)
            | ResolvedNode::Script(n)
            | ResolvedNode::Compound(n) => n,
        }
    }
}

impl std::fmt::Debug for ResolvedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (variant, node) = match self {
            ResolvedNode::Function(n) => ("Function", n),
            ResolvedNode::Class(n) => ("Class", n),
            ResolvedNode::Script(n) => ("Script", n),
            ResolvedNode::Compound(n) => ("Compound", n),
        };
        write!(f, "ResolvedNode::{}({})", variant, node.name())
    }
}
