//! Host node classes for script- and compound-backed nodes

use std::any::Any;

use log::warn;
use uuid::Uuid;

use crate::node::{NodeClass, NodeConfig, NodeInstance, NodePayload};

/// Class behind the well-known `pythonNode` name
pub struct ScriptNodeClass;

impl NodeClass for ScriptNodeClass {
    fn class_name(&self) -> &str {
        super::SCRIPT_NODE_CLASS
    }

    fn instantiate(&self, name: &str, _config: &NodeConfig) -> Box<dyn NodeInstance> {
        Box::new(ScriptNode {
            uid: Uuid::new_v4(),
            name: name.to_string(),
            source: String::new(),
        })
    }
}

/// Generic node whose behavior is raw script source injected by the
/// resolver
pub struct ScriptNode {
    uid: Uuid,
    name: String,
    source: String,
}

impl ScriptNode {
    /// The injected script source, verbatim file contents
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl NodeInstance for ScriptNode {
    fn uid(&self) -> Uuid {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        super::SCRIPT_NODE_CLASS
    }

    fn inject_payload(&mut self, payload: NodePayload) {
        match payload {
            NodePayload::ScriptSource(source) => self.source = source,
            NodePayload::GraphJson(_) => {
                warn!("script node '{}' ignoring subgraph payload", self.name);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Class behind the well-known `compound` name
pub struct CompoundNodeClass;

impl NodeClass for CompoundNodeClass {
    fn class_name(&self) -> &str {
        super::COMPOUND_NODE_CLASS
    }

    fn instantiate(&self, name: &str, _config: &NodeConfig) -> Box<dyn NodeInstance> {
        Box::new(CompoundNode {
            uid: Uuid::new_v4(),
            name: name.to_string(),
            graph: serde_json::Value::Null,
        })
    }
}

/// Generic node whose behavior is an embedded subgraph descriptor
pub struct CompoundNode {
    uid: Uuid,
    name: String,
    graph: serde_json::Value,
}

impl CompoundNode {
    /// The full parsed descriptor, including the `name` field
    pub fn raw_graph(&self) -> &serde_json::Value {
        &self.graph
    }
}

impl NodeInstance for CompoundNode {
    fn uid(&self) -> Uuid {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        super::COMPOUND_NODE_CLASS
    }

    fn inject_payload(&mut self, payload: NodePayload) {
        match payload {
            NodePayload::GraphJson(graph) => self.graph = graph,
            NodePayload::ScriptSource(_) => {
                warn!("compound node '{}' ignoring script payload", self.name);
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
