//! End-to-end initialization and resolution scenarios

use std::any::Any;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use uuid::Uuid;

use pyflow_registry::base::{self, CompoundNode, ScriptNode};
use pyflow_registry::{
    FunctionLibrary, InitOptions, InternalType, NodeClass, NodeConfig, NodeFunction, NodeInstance,
    NodeResolver, PackageDescriptor, PackageRegistry, PinClass, PinValue, RegistrationHooks,
    RegistryError, ResolutionRequest, ResolvedNode, StaticPackage, ToolClass, UiFactory,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Hooks that record every callback for assertions
#[derive(Default)]
struct RecordingHooks {
    events: Mutex<Vec<String>>,
}

impl RecordingHooks {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl RegistrationHooks for RecordingHooks {
    fn report_load_error(&self, package: &str, message: &str) {
        self.push(format!("error:{}:{}", package, message));
    }

    fn register_pin_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        self.push(format!("pin_factory:{}", package));
    }

    fn register_input_widget_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        self.push(format!("input_widget_factory:{}", package));
    }

    fn register_node_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        self.push(format!("node_factory:{}", package));
    }

    fn register_tool(&self, package: &str, tool: Arc<dyn ToolClass>) {
        self.push(format!("tool:{}:{}", package, tool.name()));
    }
}

struct SilentHooks;

impl RegistrationHooks for SilentHooks {
    fn report_load_error(&self, _package: &str, _message: &str) {}
    fn register_pin_factory(&self, _package: &str, _factory: Arc<dyn UiFactory>) {}
    fn register_input_widget_factory(&self, _package: &str, _factory: Arc<dyn UiFactory>) {}
    fn register_node_factory(&self, _package: &str, _factory: Arc<dyn UiFactory>) {}
    fn register_tool(&self, _package: &str, _tool: Arc<dyn ToolClass>) {}
}

struct StubNode {
    uid: Uuid,
    name: String,
    class_name: String,
}

impl NodeInstance for StubNode {
    fn uid(&self) -> Uuid {
        self.uid
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct StubNodeClass {
    class_name: &'static str,
}

impl NodeClass for StubNodeClass {
    fn class_name(&self) -> &str {
        self.class_name
    }

    fn instantiate(&self, name: &str, _config: &NodeConfig) -> Box<dyn NodeInstance> {
        Box::new(StubNode {
            uid: Uuid::new_v4(),
            name: name.to_string(),
            class_name: self.class_name.to_string(),
        })
    }
}

struct StubTool {
    name: &'static str,
    softwares: &'static [&'static str],
}

impl ToolClass for StubTool {
    fn name(&self) -> &str {
        self.name
    }

    fn supported_softwares(&self) -> Vec<String> {
        self.softwares.iter().map(|s| s.to_string()).collect()
    }
}

struct StubFactory;

impl UiFactory for StubFactory {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Package exporting both a node class `Foo` and a library function `Foo`,
/// a tool per target environment, and a pin factory
struct DemoPackage;

impl PackageDescriptor for DemoPackage {
    fn name(&self) -> &str {
        "DemoPackage"
    }

    fn node_classes(&self) -> HashMap<String, Arc<dyn NodeClass>> {
        let mut nodes: HashMap<String, Arc<dyn NodeClass>> = HashMap::new();
        nodes.insert("Foo".to_string(), Arc::new(StubNodeClass { class_name: "Foo" }));
        nodes
    }

    fn function_libraries(&self) -> HashMap<String, FunctionLibrary> {
        let mut library = FunctionLibrary::new();
        library.insert(NodeFunction::new("Foo", |_| PinValue::Int(42)));
        let mut libraries = HashMap::new();
        libraries.insert("L".to_string(), library);
        libraries
    }

    fn tool_classes(&self) -> HashMap<String, Arc<dyn ToolClass>> {
        let mut tools: HashMap<String, Arc<dyn ToolClass>> = HashMap::new();
        tools.insert(
            "AnyTool".to_string(),
            Arc::new(StubTool {
                name: "AnyTool",
                softwares: &["any"],
            }),
        );
        tools.insert(
            "MayaTool".to_string(),
            Arc::new(StubTool {
                name: "MayaTool",
                softwares: &["maya"],
            }),
        );
        tools
    }

    fn ui_pins_factory(&self) -> Option<Arc<dyn UiFactory>> {
        Some(Arc::new(StubFactory))
    }
}

fn demo_constructor() -> Result<Box<dyn PackageDescriptor>, String> {
    Ok(Box::new(DemoPackage))
}

fn broken_constructor() -> Result<Box<dyn PackageDescriptor>, String> {
    Err("descriptor constructor failed".to_string())
}

fn options_with(demo_root: PathBuf, software: &str) -> InitOptions {
    InitOptions {
        package_roots: Vec::new(),
        additional_locations: Vec::new(),
        software: software.to_string(),
        static_packages: vec![
            base::static_package(),
            StaticPackage::new("DemoPackage", demo_root, demo_constructor),
        ],
    }
}

#[test]
fn initialization_loads_base_and_demo_packages() {
    init_logging();
    let registry =
        PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &SilentHooks).unwrap();

    assert!(registry.package("PyFlowBase").is_some());
    let demo = registry.package("DemoPackage").unwrap();
    assert!(demo.node_classes().contains_key("Foo"));

    // every pin class reachable by its type name
    for record in registry.all_pin_classes() {
        let found = registry
            .find_pin_class_by_type(record.class().data_type())
            .unwrap();
        assert_eq!(found.class().data_type(), record.class().data_type());
    }
}

#[test]
fn library_name_selects_the_function_over_the_class() {
    let registry =
        PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &SilentHooks).unwrap();
    let resolver = NodeResolver::new();

    let with_library = resolver
        .resolve(
            &registry,
            &ResolutionRequest::new("Foo", "DemoPackage").with_library("L"),
        )
        .unwrap()
        .unwrap();
    assert!(matches!(with_library, ResolvedNode::Function(_)));

    let without_library = resolver
        .resolve(&registry, &ResolutionRequest::new("Foo", "DemoPackage"))
        .unwrap()
        .unwrap();
    assert!(matches!(without_library, ResolvedNode::Class(_)));
    assert_eq!(without_library.node().class_name(), "Foo");
}

#[test]
fn script_file_resolves_with_verbatim_payload() {
    let root = TempDir::new().unwrap();
    let nested = root.path().join("PyNodes/extra");
    fs::create_dir_all(&nested).unwrap();
    let source = "def compute(self):\n    return 1\n";
    fs::write(nested.join("Bar.py"), source).unwrap();

    let registry =
        PackageRegistry::initialize(&options_with(root.path().to_path_buf(), ""), &SilentHooks)
            .unwrap();
    let resolved = NodeResolver::new()
        .resolve(&registry, &ResolutionRequest::new("Bar", "DemoPackage"))
        .unwrap()
        .unwrap();

    let ResolvedNode::Script(node) = resolved else {
        panic!("expected a script-backed node");
    };
    let script = node.as_any().downcast_ref::<ScriptNode>().unwrap();
    assert_eq!(script.source(), source);
    assert_eq!(script.class_name(), "pythonNode");
}

#[test]
fn compound_matches_embedded_name_not_filename() {
    let root = TempDir::new().unwrap();
    let compounds = root.path().join("Compounds");
    fs::create_dir_all(&compounds).unwrap();
    let descriptor = serde_json::json!({
        "name": "Baz",
        "nodes": [{"class": "Foo"}],
        "edges": []
    });
    fs::write(
        compounds.join("totally_unrelated_filename.json"),
        serde_json::to_string_pretty(&descriptor).unwrap(),
    )
    .unwrap();

    let registry =
        PackageRegistry::initialize(&options_with(root.path().to_path_buf(), ""), &SilentHooks)
            .unwrap();
    let resolved = NodeResolver::new()
        .resolve(&registry, &ResolutionRequest::new("Baz", "DemoPackage"))
        .unwrap()
        .unwrap();

    let ResolvedNode::Compound(node) = resolved else {
        panic!("expected a compound-backed node");
    };
    let compound = node.as_any().downcast_ref::<CompoundNode>().unwrap();
    assert_eq!(compound.raw_graph(), &descriptor);
}

#[test]
fn malformed_compounds_are_skipped_not_fatal() {
    init_logging();
    let root = TempDir::new().unwrap();
    let compounds = root.path().join("Compounds");
    fs::create_dir_all(&compounds).unwrap();
    fs::write(compounds.join("broken.json"), "{not json").unwrap();
    fs::write(compounds.join("nameless.json"), r#"{"nodes": []}"#).unwrap();
    fs::write(compounds.join("binary.json"), [0xFFu8, 0xFE, 0x01, 0x00]).unwrap();
    fs::write(compounds.join("ok.json"), r#"{"name": "Baz", "nodes": []}"#).unwrap();

    let registry =
        PackageRegistry::initialize(&options_with(root.path().to_path_buf(), ""), &SilentHooks)
            .unwrap();
    let resolver = NodeResolver::new();

    let resolved = resolver
        .resolve(&registry, &ResolutionRequest::new("Baz", "DemoPackage"))
        .unwrap();
    assert!(matches!(resolved, Some(ResolvedNode::Compound(_))));

    // bad files make that file a skip, never the whole scan an error
    let miss = resolver
        .resolve(&registry, &ResolutionRequest::new("NotThere", "DemoPackage"))
        .unwrap();
    assert!(miss.is_none());
}

#[test]
fn resolution_miss_is_a_value_not_an_error() {
    let registry =
        PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &SilentHooks).unwrap();
    let resolver = NodeResolver::new();

    let miss = resolver
        .resolve(&registry, &ResolutionRequest::new("DoesNotExist", "DemoPackage"))
        .unwrap();
    assert!(miss.is_none());

    let err = resolver
        .resolve(&registry, &ResolutionRequest::new("Foo", "NoSuchPackage"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::PackageNotFound(_)));
}

#[test]
fn broken_package_is_reported_and_peers_survive() {
    let hooks = RecordingHooks::default();
    let mut options = options_with(PathBuf::new(), "");
    options
        .static_packages
        .push(StaticPackage::new("Broken", PathBuf::new(), broken_constructor));

    let registry = PackageRegistry::initialize(&options, &hooks).unwrap();

    assert!(registry.package("Broken").is_none());
    assert!(registry.package("DemoPackage").is_some());
    assert!(registry.package("PyFlowBase").is_some());
    assert!(hooks
        .events()
        .iter()
        .any(|e| e.starts_with("error:Broken:")));
}

#[test]
fn tools_are_filtered_by_target_software() {
    let hooks = RecordingHooks::default();
    PackageRegistry::initialize(&options_with(PathBuf::new(), "maya"), &hooks).unwrap();
    let events = hooks.events();
    assert!(events.contains(&"tool:DemoPackage:AnyTool".to_string()));
    assert!(events.contains(&"tool:DemoPackage:MayaTool".to_string()));

    let hooks = RecordingHooks::default();
    PackageRegistry::initialize(&options_with(PathBuf::new(), "houdini"), &hooks).unwrap();
    let events = hooks.events();
    assert!(events.contains(&"tool:DemoPackage:AnyTool".to_string()));
    assert!(!events.contains(&"tool:DemoPackage:MayaTool".to_string()));
}

#[test]
fn ui_factories_register_once_per_supplying_package() {
    let hooks = RecordingHooks::default();
    PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &hooks).unwrap();

    let events = hooks.events();
    let pin_factory_events: Vec<_> = events
        .iter()
        .filter(|e| e.starts_with("pin_factory:"))
        .collect();
    assert_eq!(pin_factory_events, vec!["pin_factory:DemoPackage"]);
    // base package supplies no factories
    assert!(!events.iter().any(|e| e.ends_with(":PyFlowBase")));
}

#[test]
fn duplicate_internal_type_across_packages_is_fatal() {
    struct BoolAgainPin;

    impl PinClass for BoolAgainPin {
        fn data_type(&self) -> &str {
            "BoolAgainPin"
        }

        fn internal_data_structure(&self) -> Option<InternalType> {
            // bool is already claimed by the base package's BoolPin
            Some(InternalType::of::<bool>())
        }

        fn default_value(&self) -> PinValue {
            PinValue::Bool(true)
        }

        fn is_value_pin(&self) -> bool {
            true
        }
    }

    struct ClashPackage;

    impl PackageDescriptor for ClashPackage {
        fn name(&self) -> &str {
            "ClashPackage"
        }

        fn pin_classes(&self) -> HashMap<String, Arc<dyn PinClass>> {
            let mut pins: HashMap<String, Arc<dyn PinClass>> = HashMap::new();
            pins.insert("BoolAgainPin".to_string(), Arc::new(BoolAgainPin));
            pins
        }
    }

    fn clash_constructor() -> Result<Box<dyn PackageDescriptor>, String> {
        Ok(Box::new(ClashPackage))
    }

    let options = InitOptions {
        package_roots: Vec::new(),
        additional_locations: Vec::new(),
        software: String::new(),
        static_packages: vec![
            base::static_package(),
            StaticPackage::new("ClashPackage", PathBuf::new(), clash_constructor),
        ],
    };

    let Err(err) = PackageRegistry::initialize(&options, &SilentHooks) else {
        panic!("expected initialization to fail on the duplicate claim");
    };
    let message = err.to_string();
    assert!(message.contains("ClashPackage") && message.contains("PyFlowBase"));
    assert!(matches!(err, RegistryError::DuplicateInternalType { .. }));
}

#[test]
fn callers_can_inject_payloads_after_resolution() {
    use pyflow_registry::NodePayload;

    let registry =
        PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &SilentHooks).unwrap();
    let mut resolved = NodeResolver::new()
        .resolve(&registry, &ResolutionRequest::new("pythonNode", "PyFlowBase"))
        .unwrap()
        .unwrap();

    let source = "print('late binding')";
    resolved
        .node_mut()
        .inject_payload(NodePayload::ScriptSource(source.to_string()));

    let script = resolved
        .node()
        .as_any()
        .downcast_ref::<ScriptNode>()
        .unwrap();
    assert_eq!(script.source(), source);
}

#[test]
fn function_backed_node_calls_through() {
    let registry =
        PackageRegistry::initialize(&options_with(PathBuf::new(), ""), &SilentHooks).unwrap();
    let resolved = NodeResolver::new()
        .resolve(
            &registry,
            &ResolutionRequest::new("add", "PyFlowBase").with_library("DefaultLib"),
        )
        .unwrap()
        .unwrap();

    let node = resolved.into_node();
    let function = node
        .as_any()
        .downcast_ref::<pyflow_registry::FunctionNode>()
        .unwrap();
    assert_eq!(
        function.call(&[PinValue::Float(1.5), PinValue::Int(2)]),
        PinValue::Float(3.5)
    );
}
