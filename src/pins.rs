//! Pin class descriptors and raw pin instances

use std::any::TypeId;
use std::sync::Arc;

use crate::values::PinValue;

/// The Rust type a value pin wraps, paired with its name for diagnostics.
///
/// Identity is the `TypeId`; the name only feeds error messages and logs.
#[derive(Debug, Clone, Copy)]
pub struct InternalType {
    id: TypeId,
    name: &'static str,
}

impl InternalType {
    /// Describe the type `T` as an internal pin representation
    pub fn of<T: 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for InternalType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for InternalType {}

impl std::hash::Hash for InternalType {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Direction of data flow through a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Descriptor for one pin/value type exported by a package
pub trait PinClass: Send + Sync {
    /// Declared data-type name; the identity key across all packages
    fn data_type(&self) -> &str;

    /// The Rust type this pin wraps, or `None` for structural pins
    /// (execution pins and other carriers of no data).
    fn internal_data_structure(&self) -> Option<InternalType>;

    /// Default value hint for newly created pins
    fn default_value(&self) -> PinValue;

    /// Whether this pin holds data, as opposed to structural/execution pins
    fn is_value_pin(&self) -> bool;

    /// Create a concrete pin instance of this class
    fn create_pin(&self, name: &str, direction: PinDirection) -> RawPin {
        RawPin {
            name: name.to_string(),
            data_type: self.data_type().to_string(),
            direction,
            value: self.default_value(),
        }
    }
}

/// A pin class together with its registry-assigned ownership stamp.
///
/// The owning package name is blank until the post-load pass runs.
#[derive(Clone)]
pub struct PinRecord {
    class: Arc<dyn PinClass>,
    package_name: String,
}

impl PinRecord {
    pub fn new(class: Arc<dyn PinClass>) -> Self {
        Self {
            class,
            package_name: String::new(),
        }
    }

    pub fn class(&self) -> &dyn PinClass {
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

/// Concrete pin instance produced by a pin class
#[derive(Debug, Clone)]
pub struct RawPin {
    pub name: String,
    pub data_type: String,
    pub direction: PinDirection,
    pub value: PinValue,
}
