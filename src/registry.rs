//! Process-lifetime package registry with an explicit rebuild lifecycle

use std::any::Any;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::info;

use crate::base;
use crate::error::RegistryError;
use crate::hooks::RegistrationHooks;
use crate::loader::{self, StaticPackage};
use crate::package::Package;
use crate::paths;
use crate::pins::{PinDirection, PinRecord, RawPin};
use crate::values::PinValue;

/// Initialization parameters for [`PackageRegistry`]
#[derive(Clone)]
pub struct InitOptions {
    /// Built-in root directories, already package directories themselves
    pub package_roots: Vec<PathBuf>,
    /// Caller-supplied extra root directories, scanned for the nested
    /// package-folder convention
    pub additional_locations: Vec<PathBuf>,
    /// Target environment name used to filter tool registration
    pub software: String,
    /// Packages registered from compiled-in constructors
    pub static_packages: Vec<StaticPackage>,
}

impl Default for InitOptions {
    fn default() -> Self {
        let mut package_roots = Vec::new();
        if let Some(home) = dirs::home_dir() {
            package_roots.push(home.join(".pyflow/packages"));
        }
        package_roots.push(PathBuf::from("./packages"));

        Self {
            package_roots,
            additional_locations: Vec::new(),
            software: String::new(),
            static_packages: vec![base::static_package()],
        }
    }
}

/// All loaded packages plus the cross-package pin-type indexes.
///
/// Constructed once by the host and passed by reference to all readers.
/// Node resolution and pin lookups are read-only and safe to call from
/// multiple threads; re-initialization takes `&mut self` and is therefore
/// exclusive with respect to readers by construction.
pub struct PackageRegistry {
    packages: BTreeMap<String, Package>,
    hashable_types: Mutex<Vec<String>>,
}

impl PackageRegistry {
    /// Discover and load every package, then run the cross-package
    /// post-load pass.
    ///
    /// Always completes with whatever subset of packages loaded
    /// successfully; per-package failures go to
    /// [`RegistrationHooks::report_load_error`](crate::hooks::RegistrationHooks::report_load_error).
    /// The only fatal error is a duplicate internal-type claim.
    pub fn initialize(
        options: &InitOptions,
        hooks: &dyn RegistrationHooks,
    ) -> Result<Self, RegistryError> {
        let mut registry = Self {
            packages: BTreeMap::new(),
            hashable_types: Mutex::new(Vec::new()),
        };
        registry.reinitialize(options, hooks)?;
        Ok(registry)
    }

    /// Clear every registry and rebuild from scratch.
    ///
    /// The only supported way to pick up newly added packages.
    pub fn reinitialize(
        &mut self,
        options: &InitOptions,
        hooks: &dyn RegistrationHooks,
    ) -> Result<(), RegistryError> {
        self.packages.clear();
        lock_cache(&self.hashable_types).clear();

        let package_paths = paths::resolve_package_paths_from_env(
            &options.package_roots,
            &options.additional_locations,
        );

        loader::load_static_packages(&options.static_packages, &mut self.packages, hooks);
        loader::load_dynamic_packages(&package_paths, &mut self.packages, hooks);
        loader::post_load(&mut self.packages, &options.software, hooks)?;

        info!("initialized registry with {} packages", self.packages.len());
        Ok(())
    }

    /// Look up a loaded package by name
    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    /// Look up a package that callers require to be present
    pub fn package_checked(&self, name: &str) -> Result<&Package, RegistryError> {
        self.packages
            .get(name)
            .ok_or_else(|| RegistryError::PackageNotFound(name.to_string()))
    }

    /// Filesystem root of a loaded package
    pub fn package_path(&self, name: &str) -> Option<&Path> {
        self.packages.get(name).map(|p| p.root())
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(|s| s.as_str())
    }

    /// Find a pin class by its declared type name across all packages.
    ///
    /// First match wins, scanning packages in name order; type names are
    /// expected unique by convention.
    pub fn find_pin_class_by_type(&self, data_type: &str) -> Option<&PinRecord> {
        self.packages
            .values()
            .find_map(|package| package.pin_class(data_type))
    }

    /// Default value declared by the pin class for a type name
    pub fn pin_default_value(&self, data_type: &str) -> Option<PinValue> {
        self.find_pin_class_by_type(data_type)
            .map(|record| record.class().default_value())
    }

    /// Every loaded pin class across all packages
    pub fn all_pin_classes(&self) -> Vec<&PinRecord> {
        self.packages
            .values()
            .flat_map(|package| package.pin_classes().values())
            .collect()
    }

    /// Reverse lookup: a value-pin class whose internal representation is
    /// exactly the value's own type. Matches by type identity, never by
    /// structural equality.
    pub fn find_pin_class_from_value(&self, value: &dyn Any) -> Option<&PinRecord> {
        self.all_pin_classes().into_iter().find(|record| {
            record.class().is_value_pin()
                && record
                    .class()
                    .internal_data_structure()
                    .map(|internal| internal.id() == value.type_id())
                    .unwrap_or(false)
        })
    }

    /// Create a raw pin instance of the named type, or `None` when no pin
    /// class matches
    pub fn create_raw_pin(
        &self,
        name: &str,
        data_type: &str,
        direction: PinDirection,
    ) -> Option<RawPin> {
        self.find_pin_class_by_type(data_type)
            .map(|record| record.class().create_pin(name, direction))
    }

    /// Names of all pin classes whose values support hashing.
    ///
    /// Lazily recomputed on first access after being empty, which includes
    /// immediately after re-initialization. Returns a defensive copy.
    pub fn hashable_data_types(&self) -> Vec<String> {
        let mut cache = lock_cache(&self.hashable_types);
        if cache.is_empty() {
            for record in self.all_pin_classes() {
                if record.class().internal_data_structure().is_some()
                    && record.class().default_value().is_hashable()
                {
                    cache.push(record.class().data_type().to_string());
                }
            }
        }
        cache.clone()
    }
}

fn lock_cache(cache: &Mutex<Vec<String>>) -> std::sync::MutexGuard<'_, Vec<String>> {
    match cache.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::LoggingHooks;
    use crate::base::BASE_PACKAGE_NAME;

    fn base_only() -> InitOptions {
        // Keep the defaults' static base package but drop the filesystem
        // roots so tests never pick up ambient packages.
        InitOptions {
            package_roots: Vec::new(),
            additional_locations: Vec::new(),
            ..InitOptions::default()
        }
    }

    #[test]
    fn base_package_pins_reachable_by_type_name() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();

        for data_type in ["BoolPin", "IntPin", "FloatPin", "StringPin", "ExecPin"] {
            let record = registry
                .find_pin_class_by_type(data_type)
                .unwrap_or_else(|| panic!("{} not reachable", data_type));
            assert_eq!(record.package_name(), BASE_PACKAGE_NAME);
        }
    }

    #[test]
    fn pin_default_values_follow_class_hints() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();

        assert_eq!(
            registry.pin_default_value("BoolPin"),
            Some(PinValue::Bool(false))
        );
        assert_eq!(registry.pin_default_value("IntPin"), Some(PinValue::Int(0)));
        assert_eq!(registry.pin_default_value("NoSuchPin"), None);
    }

    #[test]
    fn reverse_lookup_matches_exact_type() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();

        let from_bool = registry.find_pin_class_from_value(&true).unwrap();
        assert_eq!(from_bool.class().data_type(), "BoolPin");

        let from_string = registry
            .find_pin_class_from_value(&"hi".to_string())
            .unwrap();
        assert_eq!(from_string.class().data_type(), "StringPin");

        // &str is not String; exact identity means no match
        assert!(registry.find_pin_class_from_value(&"hi").is_none());
    }

    #[test]
    fn create_raw_pin_delegates_to_class() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();

        let pin = registry
            .create_raw_pin("in0", "FloatPin", PinDirection::Input)
            .unwrap();
        assert_eq!(pin.data_type, "FloatPin");
        assert_eq!(pin.value, PinValue::Float(0.0));

        assert!(registry
            .create_raw_pin("in0", "NoSuchPin", PinDirection::Input)
            .is_none());
    }

    #[test]
    fn hashable_cache_clears_on_reinitialize_and_repopulates() {
        let options = base_only();
        let mut registry = PackageRegistry::initialize(&options, &LoggingHooks).unwrap();

        let mut first = registry.hashable_data_types();
        first.sort();
        assert_eq!(first, vec!["BoolPin", "IntPin", "StringPin"]);

        registry.reinitialize(&options, &LoggingHooks).unwrap();
        assert!(lock_cache(&registry.hashable_types).is_empty());

        let mut again = registry.hashable_data_types();
        again.sort();
        assert_eq!(again, first);
    }

    #[test]
    fn unknown_package_is_an_error_not_a_miss() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();
        let Err(err) = registry.package_checked("Nope") else {
            panic!("expected a missing-package error");
        };
        assert!(matches!(err, RegistryError::PackageNotFound(_)));
    }

    #[test]
    fn package_names_lists_every_loaded_package() {
        let registry = PackageRegistry::initialize(&base_only(), &LoggingHooks).unwrap();
        let names: Vec<&str> = registry.package_names().collect();
        assert_eq!(names, vec![BASE_PACKAGE_NAME]);
    }
}
