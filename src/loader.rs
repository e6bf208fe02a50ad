//! Package loading from static constructors and shared libraries

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use libloading::{Library, Symbol};
use log::{debug, info, warn};

use crate::error::{PackageLoadError, RegistryError};
use crate::hooks::RegistrationHooks;
use crate::package::{Package, PackageDescriptor, ANY_SOFTWARE};

/// Symbol a dynamic package library must export
pub const CREATE_PACKAGE_SYMBOL: &[u8] = b"pyflow_create_package";

/// C-ABI handle returned by a dynamic package's constructor symbol.
///
/// Packages built as shared libraries wrap their descriptor with
/// [`PackageHandle::new`] inside an `extern "C" fn pyflow_create_package()`.
#[repr(C)]
pub struct PackageHandle {
    raw: *mut Box<dyn PackageDescriptor>,
}

impl PackageHandle {
    pub fn new(descriptor: Box<dyn PackageDescriptor>) -> Self {
        Self {
            raw: Box::into_raw(Box::new(descriptor)),
        }
    }

    /// Reclaim the descriptor from the raw handle.
    ///
    /// # Safety
    ///
    /// The handle must come from [`PackageHandle::new`] in a library built
    /// against the same crate version, and must not be consumed twice.
    pub unsafe fn into_descriptor(self) -> Box<dyn PackageDescriptor> {
        *Box::from_raw(self.raw)
    }
}

/// Fallible zero-argument package constructor
pub type PackageConstructor = fn() -> Result<Box<dyn PackageDescriptor>, String>;

/// A package registered from compiled-in code rather than discovered on
/// disk. Covers built-in packages and test fixtures.
#[derive(Clone)]
pub struct StaticPackage {
    pub name: String,
    pub root: PathBuf,
    pub constructor: PackageConstructor,
}

impl StaticPackage {
    pub fn new(name: &str, root: PathBuf, constructor: PackageConstructor) -> Self {
        Self {
            name: name.to_string(),
            root,
            constructor,
        }
    }
}

/// Construct and record every static package, isolating failures per package
pub(crate) fn load_static_packages(
    static_packages: &[StaticPackage],
    packages: &mut BTreeMap<String, Package>,
    hooks: &dyn RegistrationHooks,
) {
    for static_package in static_packages {
        match (static_package.constructor)() {
            Ok(descriptor) => {
                info!("loading package: {}", static_package.name);
                record_package(
                    packages,
                    Package::from_descriptor(
                        &static_package.name,
                        &static_package.root,
                        descriptor.as_ref(),
                        None,
                    ),
                );
            }
            Err(message) => {
                let err = PackageLoadError {
                    package: static_package.name.clone(),
                    message,
                };
                hooks.report_load_error(&err.package, &err.message);
            }
        }
    }
}

/// Scan the resolved package paths and load every dynamic package found.
///
/// Each immediate subdirectory of a packages path is a candidate named by
/// its directory name; a broken package is reported and skipped, never
/// aborting the rest of the scan.
pub(crate) fn load_dynamic_packages(
    package_paths: &[PathBuf],
    packages: &mut BTreeMap<String, Package>,
    hooks: &dyn RegistrationHooks,
) {
    for packages_dir in package_paths {
        let entries = match fs::read_dir(packages_dir) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(
                    "cannot scan packages path {}: {}",
                    packages_dir.display(),
                    err
                );
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let name = match path.file_name().and_then(|n| n.to_str()) {
                Some(name) => name.to_string(),
                None => continue,
            };
            match load_dynamic_package(&path, &name) {
                Ok(Some(package)) => {
                    info!("loading package: {}", name);
                    record_package(packages, package);
                }
                Ok(None) => {
                    debug!("no package library under {}", path.display());
                }
                Err(err) => {
                    hooks.report_load_error(&err.package, &err.message);
                }
            }
        }
    }
}

/// Import one package directory, `Ok(None)` when it holds no library
fn load_dynamic_package(dir: &Path, name: &str) -> Result<Option<Package>, PackageLoadError> {
    let Some(lib_path) = find_package_library(dir) else {
        return Ok(None);
    };

    let library = unsafe {
        Library::new(&lib_path).map_err(|e| load_error(name, format!("failed to load library: {}", e)))?
    };

    let descriptor = {
        let create_package: Symbol<unsafe extern "C" fn() -> PackageHandle> = unsafe {
            library
                .get(CREATE_PACKAGE_SYMBOL)
                .map_err(|e| load_error(name, format!("missing pyflow_create_package symbol: {}", e)))?
        };
        let handle = unsafe { create_package() };
        unsafe { handle.into_descriptor() }
    };

    Ok(Some(Package::from_descriptor(
        name,
        dir,
        descriptor.as_ref(),
        Some(library),
    )))
}

fn load_error(package: &str, message: String) -> PackageLoadError {
    PackageLoadError {
        package: package.to_string(),
        message,
    }
}

fn record_package(packages: &mut BTreeMap<String, Package>, package: Package) {
    if let Some(previous) = packages.insert(package.name().to_string(), package) {
        warn!("package '{}' loaded twice, keeping the later one", previous.name());
    }
}

/// Find the shared library inside a package directory
fn find_package_library(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .flatten()
        .map(|entry| entry.path())
        .find(|path| is_package_library(path))
}

fn is_package_library(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("dll") | Some("so") | Some("dylib")
    )
}

/// Cross-package pass run once after all packages are loaded.
///
/// Stamps ownership onto every exported class, enforces global uniqueness
/// of internal value representations, and hands factories and supported
/// tools to the registration hooks.
pub(crate) fn post_load(
    packages: &mut BTreeMap<String, Package>,
    software: &str,
    hooks: &dyn RegistrationHooks,
) -> Result<(), RegistryError> {
    let mut claimed: HashMap<TypeId, (String, &'static str)> = HashMap::new();

    for (name, package) in packages.iter_mut() {
        package.stamp_exports();

        for record in package.pin_classes().values() {
            if !record.class().is_value_pin() {
                continue;
            }
            let Some(internal) = record.class().internal_data_structure() else {
                continue;
            };
            if let Some((existing_package, data_type)) = claimed.get(&internal.id()) {
                return Err(RegistryError::DuplicateInternalType {
                    package: name.clone(),
                    existing_package: existing_package.clone(),
                    data_type: *data_type,
                });
            }
            claimed.insert(internal.id(), (name.clone(), internal.name()));
        }

        if let Some(factory) = package.ui_pins_factory() {
            hooks.register_pin_factory(name, factory);
        }
        if let Some(factory) = package.pin_input_widgets_factory() {
            hooks.register_input_widget_factory(name, factory);
        }
        if let Some(factory) = package.ui_nodes_factory() {
            hooks.register_node_factory(name, factory);
        }

        for tool in package.tool_classes().values() {
            let supported = tool.supported_softwares();
            if !supported.iter().any(|s| s == ANY_SOFTWARE)
                && !supported.iter().any(|s| s == software)
            {
                debug!(
                    "tool '{}' from package '{}' does not support '{}', skipping",
                    tool.name(),
                    name,
                    software
                );
                continue;
            }
            hooks.register_tool(name, tool.clone());
        }
    }

    Ok(())
}
