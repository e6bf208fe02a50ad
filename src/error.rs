//! Error types for package loading and node resolution

use thiserror::Error;

/// Errors surfaced by the registry itself.
///
/// Per-package load failures are not represented here: they are isolated
/// inside the loader and reported through
/// [`RegistrationHooks::report_load_error`](crate::hooks::RegistrationHooks::report_load_error).
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two packages claim the same internal value representation. Fatal to
    /// initialization: the conflict cannot be resolved by load order.
    #[error(
        "pin from package '{package}' claims internal data type {data_type} \
         already registered by package '{existing_package}'"
    )]
    DuplicateInternalType {
        package: String,
        existing_package: String,
        data_type: &'static str,
    },

    /// A caller named a package that is not in the registry
    #[error("package '{0}' is not loaded")]
    PackageNotFound(String),

    /// Filesystem failure during a script/compound directory walk
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Import or construction of a single package failed.
///
/// Never escapes the loader; converted into an error-hook report so the
/// remaining packages keep loading.
#[derive(Debug, Error)]
#[error("error on package '{package}': {message}")]
pub struct PackageLoadError {
    pub package: String,
    pub message: String,
}
