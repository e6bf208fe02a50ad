//! Registration hooks handed to the UI layer during initialization

use std::sync::Arc;

use log::{debug, error};

use crate::package::{ToolClass, UiFactory};

/// Callbacks the host application supplies to receive per-package UI
/// factories, tools and load-error reports.
///
/// Each registration method is called at most once per package per
/// initialization, and only when the package supplies the corresponding
/// factory or tool. The core does not prescribe how load errors are
/// surfaced; hosts may log, collect or abort.
pub trait RegistrationHooks {
    /// A package failed to import or construct; loading continues without it
    fn report_load_error(&self, package: &str, message: &str);

    fn register_pin_factory(&self, package: &str, factory: Arc<dyn UiFactory>);

    fn register_input_widget_factory(&self, package: &str, factory: Arc<dyn UiFactory>);

    fn register_node_factory(&self, package: &str, factory: Arc<dyn UiFactory>);

    fn register_tool(&self, package: &str, tool: Arc<dyn ToolClass>);
}

/// Default hooks for headless hosts: log every callback and drop it
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHooks;

impl RegistrationHooks for LoggingHooks {
    fn report_load_error(&self, package: &str, message: &str) {
        error!("failed to load package '{}': {}", package, message);
    }

    fn register_pin_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        debug!("dropping pin factory from package '{}'", package);
    }

    fn register_input_widget_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        debug!("dropping input widget factory from package '{}'", package);
    }

    fn register_node_factory(&self, package: &str, _factory: Arc<dyn UiFactory>) {
        debug!("dropping node factory from package '{}'", package);
    }

    fn register_tool(&self, package: &str, tool: Arc<dyn ToolClass>) {
        debug!("dropping tool '{}' from package '{}'", tool.name(), package);
    }
}
