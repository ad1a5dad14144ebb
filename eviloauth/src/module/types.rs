use async_trait::async_trait;

use super::errors::ModuleError;

/// A follow-on action run with a captured bearer token.
///
/// Modules are registered under `<module_name>.<sub_module_name>`. `run` receives
/// the raw bearer string of the current target and the words typed after the
/// sub-module name, and returns the text to show the operator.
#[async_trait]
pub trait Module: Send + Sync + 'static {
    fn module_name(&self) -> &'static str;

    fn sub_module_name(&self) -> &'static str;

    /// One line shown by `help module`.
    fn description(&self) -> &'static str {
        ""
    }

    fn qualified_name(&self) -> String {
        format!("{}.{}", self.module_name(), self.sub_module_name())
    }

    /// Called once at startup. An error drops only this module from the registry.
    async fn load(&self) -> Result<(), ModuleError>;

    async fn run(&self, raw_token: &str, args: &[String]) -> Result<String, ModuleError>;
}
