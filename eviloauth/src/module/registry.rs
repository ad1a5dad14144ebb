use std::collections::BTreeMap;
use std::sync::Arc;

use super::azure::ReadMail;
use super::types::Module;

/// Modules compiled into the binary, before `load`.
pub fn builtin_modules() -> Vec<Arc<dyn Module>> {
    vec![Arc::new(ReadMail::new())]
}

/// Loaded modules keyed by `<module_name>.<sub_module_name>`.
#[derive(Clone, Default)]
pub struct ModuleRegistry {
    modules: BTreeMap<String, Arc<dyn Module>>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ModuleRegistry {
    /// Call `load` on every candidate and keep the ones that succeed.
    pub async fn load(candidates: Vec<Arc<dyn Module>>) -> Self {
        let mut modules = BTreeMap::new();
        for module in candidates {
            let name = module.qualified_name();
            match module.load().await {
                Ok(()) => {
                    tracing::info!(module = %name, "Module loaded");
                    modules.insert(name, module);
                }
                Err(e) => {
                    tracing::warn!(module = %name, error = %e, "Module failed to load, skipping");
                }
            }
        }
        Self { modules }
    }

    pub fn get(&self, module_name: &str, sub_module_name: &str) -> Option<Arc<dyn Module>> {
        self.modules
            .get(&format!("{module_name}.{sub_module_name}"))
            .cloned()
    }

    /// Qualified names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.modules.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Module>> {
        self.modules.values()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}
