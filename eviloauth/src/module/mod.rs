mod azure;
mod errors;
mod registry;
mod types;

pub use azure::ReadMail;
pub use errors::ModuleError;
pub use registry::{ModuleRegistry, builtin_modules};
pub use types::Module;
