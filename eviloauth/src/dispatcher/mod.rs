mod command;
mod core;
mod errors;
mod help;

pub use command::{Command, IdpOverrides, TokenField, VERBS};
pub use core::{Dispatcher, Outcome};
pub use errors::DispatchError;
