mod core;
mod errors;
mod types;

pub use core::{capture_access_token, capture_authorization_code, final_destination};
pub use errors::CaptureError;
pub use types::{CallbackPayload, CapturedCode, HookParams};

pub(crate) use core::store_token_response;
