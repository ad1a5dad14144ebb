mod exchange;
mod session;

pub use exchange::{exchange_code_for_token, refresh_access_token};
