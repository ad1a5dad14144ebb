//! HTTP surface of the eviloauth capture listener.
//!
//! Every handler is a thin wrapper around a capture operation of the `eviloauth`
//! crate; the router only adds tracing, templating and status mapping.

mod error;
mod handlers;
mod router;

pub use error::{ApiReply, IntoResponseError};
pub use router::{capture_router, capture_router_no_trace};
