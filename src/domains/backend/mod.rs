//! Backend domain module.
//!
//! Tool handlers never talk HTTP themselves. They describe a [`BackendCall`]
//! and hand it to a [`BackendInvoker`]; the production invoker is
//! [`HttpBackend`], tests plug in their own.

mod error;
mod http_client;
mod invoker;

pub use error::BackendError;
pub use http_client::{HttpBackend, build_url, decode_body};
pub use invoker::{BackendCall, BackendInvoker, HttpMethod};
