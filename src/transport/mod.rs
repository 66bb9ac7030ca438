//! HTTP transport.
//!
//! Everything here is a single exchange: build the request, send it, hand
//! back the response head with the body still open. Admission, retries and
//! status classification belong to the client's dispatcher.

pub mod http;

pub use http::{HttpTransport, TransportError};
