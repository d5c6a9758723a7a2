//! Backend adapters: the HTTP implementation of the
//! [`DocumentBackend`](insight_application::DocumentBackend) port.

mod http;
mod wire;

pub use http::HttpDocumentBackend;
