//! Delivery of article records to the downstream storage service
//!
//! The sink is an external collaborator reachable over HTTP. It answers 201
//! for a stored article and 409 for one it already has; everything else is
//! a rejection.

mod http_sink;
mod traits;

pub use http_sink::HttpSink;
pub use traits::{ArticleSink, DeliveryResult};
