//! WebSocket feed clients and the data transfer objects they decode.

pub mod client_handle;
pub mod dto;
pub mod feed_client;

pub use client_handle::*;
pub use dto::*;
pub use feed_client::*;
