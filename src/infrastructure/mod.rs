pub mod rendering;
pub mod services;
pub mod websocket;
