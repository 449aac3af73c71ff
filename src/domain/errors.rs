use derive_more::Display;

/// Why an inbound frame or connection could not be folded into the session.
///
/// Every variant is recoverable: the frame is dropped and the dashboard keeps
/// running.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum FeedError {
    #[display(fmt = "Malformed frame: {}", _0)]
    Malformed(String),
    #[display(fmt = "Frame has no event type")]
    MissingEventType,
    #[display(fmt = "Unknown event type: {}", _0)]
    UnknownEventType(String),
    /// Upstream reply to a subscribe request, e.g. `{"result":null,"id":1}`
    #[display(fmt = "Control reply to request {}", _0)]
    ControlReply(String),
    #[display(fmt = "Invalid payload: {}", _0)]
    InvalidPayload(String),
    #[display(fmt = "Invalid number in {}: {:?}", field, value)]
    InvalidNumber { field: &'static str, value: String },
    #[display(fmt = "Connection error: {}", _0)]
    Connection(String),
}

impl std::error::Error for FeedError {}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Malformed(err.to_string())
    }
}

/// Canvas access and drawing failures.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum RenderError {
    #[display(fmt = "Canvas unavailable: {}", _0)]
    CanvasUnavailable(String),
    #[display(fmt = "2D context unavailable: {}", _0)]
    ContextUnavailable(String),
    #[display(fmt = "Draw call failed: {}", _0)]
    DrawFailed(String),
}

impl std::error::Error for RenderError {}

pub type FeedResult<T> = Result<T, FeedError>;
pub type RenderResult<T> = Result<T, RenderError>;
