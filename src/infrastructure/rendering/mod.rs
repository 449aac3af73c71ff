pub mod canvas_renderer;

pub use canvas_renderer::{CanvasRenderer, draw_chart};
