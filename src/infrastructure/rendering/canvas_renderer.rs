use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::domain::{
    errors::{RenderError, RenderResult},
    logging::{LogComponent, get_logger},
    state::CandleSeries,
};
use crate::presentation::projection::{CandleGeometry, ChartLayout, ChartModel, PLACEHOLDER};
use crate::time_utils::WallClock;

const BACKGROUND: &str = "#1a1a1a";
const BULLISH: &str = "#00ff88";
const BEARISH: &str = "#ff4444";
const WICK: &str = "#888888";
const LABEL: &str = "#aaaaaa";
const LAST_CLOSE: &str = "#ffd166";

/// Canvas 2D candlestick chart
pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
    layout: ChartLayout,
}

impl CanvasRenderer {
    /// Size the canvas and grab its 2D context
    pub fn attach(canvas: &HtmlCanvasElement, width: u32, height: u32) -> RenderResult<Self> {
        canvas.set_width(width);
        canvas.set_height(height);

        let context = canvas
            .get_context("2d")
            .map_err(|e| RenderError::ContextUnavailable(format!("{e:?}")))?
            .ok_or_else(|| RenderError::ContextUnavailable("2d context not supported".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| RenderError::ContextUnavailable("Failed to cast to 2D context".to_string()))?;

        Ok(Self { context, layout: ChartLayout::new(width, height) })
    }

    /// Redraw the whole chart from the candle series
    pub fn render(&self, series: &CandleSeries, clock: &dyn WallClock) -> RenderResult<()> {
        self.clear();

        let Some(model) = ChartModel::project(series, self.layout, clock) else {
            return self.render_placeholder();
        };

        crate::log_trace!(
            LogComponent::Infrastructure("CanvasRenderer"),
            "Rendering {} candles",
            model.candles.len()
        );

        for candle in &model.candles {
            self.render_candle(candle);
        }
        self.render_price_scale(&model)?;
        self.render_last_close(&model)?;
        self.render_time_labels(&model)?;
        Ok(())
    }

    fn clear(&self) {
        let ctx = &self.context;
        ctx.clear_rect(0.0, 0.0, self.layout.width, self.layout.height);
        ctx.set_fill_style_str(BACKGROUND);
        ctx.fill_rect(0.0, 0.0, self.layout.width, self.layout.height);
    }

    fn render_candle(&self, candle: &CandleGeometry) {
        let ctx = &self.context;

        ctx.set_stroke_style_str(WICK);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(candle.x, candle.high_y);
        ctx.line_to(candle.x, candle.low_y);
        ctx.stroke();

        let color = if candle.is_bullish { BULLISH } else { BEARISH };
        ctx.set_fill_style_str(color);
        ctx.set_stroke_style_str(color);

        let left = candle.x - candle.body_width / 2.0;
        if candle.body_height() < 1.0 {
            // Doji
            ctx.begin_path();
            ctx.move_to(left, candle.open_y);
            ctx.line_to(left + candle.body_width, candle.open_y);
            ctx.stroke();
        } else if candle.is_bullish {
            ctx.stroke_rect(left, candle.body_top(), candle.body_width, candle.body_height());
        } else {
            ctx.fill_rect(left, candle.body_top(), candle.body_width, candle.body_height());
        }
    }

    fn render_price_scale(&self, model: &ChartModel) -> RenderResult<()> {
        let ctx = &self.context;
        ctx.set_fill_style_str(LABEL);
        ctx.set_font("12px Arial");
        ctx.fill_text(&format!("{:.2}", model.scale.max_price), 4.0, self.layout.padding + 12.0)
            .map_err(draw_failed)?;
        ctx.fill_text(&format!("{:.2}", model.scale.min_price), 4.0, self.layout.plot_bottom())
            .map_err(draw_failed)
    }

    fn render_last_close(&self, model: &ChartModel) -> RenderResult<()> {
        let ctx = &self.context;
        let line = model.last_close;

        ctx.set_stroke_style_str(LAST_CLOSE);
        ctx.set_line_width(1.0);
        ctx.begin_path();
        ctx.move_to(self.layout.padding, line.y);
        ctx.line_to(self.layout.plot_right(), line.y);
        ctx.stroke();

        ctx.set_fill_style_str(LAST_CLOSE);
        ctx.fill_text(&format!("{:.2}", line.price), self.layout.plot_right() + 10.0, line.y + 4.0)
            .map_err(draw_failed)
    }

    fn render_time_labels(&self, model: &ChartModel) -> RenderResult<()> {
        let ctx = &self.context;
        let y = self.layout.plot_bottom() + 20.0;
        ctx.set_fill_style_str(LABEL);
        ctx.set_font("12px Arial");
        ctx.fill_text(&model.first_label, self.layout.padding, y).map_err(draw_failed)?;
        if model.last_label != model.first_label {
            ctx.fill_text(&model.last_label, self.layout.plot_right() - 30.0, y)
                .map_err(draw_failed)?;
        }
        Ok(())
    }

    fn render_placeholder(&self) -> RenderResult<()> {
        let ctx = &self.context;
        ctx.set_fill_style_str("#ffffff");
        ctx.set_font("16px Arial");
        ctx.fill_text(PLACEHOLDER, self.layout.padding, self.layout.height / 2.0)
            .map_err(draw_failed)
    }
}

fn draw_failed(e: JsValue) -> RenderError {
    RenderError::DrawFailed(format!("{e:?}"))
}

/// Draw `series` onto `canvas`, logging instead of failing.
pub fn draw_chart(canvas: &HtmlCanvasElement, series: &CandleSeries, clock: &dyn WallClock, width: u32, height: u32) {
    let result = CanvasRenderer::attach(canvas, width, height).and_then(|r| r.render(series, clock));
    if let Err(e) = result {
        get_logger().error(LogComponent::Infrastructure("CanvasRenderer"), &format!("❌ {e}"));
    }
}
