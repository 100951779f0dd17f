//! Paints a [`Scene`] onto the terminal cell grid.
//!
//! The radial backdrop is sampled once per cell and written as the cell
//! background. Strokes and circles go through a ratatui [`Canvas`] on top, so
//! they pick up the backdrop behind them. Scene coordinates are logical
//! pixels with y pointing down; the canvas has y pointing up.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Color,
    symbols::Marker,
    widgets::{
        Widget,
        canvas::{Canvas, Circle, Context, Line as CanvasLine},
    },
};

use boxbreath_engine::{DrawOp, Point, RadialGradient, Rgba, Scene, Viewport};

use crate::theme::{Palette, rgb};

/// Size of one terminal cell in device pixels, and the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellMetrics {
    width_px: f64,
    height_px: f64,
    pixel_ratio: f64,
}

impl CellMetrics {
    /// Assumed cell size when the terminal does not report pixel dimensions.
    pub const FALLBACK: (f64, f64) = (8.0, 16.0);

    /// Derive cell metrics from the terminal window size. Zero pixel sizes
    /// (common over ssh and in multiplexers) fall back to 8x16 cells.
    #[must_use]
    pub fn from_window(columns: u16, rows: u16, width_px: u16, height_px: u16) -> Self {
        if columns == 0 || rows == 0 || width_px == 0 || height_px == 0 {
            return Self::default();
        }
        let width = f64::from(width_px) / f64::from(columns);
        let height = f64::from(height_px) / f64::from(rows);
        Self {
            width_px: width,
            height_px: height,
            pixel_ratio: (height / Self::FALLBACK.1).max(1.0),
        }
    }

    /// Cell width in logical pixels.
    #[must_use]
    pub fn cell_width(&self) -> f64 {
        self.width_px / self.pixel_ratio
    }

    /// Cell height in logical pixels.
    #[must_use]
    pub fn cell_height(&self) -> f64 {
        self.height_px / self.pixel_ratio
    }

    /// The drawing surface covered by `area`.
    #[must_use]
    pub fn viewport(&self, area: Rect) -> Viewport {
        Viewport::new(
            f64::from(area.width) * self.cell_width(),
            f64::from(area.height) * self.cell_height(),
            self.pixel_ratio,
        )
    }

    /// Logical-pixel center of the cell at column `x`, row `y` of an area.
    #[must_use]
    pub fn cell_center(&self, x: u16, y: u16) -> Point {
        Point::new(
            (f64::from(x) + 0.5) * self.cell_width(),
            (f64::from(y) + 0.5) * self.cell_height(),
        )
    }
}

impl Default for CellMetrics {
    fn default() -> Self {
        Self {
            width_px: Self::FALLBACK.0,
            height_px: Self::FALLBACK.1,
            pixel_ratio: 1.0,
        }
    }
}

/// Widget that draws one scene into its area.
pub struct Stage<'a> {
    scene: &'a Scene,
    metrics: CellMetrics,
    palette: &'a Palette,
    ascii_only: bool,
}

impl<'a> Stage<'a> {
    #[must_use]
    pub fn new(scene: &'a Scene, metrics: CellMetrics, palette: &'a Palette) -> Self {
        Self {
            scene,
            metrics,
            palette,
            ascii_only: false,
        }
    }

    #[must_use]
    pub fn ascii_only(mut self, ascii_only: bool) -> Self {
        self.ascii_only = ascii_only;
        self
    }

    fn marker(&self) -> Marker {
        if self.ascii_only {
            Marker::Block
        } else {
            Marker::Braille
        }
    }

    /// Horizontal distance between two canvas dots, in logical pixels.
    fn dot_spacing(&self) -> f64 {
        if self.ascii_only {
            self.metrics.cell_width()
        } else {
            self.metrics.cell_width() / 2.0
        }
    }

    fn paint_backdrop(&self, gradient: &RadialGradient, area: Rect, buf: &mut Buffer) {
        let base = self.palette.canvas_base;
        for row in 0..area.height {
            for col in 0..area.width {
                let tint = gradient.sample(self.metrics.cell_center(col, row));
                let color = tint.rgb.blend_over(base, tint.alpha);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_bg(rgb(color));
                }
            }
        }
    }

    fn color(&self, rgba: Rgba) -> Color {
        rgb(rgba.rgb.blend_over(self.palette.canvas_base, rgba.alpha))
    }
}

impl Widget for Stage<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.is_empty() || self.scene.is_empty() {
            return;
        }

        for op in &self.scene.ops {
            if let DrawOp::Backdrop(gradient) = op {
                self.paint_backdrop(gradient, area, buf);
            }
        }

        let height = self.scene.viewport.height();
        let dot = self.dot_spacing();
        let canvas = Canvas::default()
            .marker(self.marker())
            .x_bounds([0.0, self.scene.viewport.width()])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for op in &self.scene.ops {
                    match op {
                        DrawOp::Backdrop(_) => {}
                        DrawOp::Stroke {
                            points,
                            closed,
                            width,
                            color,
                            glow,
                        } => {
                            if let Some(glow) = glow {
                                stroke(ctx, points, *closed, width * 2.0, dot, height, self.color(*glow));
                                ctx.layer();
                            }
                            stroke(ctx, points, *closed, *width, dot, height, self.color(*color));
                        }
                        DrawOp::Circle {
                            center,
                            radius,
                            color,
                        } => fill_circle(ctx, *center, *radius, dot, height, self.color(*color)),
                    }
                    ctx.layer();
                }
            });
        canvas.render(area, buf);
    }
}

/// Draw a polyline `width` logical pixels wide as parallel one-dot lines.
fn stroke(
    ctx: &mut Context<'_>,
    points: &[Point],
    closed: bool,
    width: f64,
    dot: f64,
    height: f64,
    color: Color,
) {
    let segments = points.windows(2).map(|pair| (pair[0], pair[1]));
    let closing = match (closed, points.first(), points.last()) {
        (true, Some(first), Some(last)) if points.len() > 2 => Some((*last, *first)),
        _ => None,
    };

    let passes = (width / dot).round().max(1.0) as i32;
    for (from, to) in segments.chain(closing) {
        let length = from.distance(to);
        if length <= f64::EPSILON {
            continue;
        }
        // Unit normal of the segment.
        let (nx, ny) = (-(to.y - from.y) / length, (to.x - from.x) / length);
        for pass in 0..passes {
            let offset = (f64::from(pass) - f64::from(passes - 1) / 2.0) * dot;
            ctx.draw(&CanvasLine::new(
                from.x + nx * offset,
                height - (from.y + ny * offset),
                to.x + nx * offset,
                height - (to.y + ny * offset),
                color,
            ));
        }
    }
}

/// Concentric rings down to the center, one dot apart.
fn fill_circle(ctx: &mut Context<'_>, center: Point, radius: f64, dot: f64, height: f64, color: Color) {
    let mut r = radius;
    loop {
        ctx.draw(&Circle {
            x: center.x,
            y: height - center.y,
            radius: r.max(0.0),
            color,
        });
        if r <= 0.0 {
            break;
        }
        r -= dot;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxbreath_engine::{PhaseKind, SceneInput, SceneRenderer};

    fn running_scene(viewport: Viewport) -> Scene {
        SceneRenderer::new().render(
            &viewport,
            &SceneInput {
                eased: 0.5,
                phase: PhaseKind::Hold,
                show_trail: true,
                complete: false,
                pulse_boost: 0.0,
                timestamp_ms: 0.0,
                reduced_motion: false,
            },
        )
    }

    #[test]
    fn metrics_fall_back_when_pixels_unknown() {
        let metrics = CellMetrics::from_window(80, 24, 0, 0);
        assert_eq!(metrics, CellMetrics::default());
        assert_eq!(metrics.cell_width(), 8.0);
        assert_eq!(metrics.cell_height(), 16.0);
    }

    #[test]
    fn hidpi_cells_report_logical_size() {
        // 20x40 device-pixel cells at ratio 2.5 get capped to 2.
        let metrics = CellMetrics::from_window(100, 50, 2000, 2000);
        let viewport = metrics.viewport(Rect::new(0, 0, 10, 5));

        assert_eq!(viewport.pixel_ratio(), 2.0);
        assert_eq!(metrics.cell_width(), 10.0);
        assert_eq!(viewport.width(), 100.0);
    }

    #[test]
    fn empty_scene_leaves_buffer_untouched() {
        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        let palette = Palette::standard();
        let scene = Scene::empty(CellMetrics::default().viewport(area));

        Stage::new(&scene, CellMetrics::default(), &palette).render(area, &mut buf);

        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn backdrop_tints_center_but_not_far_edges() {
        let area = Rect::new(0, 0, 80, 20);
        let metrics = CellMetrics::default();
        let scene = running_scene(metrics.viewport(area));
        let palette = Palette::standard();
        let mut buf = Buffer::empty(area);

        Stage::new(&scene, metrics, &palette).render(area, &mut buf);

        let base = rgb(palette.canvas_base);
        assert_eq!(buf[(0, 0)].bg, base);
        assert_ne!(buf[(40, 10)].bg, base);
    }

    #[test]
    fn running_scene_draws_marks_and_tints_cells() {
        let area = Rect::new(0, 0, 40, 20);
        let metrics = CellMetrics::default();
        let scene = running_scene(metrics.viewport(area));
        let palette = Palette::standard();
        let mut buf = Buffer::empty(area);

        Stage::new(&scene, metrics, &palette).render(area, &mut buf);

        let marked = buf.content().iter().filter(|cell| cell.symbol() != " ").count();
        assert!(marked > 0);
        let center = &buf[(20, 10)];
        assert_ne!(center.bg, Color::Reset);
    }

    #[test]
    fn ascii_stage_uses_block_marker() {
        let area = Rect::new(0, 0, 40, 20);
        let metrics = CellMetrics::default();
        let scene = running_scene(metrics.viewport(area));
        let palette = Palette::standard();
        let mut buf = Buffer::empty(area);

        Stage::new(&scene, metrics, &palette)
            .ascii_only(true)
            .render(area, &mut buf);

        assert!(
            buf.content()
                .iter()
                .all(|cell| cell.symbol() == " " || cell.symbol() == "█")
        );
    }
}
