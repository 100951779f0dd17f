//! Scene renderer: turns a sampled frame into box geometry and draw
//! operations. Output depends only on the inputs; the gradient cache is a
//! memo of [`RadialGradient::from_key`].

use std::sync::Arc;

use boxbreath_types::{OUTLINE_COLOR, PHASE_COUNT, PhaseKind, Rgb, Rgba, phase_color};

use crate::gradient::{GradientCache, GradientKey, RadialGradient};

/// Fraction of the smaller viewport dimension used for the box side.
const BOX_SCALE: f64 = 0.55;
/// Total horizontal/vertical margin kept around the box.
const MARGIN: f64 = 60.0;
const MAX_VERTICAL_OFFSET: f64 = 80.0;
/// Period divisor (ms) of the idle oscillation during Hold and Wait.
const IDLE_PERIOD_MS: f64 = 300.0;
const IDLE_AMPLITUDE: f64 = 0.02;

const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Drawing surface size in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    width: f64,
    height: f64,
    pixel_ratio: f64,
}

impl Viewport {
    pub const MAX_PIXEL_RATIO: f64 = 2.0;

    /// Negative or non-finite sizes collapse to zero; the pixel ratio is
    /// capped at [`Viewport::MAX_PIXEL_RATIO`] and defaults to 1.
    #[must_use]
    pub fn new(width: f64, height: f64, pixel_ratio: f64) -> Self {
        let sanitize = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
        let pixel_ratio = if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            pixel_ratio.min(Self::MAX_PIXEL_RATIO)
        } else {
            1.0
        };
        Self {
            width: sanitize(width),
            height: sanitize(height),
            pixel_ratio,
        }
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }

    /// Backing-store size in device pixels.
    #[must_use]
    pub fn device_size(&self) -> (u32, u32) {
        (
            (self.width * self.pixel_ratio).floor() as u32,
            (self.height * self.pixel_ratio).floor() as u32,
        )
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneInput {
    pub eased: f64,
    pub phase: PhaseKind,
    /// Draw the traced edge and the moving indicator.
    pub show_trail: bool,
    /// Draw the trail as a closed loop with no indicator.
    pub complete: bool,
    pub pulse_boost: f64,
    /// Milliseconds since an arbitrary fixed origin; drives idle oscillation.
    pub timestamp_ms: f64,
    pub reduced_motion: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxGeometry {
    /// Side length before breath and pulse scaling.
    pub base_size: f64,
    pub size: f64,
    pub left: f64,
    pub top: f64,
    /// Bottom-left, top-left, top-right, bottom-right.
    pub corners: [Point; PHASE_COUNT],
    pub indicator: Point,
    pub breath_influence: f64,
    pub pulse_boost: f64,
}

impl BoxGeometry {
    /// Lay out the box for `input` inside `viewport`. `None` when the
    /// viewport has no area.
    #[must_use]
    pub fn compute(viewport: &Viewport, input: &SceneInput) -> Option<Self> {
        if viewport.is_empty() {
            return None;
        }
        let smaller = viewport.width.min(viewport.height);
        let base_size = (smaller * BOX_SCALE).min(smaller - MARGIN).max(0.0);
        let vertical_offset = (viewport.height * 0.12).min(MAX_VERTICAL_OFFSET);
        let base_left = (viewport.width - base_size) / 2.0;
        let base_top = (viewport.height - base_size) / 2.0 + vertical_offset;

        let breath_influence = breath_influence(input);
        let pulse_boost = if input.reduced_motion {
            0.0
        } else {
            input.pulse_boost
        };
        let size = base_size * (1.0 + 0.1 * breath_influence + 0.02 * pulse_boost);
        let left = base_left + (base_size - size) / 2.0;
        let top = base_top + (base_size - size) / 2.0;

        let corners = [
            Point::new(left, top + size),
            Point::new(left, top),
            Point::new(left + size, top),
            Point::new(left + size, top + size),
        ];
        let from = corners[input.phase.index()];
        let to = corners[input.phase.next().index()];
        let indicator = from.lerp(to, input.eased.clamp(0.0, 1.0));

        Some(Self {
            base_size,
            size,
            left,
            top,
            corners,
            indicator,
            breath_influence,
            pulse_boost,
        })
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.left + self.size / 2.0, self.top + self.size / 2.0)
    }
}

fn breath_influence(input: &SceneInput) -> f64 {
    let idle = if input.reduced_motion {
        0.0
    } else {
        IDLE_AMPLITUDE * (input.timestamp_ms / IDLE_PERIOD_MS).sin()
    };
    match input.phase {
        PhaseKind::Inhale => input.eased,
        PhaseKind::Hold => 1.0 + idle,
        PhaseKind::Exhale => 1.0 - input.eased,
        PhaseKind::Wait => idle,
    }
}

/// One primitive drawing instruction, in paint order.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Fill the whole surface with a radial gradient.
    Backdrop(Arc<RadialGradient>),
    Stroke {
        points: Vec<Point>,
        closed: bool,
        width: f64,
        color: Rgba,
        /// Soft halo in the same hue, absent under reduced motion.
        glow: Option<Rgba>,
    },
    Circle {
        center: Point,
        radius: f64,
        color: Rgba,
    },
}

/// A rendered frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub viewport: Viewport,
    pub geometry: Option<BoxGeometry>,
    pub accent: Option<Rgb>,
    pub ops: Vec<DrawOp>,
}

impl Scene {
    /// A cleared surface.
    #[must_use]
    pub fn empty(viewport: Viewport) -> Self {
        Self {
            viewport,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct SceneRenderer {
    gradients: GradientCache,
}

impl SceneRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, viewport: &Viewport, input: &SceneInput) -> Scene {
        let Some(geometry) = BoxGeometry::compute(viewport, input) else {
            return Scene::empty(*viewport);
        };
        let accent = phase_color(input.phase);
        let allow_motion = !input.reduced_motion;
        let size = geometry.size;
        let mut ops = Vec::with_capacity(PHASE_COUNT + 5);

        let key = GradientKey::new(size, accent, geometry.left, geometry.top);
        ops.push(DrawOp::Backdrop(self.gradients.get_or_build(key)));

        ops.push(DrawOp::Stroke {
            points: geometry.corners.to_vec(),
            closed: true,
            width: (size * 0.01).max(2.0),
            color: OUTLINE_COLOR.with_alpha(0.15),
            glow: None,
        });

        if input.show_trail {
            ops.push(DrawOp::Stroke {
                points: trail_points(&geometry, input),
                closed: input.complete,
                width: (size * 0.025).max(3.0),
                color: accent.with_alpha(0.9),
                glow: allow_motion.then(|| accent.with_alpha(0.6)),
            });
        }

        let corner_radius = (size * 0.02).max(4.0);
        for (i, corner) in geometry.corners.iter().enumerate() {
            let color = if i <= input.phase.index() {
                phase_color(PhaseKind::from_index(i)).with_alpha(0.8)
            } else {
                OUTLINE_COLOR.with_alpha(0.3)
            };
            ops.push(DrawOp::Circle {
                center: *corner,
                radius: corner_radius,
                color,
            });
        }

        if input.show_trail && !input.complete {
            let radius = (size * 0.04).max(8.0)
                * (1.0 + 0.3 * geometry.breath_influence + 0.15 * geometry.pulse_boost);
            let at = geometry.indicator;
            ops.push(DrawOp::Circle {
                center: at,
                radius: radius * 2.0,
                color: accent.with_alpha(0.2),
            });
            ops.push(DrawOp::Circle {
                center: at,
                radius,
                color: accent.with_alpha(1.0),
            });
            ops.push(DrawOp::Circle {
                center: Point::new(at.x - radius * 0.2, at.y - radius * 0.2),
                radius: radius * 0.3,
                color: WHITE.with_alpha(0.4),
            });
        }

        Scene {
            viewport: *viewport,
            geometry: Some(geometry),
            accent: Some(accent),
            ops,
        }
    }

    /// Forget the cached gradient.
    pub fn invalidate(&mut self) {
        self.gradients.invalidate();
    }

    #[must_use]
    pub fn gradient_builds(&self) -> u64 {
        self.gradients.builds()
    }
}

/// Path from the first corner through every corner reached so far, ending at
/// the indicator (or closing the loop once complete).
fn trail_points(geometry: &BoxGeometry, input: &SceneInput) -> Vec<Point> {
    let reached = if input.complete {
        PHASE_COUNT - 1
    } else {
        input.phase.index()
    };
    let mut points: Vec<Point> = geometry.corners[..=reached].to_vec();
    if !input.complete {
        points.push(geometry.indicator);
    }
    points
}
