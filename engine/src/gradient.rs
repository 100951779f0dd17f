//! Radial backdrop gradient and its fingerprint-keyed memo cache.
//!
//! The gradient is built purely from its [`GradientKey`], so a cache hit and
//! a fresh build always produce identical output.

use std::sync::Arc;

use boxbreath_types::{Rgb, Rgba};

use crate::scene::Point;

/// Number of precomputed color samples between the inner and outer radius.
const RAMP_STEPS: usize = 64;

const INNER_ALPHA: f32 = 0.15;

/// Fingerprint of the inputs that shape the backdrop gradient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GradientKey {
    /// Box side length in hundredths of a pixel.
    size_centi: i64,
    accent: Rgb,
    left: i64,
    top: i64,
}

impl GradientKey {
    #[must_use]
    pub fn new(size: f64, accent: Rgb, left: f64, top: f64) -> Self {
        Self {
            size_centi: (size * 100.0).round() as i64,
            accent,
            left: left.round() as i64,
            top: top.round() as i64,
        }
    }

    fn size(&self) -> f64 {
        self.size_centi as f64 / 100.0
    }
}

/// Radial fade from the phase accent (center) to transparent (edge).
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    center: Point,
    inner_radius: f64,
    outer_radius: f64,
    ramp: Vec<Rgba>,
}

impl RadialGradient {
    /// Build the backdrop for a box described by `key`: centered on the box,
    /// fading from 10% to 90% of its side length.
    #[must_use]
    pub fn from_key(key: &GradientKey) -> Self {
        let size = key.size();
        let center = Point::new(
            key.left as f64 + size / 2.0,
            key.top as f64 + size / 2.0,
        );
        let inner = key.accent.with_alpha(INNER_ALPHA);
        let ramp = (0..RAMP_STEPS)
            .map(|step| inner.lerp(Rgba::TRANSPARENT, step as f32 / (RAMP_STEPS - 1) as f32))
            .collect();
        Self {
            center,
            inner_radius: size * 0.1,
            outer_radius: size * 0.9,
            ramp,
        }
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.center
    }

    #[must_use]
    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    #[must_use]
    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Color at `point`. Inside the inner radius the first stop applies;
    /// beyond the outer radius the last stop applies.
    #[must_use]
    pub fn sample(&self, point: Point) -> Rgba {
        let distance = self.center.distance(point);
        let span = self.outer_radius - self.inner_radius;
        let t = if span <= f64::EPSILON {
            if distance <= self.inner_radius { 0.0 } else { 1.0 }
        } else {
            ((distance - self.inner_radius) / span).clamp(0.0, 1.0)
        };
        let index = (t * (self.ramp.len() - 1) as f64).round() as usize;
        self.ramp
            .get(index)
            .copied()
            .unwrap_or(Rgba::TRANSPARENT)
    }
}

/// Single-entry memo of the most recent gradient.
#[derive(Debug, Default)]
pub struct GradientCache {
    entry: Option<(GradientKey, Arc<RadialGradient>)>,
    builds: u64,
}

impl GradientCache {
    /// Return the cached gradient when `key` matches, otherwise build and cache it.
    pub fn get_or_build(&mut self, key: GradientKey) -> Arc<RadialGradient> {
        if let Some((cached_key, gradient)) = &self.entry
            && *cached_key == key
        {
            return Arc::clone(gradient);
        }
        let gradient = Arc::new(RadialGradient::from_key(&key));
        self.builds += 1;
        self.entry = Some((key, Arc::clone(&gradient)));
        gradient
    }

    /// Drop the cached entry (viewport resize, session stop/complete).
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// How many gradients have been built since creation.
    #[must_use]
    pub fn builds(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use boxbreath_types::PHASE_COLORS;

    use super::*;

    fn key(size: f64) -> GradientKey {
        GradientKey::new(size, PHASE_COLORS[0], 100.2, 50.7)
    }

    #[test]
    fn key_rounds_geometry() {
        assert_eq!(key(158.401), key(158.404));
        assert_ne!(key(158.40), key(158.42));
        assert_eq!(
            GradientKey::new(10.0, PHASE_COLORS[1], 3.4, 7.6),
            GradientKey::new(10.0, PHASE_COLORS[1], 2.6, 8.4)
        );
    }

    #[test]
    fn cache_reuses_matching_key() {
        let mut cache = GradientCache::default();
        let a = cache.get_or_build(key(158.4));
        let b = cache.get_or_build(key(158.4));

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.builds(), 1);
    }

    #[test]
    fn cache_rebuilds_on_new_key_or_invalidate() {
        let mut cache = GradientCache::default();
        let a = cache.get_or_build(key(158.4));
        let b = cache.get_or_build(key(160.0));
        assert!(!Arc::ptr_eq(&a, &b));

        cache.invalidate();
        let c = cache.get_or_build(key(160.0));
        assert!(!Arc::ptr_eq(&b, &c));
        assert_eq!(*b, *c);
        assert_eq!(cache.builds(), 3);
    }

    #[test]
    fn gradient_fades_to_transparent() {
        let gradient = RadialGradient::from_key(&GradientKey::new(100.0, PHASE_COLORS[2], 0.0, 0.0));
        let center = gradient.center();

        let inner = gradient.sample(center);
        assert_eq!(inner.rgb, PHASE_COLORS[2]);
        assert!((inner.alpha - INNER_ALPHA).abs() < 1e-6);

        let outside = gradient.sample(Point::new(center.x + 500.0, center.y));
        assert_eq!(outside.alpha, 0.0);

        let mid = gradient.sample(Point::new(center.x + 50.0, center.y));
        assert!(mid.alpha > 0.0 && mid.alpha < INNER_ALPHA);
    }
}
