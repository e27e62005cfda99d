//! Axis-aligned bounding boxes
//!
//! Overlap uses half-open intervals: boxes whose edges merely touch do not
//! collide.

use glam::Vec2;
use serde::Serialize;

use crate::error::SimError;

/// An axis-aligned rectangle in playfield coordinates (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hitbox {
    /// Top-left corner
    min: Vec2,
    /// Width and height, never negative
    size: Vec2,
}

impl Hitbox {
    /// Build a box from its top-left corner and extents
    pub fn new(top_left: Vec2, width: f32, height: f32) -> Result<Self, SimError> {
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !valid(width) || !valid(height) {
            return Err(SimError::InvalidDimensions { width, height });
        }
        Ok(Self {
            min: top_left,
            size: Vec2::new(width, height),
        })
    }

    /// Box for extents that were already validated (sprite sizes)
    pub(crate) fn from_extents(top_left: Vec2, size: Vec2) -> Self {
        debug_assert!(size.is_finite() && size.min_element() >= 0.0);
        Self {
            min: top_left,
            size,
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.min
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Re-center the box on the given point, keeping its extents
    pub fn set_position(&mut self, center: Vec2) {
        self.min = center - self.size / 2.0;
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.min.x + self.size.x
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.min.y + self.size.y
    }

    /// Center point of the box
    pub fn center(&self) -> Vec2 {
        self.min + self.size / 2.0
    }

    /// True iff the projections overlap on both axes
    pub fn is_colliding(&self, other: &Hitbox) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_rejects_negative_dimensions() {
        assert!(matches!(
            Hitbox::new(Vec2::ZERO, -1.0, 10.0),
            Err(SimError::InvalidDimensions { .. })
        ));
        assert!(Hitbox::new(Vec2::ZERO, 10.0, f32::NAN).is_err());
        assert!(Hitbox::new(Vec2::ZERO, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_set_position_recenters() {
        let mut hb = Hitbox::new(Vec2::new(0.0, 0.0), 20.0, 10.0).unwrap();
        hb.set_position(Vec2::new(100.0, 50.0));
        assert_eq!(hb.min(), Vec2::new(90.0, 45.0));
        assert_eq!(hb.center(), Vec2::new(100.0, 50.0));
        assert_eq!(hb.size(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_overlap() {
        let a = Hitbox::new(Vec2::new(0.0, 0.0), 10.0, 10.0).unwrap();
        let b = Hitbox::new(Vec2::new(5.0, 5.0), 10.0, 10.0).unwrap();
        let c = Hitbox::new(Vec2::new(20.0, 0.0), 10.0, 10.0).unwrap();
        assert!(a.is_colliding(&b));
        assert!(!a.is_colliding(&c));
    }

    #[test]
    fn test_touching_edges_do_not_collide() {
        let a = Hitbox::new(Vec2::new(0.0, 0.0), 10.0, 10.0).unwrap();
        let right = Hitbox::new(Vec2::new(10.0, 0.0), 10.0, 10.0).unwrap();
        let below = Hitbox::new(Vec2::new(0.0, 10.0), 10.0, 10.0).unwrap();
        assert!(!a.is_colliding(&right));
        assert!(!a.is_colliding(&below));
    }

    proptest! {
        #[test]
        fn prop_overlap_is_symmetric(
            ax in -500.0f32..500.0, ay in -500.0f32..500.0,
            aw in 0.0f32..200.0, ah in 0.0f32..200.0,
            bx in -500.0f32..500.0, by in -500.0f32..500.0,
            bw in 0.0f32..200.0, bh in 0.0f32..200.0,
        ) {
            let a = Hitbox::new(Vec2::new(ax, ay), aw, ah).unwrap();
            let b = Hitbox::new(Vec2::new(bx, by), bw, bh).unwrap();
            prop_assert_eq!(a.is_colliding(&b), b.is_colliding(&a));
        }
    }
}
