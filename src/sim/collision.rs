//! Axis-aligned collision between the hen and obstacles
//!
//! Everything in the scene is a rectangle, so the judge is a strict
//! open-interval overlap test: boxes that merely share an edge or a corner
//! do not collide. A grazing landing on top of an obstacle is a miss.

use glam::Vec2;

/// Axis-aligned box; `pos` is the top-left corner, y grows downward
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    /// Strict overlap on both axes; shared edges are not hits
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }
}

/// First-hit check against every live obstacle box
///
/// One hit ends the round, so there is no need to collect the full set.
pub fn hits_any<I>(actor: &Aabb, boxes: I) -> bool
where
    I: IntoIterator<Item = Aabb>,
{
    boxes.into_iter().any(|b| actor.overlaps(&b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aabb(x: f32, y: f32, w: f32, h: f32) -> Aabb {
        Aabb::new(Vec2::new(x, y), Vec2::new(w, h))
    }

    #[test]
    fn test_overlap_hit() {
        let hen = aabb(100.0, 100.0, 40.0, 40.0);
        let block = aabb(120.0, 120.0, 40.0, 60.0);
        assert!(hen.overlaps(&block));
        assert!(block.overlaps(&hen));
    }

    #[test]
    fn test_contained_box_hits() {
        let hen = aabb(100.0, 100.0, 40.0, 40.0);
        let pebble = aabb(110.0, 110.0, 5.0, 5.0);
        assert!(hen.overlaps(&pebble));
    }

    #[test]
    fn test_edge_touch_is_not_a_hit() {
        let hen = aabb(100.0, 100.0, 40.0, 40.0);

        // Shared vertical edge: hen.right == block.left
        assert!(!hen.overlaps(&aabb(140.0, 100.0, 40.0, 40.0)));
        // Shared vertical edge on the other side
        assert!(!hen.overlaps(&aabb(60.0, 100.0, 40.0, 40.0)));
        // Hen resting exactly on top: hen.bottom == block.top
        assert!(!hen.overlaps(&aabb(100.0, 140.0, 40.0, 40.0)));
        // Block ceiling exactly at hen top
        assert!(!hen.overlaps(&aabb(100.0, 60.0, 40.0, 40.0)));
        // Shared corner only
        assert!(!hen.overlaps(&aabb(140.0, 140.0, 40.0, 40.0)));
    }

    #[test]
    fn test_separated_miss() {
        let hen = aabb(100.0, 100.0, 40.0, 40.0);
        assert!(!hen.overlaps(&aabb(500.0, 100.0, 40.0, 40.0)));
        assert!(!hen.overlaps(&aabb(100.0, 300.0, 40.0, 40.0)));
    }

    #[test]
    fn test_hits_any_first_hit() {
        let hen = aabb(100.0, 100.0, 40.0, 40.0);
        let boxes = vec![
            aabb(500.0, 100.0, 40.0, 40.0),
            aabb(130.0, 130.0, 40.0, 40.0),
        ];
        assert!(hits_any(&hen, boxes));
        assert!(!hits_any(&hen, std::iter::empty()));
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Overlap is symmetric for arbitrary boxes.
            #[test]
            fn overlap_symmetric_prop(
                ax in -500.0f32..500.0, ay in -500.0f32..500.0,
                bx in -500.0f32..500.0, by in -500.0f32..500.0,
                w in 1.0f32..100.0, h in 1.0f32..100.0,
            ) {
                let a = aabb(ax, ay, w, h);
                let b = aabb(bx, by, w, h);
                prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
            }

            /// Boxes sharing an edge never collide, seen from either side.
            #[test]
            fn edge_touch_never_hits_prop(
                x in -500.0f32..500.0, y in -500.0f32..500.0,
                w in 1.0f32..100.0, h in 1.0f32..100.0,
                ow in 1.0f32..100.0, oh in 1.0f32..100.0,
            ) {
                // Shared edges are built from the same expression so the
                // coordinates compare exactly equal.
                let a = aabb(x, y, w, h);
                let flush_right = aabb(x + w, y, ow, oh);
                let flush_below = aabb(x, y + h, ow, oh);
                prop_assert!(!a.overlaps(&flush_right));
                prop_assert!(!flush_right.overlaps(&a));
                prop_assert!(!a.overlaps(&flush_below));
                prop_assert!(!flush_below.overlaps(&a));
            }
        }
    }
}
