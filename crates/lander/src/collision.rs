//! Segment and box intersection tests used for terrain contact

use glam::Vec2;

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The four sides, each as a (start, end) pair
    pub fn edges(&self) -> [(Vec2, Vec2); 4] {
        let top_left = self.min;
        let top_right = Vec2::new(self.max.x, self.min.y);
        let bottom_right = self.max;
        let bottom_left = Vec2::new(self.min.x, self.max.y);
        [
            (top_left, bottom_left),
            (bottom_left, bottom_right),
            (bottom_right, top_right),
            (top_right, top_left),
        ]
    }
}

/// Twice the signed area of triangle (a, b, c)
fn cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - a)
}

/// `p` lies within the bounding box of segment (a, b); only meaningful when collinear
fn within_span(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Check whether two closed segments share at least one point
pub fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    (d1 == 0.0 && within_span(b1, b2, a1))
        || (d2 == 0.0 && within_span(b1, b2, a2))
        || (d3 == 0.0 && within_span(a1, a2, b1))
        || (d4 == 0.0 && within_span(a1, a2, b2))
}

/// Check whether a segment crosses or touches any side of the rectangle
///
/// A segment lying entirely inside the rectangle does not count.
pub fn rect_touches_segment(rect: &Rect, start: Vec2, end: Vec2) -> bool {
    rect.edges()
        .iter()
        .any(|&(a, b)| segments_intersect(a, b, start, end))
}
