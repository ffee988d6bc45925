//! Static Obstacle Geometry
//!
//! Walls and the point/segment blocking tests the whole simulation is
//! validated against. A wall is an axis-aligned bounding rectangle; walls
//! with sub-rectangle segments are solid only where a segment covers them,
//! which is how door and window gaps are modeled.

use serde::{Deserialize, Serialize};

use crate::core::vec2::Vec2;

/// Axis-aligned rectangle (origin at top-left corner).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width
    pub w: f32,
    /// Height
    pub h: f32,
}

impl Rect {
    /// Create a new rectangle.
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Rectangle grown by `radius` on all sides (Minkowski-sum AABB).
    #[inline]
    pub fn inflate(&self, radius: f32) -> Self {
        Self {
            x: self.x - radius,
            y: self.y - radius,
            w: self.w + radius * 2.0,
            h: self.h + radius * 2.0,
        }
    }

    /// Whether a point lies inside the rectangle.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
    }

    /// Minimum gap between this rectangle and another (0 when overlapping).
    pub fn gap_to(&self, other: &Rect) -> f32 {
        let dx = (other.x - (self.x + self.w)).max(self.x - (other.x + other.w)).max(0.0);
        let dy = (other.y - (self.y + self.h)).max(self.y - (other.y + other.h)).max(0.0);
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether a line segment crosses this rectangle.
    ///
    /// Endpoints inside count as crossing; otherwise the segment is tested
    /// against all four edges.
    pub fn intersects_segment(&self, a: Vec2, b: Vec2) -> bool {
        if self.contains(a.x, a.y) || self.contains(b.x, b.y) {
            return true;
        }

        let tl = Vec2::new(self.x, self.y);
        let tr = Vec2::new(self.x + self.w, self.y);
        let bl = Vec2::new(self.x, self.y + self.h);
        let br = Vec2::new(self.x + self.w, self.y + self.h);

        segments_intersect(a, b, tl, tr)
            || segments_intersect(a, b, tr, br)
            || segments_intersect(a, b, br, bl)
            || segments_intersect(a, b, bl, tl)
    }
}

/// Whether segments `a1-a2` and `b1-b2` intersect.
fn segments_intersect(a1: Vec2, a2: Vec2, b1: Vec2, b2: Vec2) -> bool {
    let d1 = cross(b2 - b1, a1 - b1);
    let d2 = cross(b2 - b1, a2 - b1);
    let d3 = cross(a2 - a1, b1 - a1);
    let d4 = cross(a2 - a1, b2 - a1);

    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }

    // Collinear touching cases
    (d1 == 0.0 && on_segment(b1, b2, a1))
        || (d2 == 0.0 && on_segment(b1, b2, a2))
        || (d3 == 0.0 && on_segment(a1, a2, b1))
        || (d4 == 0.0 && on_segment(a1, a2, b2))
}

#[inline]
fn cross(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

#[inline]
fn on_segment(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x) && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
}

/// Wall archetype produced by the generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallKind {
    /// World boundary
    Perimeter,
    /// Plain straight wall
    Straight,
    /// Two walls joined at a corner
    LShape,
    /// Four-sided room with a door gap
    Room,
    /// Long wall with periodic window gaps
    WindowWall,
    /// Cross intersection
    Cross,
    /// Parallel corridor walls
    Corridor,
    /// Compound with outer walls and an inner courtyard
    Fortress,
    /// Small enclosed room
    SmallRoom,
}

/// A static obstacle.
///
/// If `segments` is non-empty, collision tests use the segments
/// exclusively: a point inside the bounding rect but covered by no segment
/// is in a gap and not blocked.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Wall {
    /// Unique wall id
    pub id: u32,
    /// Archetype tag
    pub kind: WallKind,
    /// Bounding rectangle in world space
    pub rect: Rect,
    /// Solid sub-rectangles relative to `rect` origin (empty = fully solid)
    pub segments: Vec<Rect>,
}

impl Wall {
    /// Create a solid wall.
    pub fn solid(id: u32, kind: WallKind, rect: Rect) -> Self {
        Self {
            id,
            kind,
            rect,
            segments: Vec::new(),
        }
    }

    /// Create a segmented wall (gaps where no segment covers).
    pub fn segmented(id: u32, kind: WallKind, rect: Rect, segments: Vec<Rect>) -> Self {
        Self {
            id,
            kind,
            rect,
            segments,
        }
    }

    /// Segments translated to world space.
    pub fn abs_segments(&self) -> impl Iterator<Item = Rect> + '_ {
        self.segments.iter().map(move |s| Rect {
            x: self.rect.x + s.x,
            y: self.rect.y + s.y,
            w: s.w,
            h: s.h,
        })
    }

    /// Whether a circle at (x, y) with `radius` overlaps this wall's solid area.
    pub fn blocks_point(&self, x: f32, y: f32, radius: f32) -> bool {
        if self.segments.is_empty() {
            return self.rect.inflate(radius).contains(x, y);
        }
        self.abs_segments().any(|s| s.inflate(radius).contains(x, y))
    }

    /// Whether a line segment crosses this wall's solid area.
    pub fn blocks_segment(&self, a: Vec2, b: Vec2) -> bool {
        if self.segments.is_empty() {
            return self.rect.intersects_segment(a, b);
        }
        self.abs_segments().any(|s| s.intersects_segment(a, b))
    }
}

/// Find the first wall blocking a circle at (x, y).
pub fn point_blocked(walls: &[Wall], x: f32, y: f32, radius: f32) -> Option<&Wall> {
    walls.iter().find(|w| w.blocks_point(x, y, radius))
}

/// Find the first wall crossed by the segment (x1, y1)-(x2, y2).
pub fn segment_blocked(walls: &[Wall], x1: f32, y1: f32, x2: f32, y2: f32) -> Option<&Wall> {
    let a = Vec2::new(x1, y1);
    let b = Vec2::new(x2, y2);
    walls.iter().find(|w| w.blocks_segment(a, b))
}
