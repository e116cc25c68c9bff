/// A 2D point in screen space
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "bytemuck", derive(bytemuck::Pod, bytemuck::Zeroable))]
#[repr(C)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Create a point at the origin (0, 0)
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Component-wise difference `self - other`
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

impl From<[f32; 2]> for Point {
    fn from(arr: [f32; 2]) -> Self {
        Self {
            x: arr[0],
            y: arr[1],
        }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Width and height in pixels
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Axis-aligned rectangle defined by min and max corners
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Rect {
    pub const fn new(min: [f32; 2], max: [f32; 2]) -> Self {
        Self { min, max }
    }

    pub fn from_min_size(min: [f32; 2], size: [f32; 2]) -> Self {
        Self {
            min,
            max: [min[0] + size[0], min[1] + size[1]],
        }
    }

    /// Rectangle from position and size
    pub fn from_xywh(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::from_min_size([x, y], [w, h])
    }

    pub fn x(&self) -> f32 {
        self.min[0]
    }

    pub fn y(&self) -> f32 {
        self.min[1]
    }

    pub fn width(&self) -> f32 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f32 {
        self.max[1] - self.min[1]
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Check if a point is inside this rectangle
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min[0]
            && point.x <= self.max[0]
            && point.y >= self.min[1]
            && point.y <= self.max[1]
    }

    /// Get the intersection of this rect with another
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let min_x = self.min[0].max(other.min[0]);
        let min_y = self.min[1].max(other.min[1]);
        let max_x = self.max[0].min(other.max[0]);
        let max_y = self.max[1].min(other.max[1]);

        if min_x <= max_x && min_y <= max_y {
            Some(Rect {
                min: [min_x, min_y],
                max: [max_x, max_y],
            })
        } else {
            None
        }
    }

    /// Same size, moved by `(dx, dy)`
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            min: [self.min[0] + dx, self.min[1] + dy],
            max: [self.max[0] + dx, self.max[1] + dy],
        }
    }

    /// Shrink by the given spacing on each side (never inverts)
    pub fn shrink(&self, spacing: Spacing) -> Rect {
        let min_x = self.min[0] + spacing.left;
        let min_y = self.min[1] + spacing.top;
        Rect {
            min: [min_x, min_y],
            max: [
                (self.max[0] - spacing.right).max(min_x),
                (self.max[1] - spacing.bottom).max(min_y),
            ],
        }
    }

    /// Convert min corner to Point
    pub fn min_point(&self) -> Point {
        Point::new(self.min[0], self.min[1])
    }

    /// Convert max corner to Point
    pub fn max_point(&self) -> Point {
        Point::new(self.max[0], self.max[1])
    }
}

/// Spacing on the four sides of a rectangle (text padding, borders)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spacing {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Spacing {
    pub const ZERO: Spacing = Spacing::all(0.0);

    pub const fn all(value: f32) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }

    pub const fn symmetric(horizontal: f32, vertical: f32) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub const fn trbl(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn get_vertical(&self) -> f32 {
        self.top + self.bottom
    }

    pub const fn get_horizontal(&self) -> f32 {
        self.left + self.right
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_edges() {
        let r = Rect::from_xywh(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(r.contains(Point::new(30.0, 30.0)));
        assert!(!r.contains(Point::new(31.0, 30.0)));
    }

    #[test]
    fn test_shrink_never_inverts() {
        let r = Rect::from_xywh(0.0, 0.0, 10.0, 10.0).shrink(Spacing::all(8.0));
        assert_eq!(r.width(), 0.0);
        assert_eq!(r.height(), 0.0);
    }
}
