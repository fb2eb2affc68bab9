use crate::actions::Region;
use crate::model::{Point, Rect, Size};

/// Test order. The top-right cell starts left of where the top-center cell
/// ends, so the shared strip goes to whichever comes first here.
pub const PRIORITY: [Region; 9] = [
    Region::Center,
    Region::BottomCenter,
    Region::BottomLeft,
    Region::BottomRight,
    Region::MiddleLeft,
    Region::MiddleRight,
    Region::TopLeft,
    Region::TopCenter,
    Region::TopRight,
];

/// 3x3 tap grid over the viewport
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RegionGrid {
    size: Size,
}

impl RegionGrid {
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn resize(&mut self, size: Size) {
        self.size = size;
    }

    pub fn rect(&self, region: Region) -> Rect {
        let w = self.size.width;
        let h = self.size.height;
        match region {
            Region::TopLeft => Rect::new(0.0, 0.0, w * 0.33, h * 0.33),
            Region::TopCenter => Rect::new(w * 0.33, 0.0, w * 0.66, h * 0.33),
            Region::TopRight => Rect::new(w * 0.36, 0.0, w, h * 0.33),
            Region::MiddleLeft => Rect::new(0.0, h * 0.33, w * 0.33, h * 0.66),
            Region::Center => Rect::new(w * 0.33, h * 0.33, w * 0.66, h * 0.66),
            Region::MiddleRight => Rect::new(w * 0.66, h * 0.33, w, h * 0.66),
            Region::BottomLeft => Rect::new(0.0, h * 0.66, w * 0.33, h),
            Region::BottomCenter => Rect::new(w * 0.33, h * 0.66, w * 0.66, h),
            Region::BottomRight => Rect::new(w * 0.66, h * 0.66, w, h),
        }
    }

    /// First region in priority order containing `point`
    pub fn region_at(&self, point: Point) -> Option<Region> {
        PRIORITY
            .into_iter()
            .find(|&region| self.rect(region).contains(point))
    }
}
