use serde::{Deserialize, Serialize};

/// A half-open axis-aligned integer box `[min, max)`.
///
/// Both voxel and entity containment are half-open on every axis: a point
/// exactly at `max` is outside, a point exactly at `min` is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: (i32, i32, i32),
    pub max: (i32, i32, i32),
}

impl BoundingBox {
    pub fn new(min: (i32, i32, i32), max: (i32, i32, i32)) -> Self {
        BoundingBox { min, max }
    }

    /// The target box of a marker: `[position + offset, position + offset + size)`.
    pub fn from_marker(
        position: (i32, i32, i32),
        offset: (i32, i32, i32),
        size: (i32, i32, i32),
    ) -> Self {
        let min = (
            position.0 + offset.0,
            position.1 + offset.1,
            position.2 + offset.2,
        );
        BoundingBox {
            min,
            max: (min.0 + size.0, min.1 + size.1, min.2 + size.2),
        }
    }

    pub fn contains(&self, point: (i32, i32, i32)) -> bool {
        point.0 >= self.min.0
            && point.0 < self.max.0
            && point.1 >= self.min.1
            && point.1 < self.max.1
            && point.2 >= self.min.2
            && point.2 < self.max.2
    }

    /// Entity containment: the float position is tested as-is, never
    /// truncated before the comparison.
    pub fn contains_f64(&self, point: (f64, f64, f64)) -> bool {
        point.0 >= self.min.0 as f64
            && point.0 < self.max.0 as f64
            && point.1 >= self.min.1 as f64
            && point.1 < self.max.1 as f64
            && point.2 >= self.min.2 as f64
            && point.2 < self.max.2 as f64
    }

    pub fn relative(&self, point: (i32, i32, i32)) -> (i32, i32, i32) {
        (
            point.0 - self.min.0,
            point.1 - self.min.1,
            point.2 - self.min.2,
        )
    }

    pub fn relative_f64(&self, point: (f64, f64, f64)) -> (f64, f64, f64) {
        (
            point.0 - self.min.0 as f64,
            point.1 - self.min.1 as f64,
            point.2 - self.min.2 as f64,
        )
    }

    pub fn size(&self) -> (i32, i32, i32) {
        (
            self.max.0 - self.min.0,
            self.max.1 - self.min.1,
            self.max.2 - self.min.2,
        )
    }

    /// The (cx, cz) chunk columns this box touches, in x-then-z order.
    pub fn chunk_locations(&self) -> Vec<(i32, i32)> {
        let mut locations = Vec::new();
        for cx in (self.min.0 >> 4)..=((self.max.0 - 1) >> 4) {
            for cz in (self.min.2 >> 4)..=((self.max.2 - 1) >> 4) {
                locations.push((cx, cz));
            }
        }
        locations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_open_containment() {
        let bounds = BoundingBox::new((10, 65, 10), (13, 67, 13));

        assert!(bounds.contains((10, 65, 10)));
        assert!(bounds.contains((12, 66, 12)));
        assert!(!bounds.contains((13, 66, 12)));
        assert!(!bounds.contains((12, 67, 12)));
        assert!(!bounds.contains((12, 66, 13)));
        assert!(!bounds.contains((9, 65, 10)));
    }

    #[test]
    fn test_half_open_float_containment() {
        let bounds = BoundingBox::new((10, 65, 10), (13, 67, 13));

        assert!(bounds.contains_f64((10.0, 65.0, 10.0)));
        assert!(bounds.contains_f64((12.999, 66.5, 12.999)));
        assert!(!bounds.contains_f64((13.0, 66.0, 12.0)));
        assert!(!bounds.contains_f64((12.0, 67.0, 12.0)));
        // A point past max must not truncate its way inside.
        assert!(!bounds.contains_f64((13.4, 66.0, 12.0)));
    }

    #[test]
    fn test_marker_box_derivation() {
        // Marker at (10, 64, 10) with offset (0, 1, 0) and size (3, 2, 3).
        let bounds = BoundingBox::from_marker((10, 64, 10), (0, 1, 0), (3, 2, 3));
        assert_eq!(bounds.min, (10, 65, 10));
        assert_eq!(bounds.max, (13, 67, 13));
        assert_eq!(bounds.size(), (3, 2, 3));
    }

    #[test]
    fn test_relative_positions() {
        let bounds = BoundingBox::new((10, 65, 10), (13, 67, 13));
        assert_eq!(bounds.relative((10, 65, 10)), (0, 0, 0));
        assert_eq!(bounds.relative((12, 66, 11)), (2, 1, 1));

        let rel = bounds.relative_f64((10.5, 65.0, 10.9));
        assert!((rel.0 - 0.5).abs() < 1e-9);
        assert!((rel.1 - 0.0).abs() < 1e-9);
        assert!((rel.2 - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_chunk_locations() {
        // Box spanning the (0,0)/(1,0) chunk boundary.
        let bounds = BoundingBox::new((14, 0, 3), (18, 1, 5));
        assert_eq!(bounds.chunk_locations(), vec![(0, 0), (1, 0)]);

        // One-voxel box touches exactly one column.
        let single = BoundingBox::new((16, 0, 16), (17, 1, 17));
        assert_eq!(single.chunk_locations(), vec![(1, 1)]);
    }
}
