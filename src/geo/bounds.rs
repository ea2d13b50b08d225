//! Planar bounding boxes over projected geometry.

use glam::DVec2;

/// Running bounding box, folded over projected points.
///
/// Starts empty (min at +inf, max at -inf) so the first point always wins.
/// The accumulator is a plain value: each build pass owns its own copy and
/// turns it into an immutable [`Bounds`] with [`finalize`](Self::finalize).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundsAccumulator {
    min: DVec2,
    max: DVec2,
}

impl Default for BoundsAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundsAccumulator {
    pub fn new() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    /// Accumulates over a point sequence in one pass.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = DVec2>,
    {
        points
            .into_iter()
            .fold(Self::new(), |acc, p| acc.expand_by_point(p))
    }

    /// Returns the smallest box containing `self` and `point`.
    ///
    /// Non-finite points are ignored.
    #[must_use]
    pub fn expand_by_point(self, point: DVec2) -> Self {
        if !point.is_finite() {
            return self;
        }
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Returns the smallest box containing both boxes.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Freezes the accumulator. Returns `None` if no point was observed.
    pub fn finalize(self) -> Option<Bounds> {
        if self.is_empty() {
            None
        } else {
            Some(Bounds {
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Immutable bounding box of a finished build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    min: DVec2,
    max: DVec2,
}

impl Bounds {
    pub fn min(&self) -> DVec2 {
        self.min
    }

    pub fn max(&self) -> DVec2 {
        self.max
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    /// Translation that moves the box center to the origin.
    pub fn centering_offset(&self) -> DVec2 {
        -self.center()
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Same box shifted by `offset`.
    pub fn translated(&self, offset: DVec2) -> Bounds {
        Bounds {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Normalized texture coordinate of `point` within the box.
    ///
    /// Zero-width axes map to 0.
    pub fn uv(&self, point: DVec2) -> DVec2 {
        let size = self.size();
        let u = if size.x > 0.0 {
            (point.x - self.min.x) / size.x
        } else {
            0.0
        };
        let v = if size.y > 0.0 {
            (point.y - self.min.y) / size.y
        } else {
            0.0
        };
        DVec2::new(u, v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_points() -> Vec<DVec2> {
        vec![
            DVec2::new(3.0, -1.0),
            DVec2::new(-2.5, 4.0),
            DVec2::new(0.0, 0.0),
            DVec2::new(7.25, 2.0),
            DVec2::new(1.0, -6.5),
        ]
    }

    #[test]
    fn test_empty_has_no_bounds() {
        let acc = BoundsAccumulator::new();
        assert!(acc.is_empty());
        assert!(acc.finalize().is_none());
    }

    #[test]
    fn test_first_point_wins() {
        let bounds = BoundsAccumulator::new()
            .expand_by_point(DVec2::new(-4.0, 9.0))
            .finalize()
            .unwrap();
        assert_eq!(bounds.min(), DVec2::new(-4.0, 9.0));
        assert_eq!(bounds.max(), DVec2::new(-4.0, 9.0));
        assert_eq!(bounds.size(), DVec2::ZERO);
    }

    #[test]
    fn test_incremental_matches_one_pass() {
        let points = sample_points();
        let one_pass = BoundsAccumulator::from_points(points.iter().copied());

        let mut incremental = BoundsAccumulator::new();
        for p in points.iter().rev() {
            incremental = incremental.expand_by_point(*p);
        }
        assert_eq!(one_pass, incremental);

        let bounds = one_pass.finalize().unwrap();
        assert_eq!(bounds.min(), DVec2::new(-2.5, -6.5));
        assert_eq!(bounds.max(), DVec2::new(7.25, 4.0));
    }

    #[test]
    fn test_union_is_associative() {
        let points = sample_points();
        let a = BoundsAccumulator::from_points(points[..2].iter().copied());
        let b = BoundsAccumulator::from_points(points[2..4].iter().copied());
        let c = BoundsAccumulator::from_points(points[4..].iter().copied());

        assert_eq!(a.union(b).union(c), a.union(b.union(c)));
        assert_eq!(
            a.union(b).union(c),
            BoundsAccumulator::from_points(points.iter().copied())
        );
        assert_eq!(a.union(BoundsAccumulator::new()), a);
    }

    #[test]
    fn test_non_finite_points_ignored() {
        let acc = BoundsAccumulator::new()
            .expand_by_point(DVec2::new(f64::NAN, 1.0))
            .expand_by_point(DVec2::new(1.0, 1.0));
        let bounds = acc.finalize().unwrap();
        assert_eq!(bounds.min(), DVec2::new(1.0, 1.0));
    }

    #[test]
    fn test_centering_moves_center_to_origin() {
        let points = sample_points();
        let bounds = BoundsAccumulator::from_points(points.iter().copied())
            .finalize()
            .unwrap();
        let offset = bounds.centering_offset();

        let centered = BoundsAccumulator::from_points(points.iter().map(|p| *p + offset))
            .finalize()
            .unwrap();
        assert!(centered.center().length() < 1e-12);
        assert_eq!(centered.size(), bounds.size());
        assert_eq!(bounds.translated(offset), centered);
    }

    #[test]
    fn test_uv() {
        let bounds = BoundsAccumulator::from_points([DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0)])
            .finalize()
            .unwrap();
        assert_eq!(bounds.uv(DVec2::new(1.0, 1.0)), DVec2::new(0.25, 0.5));
        assert!(bounds.contains(DVec2::new(4.0, 2.0)));
        assert!(!bounds.contains(DVec2::new(4.1, 2.0)));

        let flat = BoundsAccumulator::from_points([DVec2::new(0.0, 1.0), DVec2::new(2.0, 1.0)])
            .finalize()
            .unwrap();
        assert_eq!(flat.uv(DVec2::new(1.0, 1.0)), DVec2::new(0.5, 0.0));
    }
}
