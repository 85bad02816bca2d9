/// Running axis-aligned bounding box over every point a generator emits.
///
/// A fresh tracker is empty: it contains no point and reports infinite
/// extremes until the first [`Bounds::include`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub max_x: f64,
    pub max_y: f64,
    pub min_x: f64,
    pub min_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    pub const fn empty() -> Self {
        Self {
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn include(&mut self, x: f64, y: f64) {
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    pub fn width(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_x - self.min_x }
    }

    pub fn height(&self) -> f64 {
        if self.is_empty() { 0.0 } else { self.max_y - self.min_y }
    }

    /// `[max_x, max_y, min_x, min_y]`, the ordering downstream consumers index into.
    pub fn as_array(&self) -> [f64; 4] {
        [self.max_x, self.max_y, self.min_x, self.min_y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_contains_nothing() {
        let b = Bounds::empty();
        assert!(b.is_empty());
        assert!(!b.contains(0.0, 0.0));
        assert_eq!(b.width(), 0.0);
    }

    #[test]
    fn include_widens_monotonically() {
        let mut b = Bounds::empty();
        b.include(1.0, -2.0);
        assert_eq!(b.as_array(), [1.0, -2.0, 1.0, -2.0]);
        b.include(-3.0, 4.0);
        assert_eq!(b.as_array(), [1.0, 4.0, -3.0, -2.0]);
        b.include(0.0, 0.0);
        assert_eq!(b.as_array(), [1.0, 4.0, -3.0, -2.0]);
        assert!((b.width() - 4.0).abs() < 1e-12);
        assert!((b.height() - 6.0).abs() < 1e-12);
    }
}
