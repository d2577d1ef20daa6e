/// A closed range `[min, max]` of ray parameters.
///
/// Intersection routines use it to clip hits to a near/far window. An
/// interval with `min > max` is empty.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// Every real number.
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `[min, +inf)`.
    pub fn from_min(min: f32) -> Self {
        Self::new(min, f32::INFINITY)
    }

    /// Same lower bound, new upper bound.
    #[inline]
    pub fn with_max(self, max: f32) -> Self {
        Self::new(self.min, max)
    }

    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Inclusive membership test.
    #[inline]
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Exclusive membership test; endpoints are rejected.
    #[inline]
    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }

    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}
