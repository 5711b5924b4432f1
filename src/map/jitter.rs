use rand::Rng;

use crate::models::GeoPoint;

/// Largest offset per axis, in degrees
pub const DEFAULT_JITTER_DEGREES: f64 = 0.001;

/// Random offset applied to marker coordinates to coarsen their precision
#[derive(Debug, Clone, Copy)]
pub struct Jitter {
    max_offset: f64,
}

impl Jitter {
    pub fn new(max_offset: f64) -> Self {
        Self {
            max_offset: max_offset.abs(),
        }
    }

    pub fn none() -> Self {
        Self::new(0.0)
    }

    pub fn max_offset(&self) -> f64 {
        self.max_offset
    }

    pub fn apply<R: Rng + ?Sized>(&self, point: GeoPoint, rng: &mut R) -> GeoPoint {
        if self.max_offset == 0.0 {
            return point;
        }
        let range = -self.max_offset..=self.max_offset;
        GeoPoint::new(
            point.lat + rng.gen_range(range.clone()),
            point.lng + rng.gen_range(range),
        )
    }
}

impl Default for Jitter {
    fn default() -> Self {
        Self::new(DEFAULT_JITTER_DEGREES)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn apply_stays_within_bounds() {
        let jitter = Jitter::default();
        let mut rng = StdRng::seed_from_u64(7);
        let origin = GeoPoint::new(34.05, -118.24);
        for _ in 0..1000 {
            let point = jitter.apply(origin, &mut rng);
            assert!((point.lat - origin.lat).abs() <= DEFAULT_JITTER_DEGREES);
            assert!((point.lng - origin.lng).abs() <= DEFAULT_JITTER_DEGREES);
        }
    }

    #[test]
    fn none_keeps_point() {
        let origin = GeoPoint::new(1.0, 2.0);
        assert_eq!(Jitter::none().apply(origin, &mut StdRng::seed_from_u64(1)), origin);
    }
}
