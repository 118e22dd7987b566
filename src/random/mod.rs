//! Random number capability injected into the simulation.
//!
//! The engine never reaches for an ambient generator. Everything random (initial placement,
//! traits, walk triggers, walk targets, deaths) is drawn through a [`RandomSource`] owned by
//! the world, so a seeded source reproduces a run exactly and tests can script outcomes.
mod seeded;

pub use seeded::SeededRandom;

use crate::point::Point;

pub trait RandomSource {
    /// A uniform real in `[min, max)`. Returns `min` when the range is empty.
    fn uniform_real(&mut self, min: f64, max: f64) -> f64;

    /// Returns true with the given probability. The probability saturates: `p <= 0` (or NaN)
    /// never succeeds and `p >= 1` always succeeds.
    fn coin_flip(&mut self, probability: f64) -> bool;

    /// A point at exactly `radius` from `center` in a uniformly random direction.
    fn random_point_on_disc(&mut self, center: Point, radius: f64) -> Point {
        let angle = self.uniform_real(0.0, std::f64::consts::TAU);
        Point::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn uniform_real(&mut self, min: f64, max: f64) -> f64 {
        (**self).uniform_real(min, max)
    }

    fn coin_flip(&mut self, probability: f64) -> bool {
        (**self).coin_flip(probability)
    }

    fn random_point_on_disc(&mut self, center: Point, radius: f64) -> Point {
        (**self).random_point_on_disc(center, radius)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn uniform_real(&mut self, min: f64, max: f64) -> f64 {
        (**self).uniform_real(min, max)
    }

    fn coin_flip(&mut self, probability: f64) -> bool {
        (**self).coin_flip(probability)
    }

    fn random_point_on_disc(&mut self, center: Point, radius: f64) -> Point {
        (**self).random_point_on_disc(center, radius)
    }
}

/// Saturates a computed rate into a valid Bernoulli parameter. NaN maps to 0.
#[must_use]
pub fn clamp_probability(probability: f64) -> f64 {
    if probability.is_nan() {
        0.0
    } else {
        probability.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_almost_eq;

    /// Always returns the same fraction of the requested range.
    struct Fixed(f64);

    impl RandomSource for Fixed {
        fn uniform_real(&mut self, min: f64, max: f64) -> f64 {
            min + (max - min) * self.0
        }

        fn coin_flip(&mut self, probability: f64) -> bool {
            self.0 < clamp_probability(probability)
        }
    }

    #[test]
    fn clamp_probability_saturates() {
        assert_eq!(clamp_probability(-0.5), 0.0);
        assert_eq!(clamp_probability(1.7), 1.0);
        assert_eq!(clamp_probability(f64::NAN), 0.0);
        assert_eq!(clamp_probability(f64::INFINITY), 1.0);
        assert_eq!(clamp_probability(0.25), 0.25);
    }

    #[test]
    fn default_disc_point_uses_uniform_angle() {
        // A quarter of the way around the circle points straight up.
        let mut source = Fixed(0.25);
        let point = source.random_point_on_disc(Point::new(1.0, 1.0), 2.0);
        assert_almost_eq!(point.x, 1.0, 1e-12);
        assert_almost_eq!(point.y, 3.0, 1e-12);
    }

    #[test]
    fn forwards_through_mutable_reference() {
        fn draw<R: RandomSource>(mut random: R) -> (f64, bool) {
            (random.uniform_real(0.0, 4.0), random.coin_flip(0.75))
        }

        let mut source = Fixed(0.5);
        let (value, flip) = draw(&mut source);
        assert_almost_eq!(value, 2.0, 1e-12);
        assert!(flip);

        let (value, _) = draw(Box::new(Fixed(0.25)) as Box<dyn RandomSource>);
        assert_almost_eq!(value, 1.0, 1e-12);
    }
}
