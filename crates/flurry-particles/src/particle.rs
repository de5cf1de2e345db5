//! Particle state and the drift kinematic rule

use flurry_core::{Motif, SnowfallConfig};
use rand::Rng;

/// Sample uniformly from `[min, max)`; a degenerate range yields `min`
pub fn sample_range<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}

/// Ranges each particle field is drawn from at generation time
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleRanges {
    pub size: [f32; 2],
    pub fall_speed: [f32; 2],
    pub drift: [f32; 2],
    /// Upper bound of the per-particle opacity, exclusive
    pub max_opacity: f32,
    pub motifs: Vec<Motif>,
    pub round_sizes: bool,
}

impl ParticleRanges {
    pub fn from_config(config: &SnowfallConfig) -> Self {
        Self {
            size: config.size_range,
            fall_speed: config.speed_range,
            drift: config.drift_range,
            max_opacity: config.opacity,
            motifs: config.shapes.clone(),
            round_sizes: config.round_sizes,
        }
    }
}

/// One falling snow unit
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub fall_speed: f32,
    pub drift: f32,
    pub opacity: f32,
    pub motif: Motif,
}

impl Particle {
    /// Draw a particle positioned uniformly over a `width` x `height` surface
    pub fn random<R: Rng>(
        rng: &mut R,
        ranges: &ParticleRanges,
        width: f32,
        height: f32,
    ) -> Self {
        let motif = if ranges.motifs.is_empty() {
            Motif::Fern
        } else {
            ranges.motifs[rng.gen_range(0..ranges.motifs.len())]
        };
        let mut size = sample_range(rng, ranges.size[0], ranges.size[1]);
        if ranges.round_sizes {
            size = size.round();
        }
        Self {
            x: sample_range(rng, 0.0, width),
            y: sample_range(rng, 0.0, height),
            size,
            fall_speed: sample_range(rng, ranges.fall_speed[0], ranges.fall_speed[1]),
            drift: sample_range(rng, ranges.drift[0], ranges.drift[1]),
            opacity: sample_range(rng, 0.0, ranges.max_opacity),
            motif,
        }
    }

    /// Advance one tick, recycling the particle when it leaves the surface.
    ///
    /// The vertical reset is checked first; the horizontal torus wrap is an
    /// independent check, so both can apply in the same tick.
    pub fn advance<R: Rng>(&mut self, rng: &mut R, width: f32, height: f32) {
        self.y += self.fall_speed;
        self.x += self.drift;

        if self.y > height {
            self.y = -self.size;
            self.x = sample_range(rng, 0.0, width);
        }

        if self.x > width + self.size {
            self.x = -self.size;
        } else if self.x < -self.size {
            self.x = width + self.size;
        }
    }
}

/// The live particle collection. Its length only changes on regeneration.
#[derive(Clone, Debug, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate `count` fresh particles over the surface extent
    pub fn generate<R: Rng>(
        count: usize,
        ranges: &ParticleRanges,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Self {
        let particles = (0..count)
            .map(|_| Particle::random(rng, ranges, width, height))
            .collect();
        Self { particles }
    }

    /// Apply the kinematic rule to every particle
    pub fn update<R: Rng>(&mut self, width: f32, height: f32, rng: &mut R) {
        for p in &mut self.particles {
            p.advance(rng, width, height);
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

impl<'a> IntoIterator for &'a ParticleSet {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn fixed_ranges() -> ParticleRanges {
        ParticleRanges {
            size: [8.0, 8.0],
            fall_speed: [2.0, 2.0],
            drift: [0.0, 0.0],
            max_opacity: 1.0,
            motifs: vec![Motif::Fern],
            round_sizes: false,
        }
    }

    fn particle(x: f32, y: f32, size: f32, fall_speed: f32, drift: f32) -> Particle {
        Particle {
            x,
            y,
            size,
            fall_speed,
            drift,
            opacity: 1.0,
            motif: Motif::Fern,
        }
    }

    #[test]
    fn generated_fields_stay_in_range() {
        let ranges = ParticleRanges::from_config(&SnowfallConfig::default());
        let set = ParticleSet::generate(500, &ranges, 800.0, 600.0, &mut rng());
        assert_eq!(set.len(), 500);
        for p in &set {
            assert!((0.0..800.0).contains(&p.x));
            assert!((0.0..600.0).contains(&p.y));
            assert!((8.0..=16.0).contains(&p.size));
            assert_eq!(p.size, p.size.round());
            assert!((1.0..2.0).contains(&p.fall_speed));
            assert!((-0.25..0.25).contains(&p.drift));
            assert!((0.0..0.8).contains(&p.opacity));
        }
    }

    #[test]
    fn motifs_are_drawn_from_the_active_set() {
        let mut ranges = fixed_ranges();
        ranges.motifs = vec![Motif::Lattice, Motif::Star];
        let set = ParticleSet::generate(200, &ranges, 100.0, 100.0, &mut rng());
        assert!(set.iter().all(|p| p.motif != Motif::Fern));
        assert!(set.iter().any(|p| p.motif == Motif::Lattice));
        assert!(set.iter().any(|p| p.motif == Motif::Star));
    }

    #[test]
    fn one_tick_moves_by_speed_and_drift_exactly() {
        let mut set = ParticleSet::generate(3, &fixed_ranges(), 100.0, 100.0, &mut rng());
        // Keep every particle far enough from the bottom edge not to wrap
        for p in set.as_mut_slice() {
            p.y = p.y.min(90.0);
        }
        let before: Vec<(f32, f32)> = set.iter().map(|p| (p.x, p.y)).collect();
        set.update(100.0, 100.0, &mut rng());
        for (p, (x, y)) in set.iter().zip(before) {
            assert_eq!(p.y, y + 2.0);
            assert_eq!(p.x, x);
        }
    }

    #[test]
    fn bottom_exit_resets_to_top_with_new_x() {
        let mut p = particle(50.0, 99.0, 8.0, 2.0, 0.0);
        let mut r = rng();
        p.advance(&mut r, 100.0, 100.0);
        assert_eq!(p.y, -8.0);
        assert!((0.0..100.0).contains(&p.x));
    }

    #[test]
    fn horizontal_wrap_is_a_torus() {
        let mut r = rng();
        let mut right = particle(107.9, 10.0, 8.0, 0.0, 0.25);
        right.advance(&mut r, 100.0, 100.0);
        assert_eq!(right.x, -8.0);

        let mut left = particle(-7.9, 10.0, 8.0, 0.0, -0.25);
        left.advance(&mut r, 100.0, 100.0);
        assert_eq!(left.x, 108.0);
    }

    #[test]
    fn corner_exit_resets_vertically_before_wrapping() {
        let mut r = rng();
        let mut p = particle(-7.9, 99.5, 8.0, 1.0, -0.25);
        p.advance(&mut r, 100.0, 100.0);
        // The re-randomized x is already inside, so the wrap check is a no-op
        assert_eq!(p.y, -8.0);
        assert!((0.0..100.0).contains(&p.x));
    }

    #[test]
    fn x_stays_within_wrap_bounds() {
        let mut ranges = ParticleRanges::from_config(&SnowfallConfig::default());
        ranges.drift = [-3.0, 3.0];
        ranges.fall_speed = [1.0, 6.0];
        let mut r = rng();
        let mut set = ParticleSet::generate(200, &ranges, 320.0, 240.0, &mut r);
        for _ in 0..500 {
            set.update(320.0, 240.0, &mut r);
            for p in &set {
                assert!(p.x >= -p.size && p.x <= 320.0 + p.size, "x = {}", p.x);
            }
        }
    }

    #[test]
    fn degenerate_ranges_yield_min() {
        let mut r = rng();
        assert_eq!(sample_range(&mut r, 3.0, 3.0), 3.0);
        assert_eq!(sample_range(&mut r, 0.0, 0.0), 0.0);
    }
}
