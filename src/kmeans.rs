//! K-means clustering in RGB space
//!
//! Integer arithmetic throughout, so a run is fully reproducible once the
//! initial centroids are fixed by a [`Seeding`] strategy.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::color::Rgb;

pub const DEFAULT_MAX_ITERATIONS: usize = 20;

/// Largest per-channel move still considered converged
const CONVERGENCE_TOLERANCE: u8 = 1;

/// How the initial centroids are chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Seeding {
    /// Samples at `i * floor(n / k)`, clamped to the last sample
    #[default]
    EvenlySpaced,
    /// Distinct samples drawn with a seeded ChaCha8 generator
    Random { seed: u64 },
}

impl Seeding {
    fn initial_centroids(&self, samples: &[Rgb], k: usize) -> Vec<Rgb> {
        let n = samples.len();
        match *self {
            Seeding::EvenlySpaced => {
                let step = n / k;
                (0..k).map(|i| samples[(i * step).min(n - 1)]).collect()
            }
            Seeding::Random { seed } => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let picked = rand::seq::index::sample(&mut rng, n, k.min(n));
                // Fewer samples than centroids: cycle through them in order
                picked
                    .into_iter()
                    .chain((0..k.saturating_sub(n)).map(|i| i % n))
                    .map(|idx| samples[idx])
                    .collect()
            }
        }
    }
}

/// A final cluster center and the samples assigned to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Centroid {
    pub color: Rgb,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct ClusterResult {
    /// Exactly `k` centroids, in seeding order
    pub centroids: Vec<Centroid>,
    pub iterations: usize,
}

impl ClusterResult {
    pub fn total_count(&self) -> usize {
        self.centroids.iter().map(|c| c.count).sum()
    }
}

/// Running channel sums for one centroid during an update pass
#[derive(Default, Clone, Copy)]
struct Accumulator {
    r: u64,
    g: u64,
    b: u64,
    count: usize,
}

impl Accumulator {
    fn add(&mut self, rgb: Rgb) {
        self.r += rgb.r as u64;
        self.g += rgb.g as u64;
        self.b += rgb.b as u64;
        self.count += 1;
    }

    /// Truncated mean, `None` for an empty cluster
    fn mean(&self) -> Option<Rgb> {
        if self.count == 0 {
            return None;
        }
        let n = self.count as u64;
        Some(Rgb::new(
            (self.r / n) as u8,
            (self.g / n) as u8,
            (self.b / n) as u8,
        ))
    }
}

/// Index of the nearest centroid; ties go to the lowest index
#[inline]
fn nearest(centroids: &[Rgb], sample: &Rgb) -> usize {
    let mut best_index = 0;
    let mut best_dist = u32::MAX;

    for (i, c) in centroids.iter().enumerate() {
        let dist = sample.distance_squared(c);
        if dist < best_dist {
            best_dist = dist;
            best_index = i;
        }
    }

    best_index
}

fn accumulate(samples: &[Rgb], centroids: &[Rgb]) -> Vec<Accumulator> {
    let mut acc = vec![Accumulator::default(); centroids.len()];
    for sample in samples {
        acc[nearest(centroids, sample)].add(*sample);
    }
    acc
}

fn moved(before: &Rgb, after: &Rgb) -> bool {
    before.r.abs_diff(after.r) > CONVERGENCE_TOLERANCE
        || before.g.abs_diff(after.g) > CONVERGENCE_TOLERANCE
        || before.b.abs_diff(after.b) > CONVERGENCE_TOLERANCE
}

/// Partition `samples` into `k` clusters
///
/// Empty clusters keep their previous center. The loop stops early once no
/// centroid channel moves by more than one unit, and the reported counts come
/// from a final assignment against the settled centers.
pub fn cluster(samples: &[Rgb], k: usize, max_iterations: usize, seeding: Seeding) -> ClusterResult {
    if samples.is_empty() || k == 0 {
        return ClusterResult {
            centroids: Vec::new(),
            iterations: 0,
        };
    }

    let mut centroids = seeding.initial_centroids(samples, k);
    let mut iterations = 0;

    for _ in 0..max_iterations {
        iterations += 1;

        let acc = accumulate(samples, &centroids);
        let updated: Vec<Rgb> = centroids
            .iter()
            .zip(&acc)
            .map(|(prev, a)| a.mean().unwrap_or(*prev))
            .collect();

        let converged = !centroids.iter().zip(&updated).any(|(a, b)| moved(a, b));
        centroids = updated;

        if converged {
            break;
        }
    }

    let counts = accumulate(samples, &centroids);

    ClusterResult {
        centroids: centroids
            .into_iter()
            .zip(counts)
            .map(|(color, a)| Centroid {
                color,
                count: a.count,
            })
            .collect(),
        iterations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_blue() -> Vec<Rgb> {
        vec![
            Rgb::new(200, 0, 0),
            Rgb::new(200, 0, 0),
            Rgb::new(0, 0, 200),
            Rgb::new(0, 0, 200),
        ]
    }

    /// Three loose blobs of 30 samples each, stored one after another
    fn blobs() -> Vec<Rgb> {
        (0..90u32)
            .map(|i| {
                let jitter = (i * 7 % 11) as u8;
                match i / 30 {
                    0 => Rgb::new(180 + jitter, 20, 30 + jitter),
                    1 => Rgb::new(20 + jitter, 160, 60),
                    _ => Rgb::new(40, 50 + jitter, 170 + jitter),
                }
            })
            .collect()
    }

    #[test]
    fn test_two_clusters() {
        let result = cluster(&red_blue(), 2, DEFAULT_MAX_ITERATIONS, Seeding::EvenlySpaced);
        assert_eq!(
            result.centroids,
            vec![
                Centroid {
                    color: Rgb::new(200, 0, 0),
                    count: 2
                },
                Centroid {
                    color: Rgb::new(0, 0, 200),
                    count: 2
                },
            ]
        );
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn test_evenly_spaced_seeds() {
        let samples = blobs();
        let seeds = Seeding::EvenlySpaced.initial_centroids(&samples, 4);
        assert_eq!(seeds, vec![samples[0], samples[22], samples[44], samples[66]]);
    }

    #[test]
    fn test_exactly_k_centroids_when_samples_scarce() {
        let samples = vec![Rgb::new(10, 200, 30), Rgb::new(200, 10, 30)];

        let result = cluster(&samples, 5, DEFAULT_MAX_ITERATIONS, Seeding::EvenlySpaced);
        assert_eq!(result.centroids.len(), 5);
        assert_eq!(result.total_count(), 2);

        let result = cluster(&samples, 5, DEFAULT_MAX_ITERATIONS, Seeding::Random { seed: 7 });
        assert_eq!(result.centroids.len(), 5);
        assert_eq!(result.total_count(), 2);
    }

    #[test]
    fn test_empty_clusters_keep_seed() {
        // k=3 over one color: the first centroid takes every sample,
        // the duplicates stay put with zero count
        let samples = vec![Rgb::new(90, 30, 200); 6];
        let result = cluster(&samples, 3, DEFAULT_MAX_ITERATIONS, Seeding::EvenlySpaced);
        assert_eq!(result.centroids[0].count, 6);
        assert_eq!(result.centroids[1].count, 0);
        assert_eq!(result.centroids[1].color, Rgb::new(90, 30, 200));
    }

    #[test]
    fn test_count_conservation() {
        let samples = blobs();
        for k in 3..=12 {
            for seeding in [Seeding::EvenlySpaced, Seeding::Random { seed: k as u64 }] {
                let result = cluster(&samples, k, DEFAULT_MAX_ITERATIONS, seeding);
                assert_eq!(result.centroids.len(), k);
                assert_eq!(result.total_count(), samples.len());
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let samples = blobs();
        for seeding in [Seeding::EvenlySpaced, Seeding::Random { seed: 42 }] {
            let a = cluster(&samples, 5, DEFAULT_MAX_ITERATIONS, seeding);
            let b = cluster(&samples, 5, DEFAULT_MAX_ITERATIONS, seeding);
            assert_eq!(a.centroids, b.centroids);
            assert_eq!(a.iterations, b.iterations);
        }
    }

    #[test]
    fn test_separates_blobs() {
        let result = cluster(&blobs(), 3, DEFAULT_MAX_ITERATIONS, Seeding::EvenlySpaced);
        let mut counts: Vec<usize> = result.centroids.iter().map(|c| c.count).collect();
        counts.sort();
        assert_eq!(counts, vec![30, 30, 30]);
    }

    #[test]
    fn test_respects_iteration_cap() {
        let result = cluster(&blobs(), 6, 1, Seeding::Random { seed: 3 });
        assert_eq!(result.iterations, 1);
        assert_eq!(result.total_count(), 90);
    }

    #[test]
    fn test_tie_goes_to_lowest_index() {
        let centroids = [Rgb::new(0, 0, 0), Rgb::new(20, 0, 0)];
        assert_eq!(nearest(&centroids, &Rgb::new(10, 0, 0)), 0);
    }

    #[test]
    fn test_truncating_mean() {
        let mut acc = Accumulator::default();
        acc.add(Rgb::new(1, 2, 3));
        acc.add(Rgb::new(2, 3, 4));
        assert_eq!(acc.mean(), Some(Rgb::new(1, 2, 3)));
        assert_eq!(Accumulator::default().mean(), None);
    }
}
