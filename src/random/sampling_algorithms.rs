//! Uniform sampling of contact indices without replacement.

use crate::error::ResistanceError;
use crate::rand::seq::index::sample as choose_range;
use crate::rand::Rng;

/// Samples `requested` distinct indices uniformly from `0..len`, never returning `exclude`.
///
/// The excluded index is removed by sampling from `0..len - 1` and shifting every index at or
/// above `exclude` up by one, so no draws are wasted on rejections. Asking for more indices than
/// are available is an error rather than a silently shortened sample.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    len: usize,
    requested: usize,
    exclude: Option<usize>,
) -> Result<Vec<usize>, ResistanceError> {
    let excluded = exclude.filter(|&index| index < len);
    let available = len - usize::from(excluded.is_some());
    if requested > available {
        return Err(ResistanceError::ConfigError(format!(
            "cannot sample {requested} contacts from {available} candidates"
        )));
    }

    let indexes = choose_range(rng, available, requested).into_iter();
    Ok(match excluded {
        Some(skip) => indexes
            .map(|index| if index >= skip { index + 1 } else { index })
            .collect(),
        None => indexes.collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::rand::rngs::SmallRng;
    use crate::rand::SeedableRng;

    #[test]
    fn never_returns_excluded_index() {
        let mut rng = SmallRng::seed_from_u64(42);
        for _ in 0..1000 {
            let sample = sample_without_replacement(&mut rng, 5, 4, Some(2)).unwrap();
            assert_eq!(sample.len(), 4);
            assert!(!sample.contains(&2));
        }
    }

    #[test]
    fn indices_are_distinct_and_in_range() {
        let mut rng = SmallRng::seed_from_u64(1);
        let sample = sample_without_replacement(&mut rng, 100, 30, None).unwrap();
        let unique: HashSet<usize> = sample.iter().copied().collect();
        assert_eq!(unique.len(), 30);
        assert!(sample.iter().all(|&i| i < 100));
    }

    #[test]
    fn full_sample_covers_everyone_but_self() {
        let mut rng = SmallRng::seed_from_u64(3);
        let sample = sample_without_replacement(&mut rng, 6, 5, Some(0)).unwrap();
        let unique: HashSet<usize> = sample.into_iter().collect();
        assert_eq!(unique, (1..6).collect());
    }

    #[test]
    fn oversampling_is_an_error() {
        let mut rng = SmallRng::seed_from_u64(3);
        let result = sample_without_replacement(&mut rng, 3, 3, Some(1));
        assert!(matches!(result, Err(ResistanceError::ConfigError(_))));
        assert!(sample_without_replacement(&mut rng, 3, 3, None).is_ok());
    }

    #[test]
    fn roughly_uniform() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut counts = [0usize; 4];
        for _ in 0..40_000 {
            for index in sample_without_replacement(&mut rng, 4, 1, None).unwrap() {
                counts[index] += 1;
            }
        }
        for count in counts {
            assert!((9_000..11_000).contains(&count), "count {count} not near 10000");
        }
    }
}
