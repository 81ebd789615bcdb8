//! Synthetic users for exercising the matcher without log data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::feature::vector::{PageVector, parse_flag};

/// A user whose every page flag is an independent fair coin flip.
pub fn random_user<R: Rng + ?Sized>(pages: usize, rng: &mut R) -> PageVector {
    (0..pages).map(|_| rng.random_bool(0.5)).collect()
}

/// Reproducible [`random_user`] from a seed.
pub fn seeded_random_user(pages: usize, seed: u64) -> PageVector {
    let mut rng = StdRng::seed_from_u64(seed);
    random_user(pages, &mut rng)
}

/// Parse a user from comma-separated flags such as `1,0,true,no`.
pub fn parse_user_flags(input: &str) -> Option<PageVector> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_flag)
        .collect::<Option<Vec<bool>>>()
        .map(|flags| PageVector::from_bools(&flags))
}
