//! Consecutive-prime-multiple chains: does a strictly increasing segment read
//! `m·p_j, m·p_{j+1}, …, m·p_0` for consecutive primes ending at `p_0`?

use serde::Serialize;

use crate::arith::{largest_prime_factor, prev_prime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimeChainMatch {
    pub multiplier: u64,
    /// Largest prime factor of the last element; the chain's top prime.
    pub terminal_prime: u64,
    pub length: usize,
}

/// Classify a segment. `None` is a negative result, not an error.
///
/// The multiplier is `last / p0` where `p0` is the largest prime factor of the
/// last element. Walking backward, each element must equal the multiplier
/// times the next smaller prime. Any mismatch rejects the whole segment.
pub fn classify(segment: &[u64]) -> Option<PrimeChainMatch> {
    if segment.len() < 2 {
        return None;
    }
    let last = *segment.last()?;
    let terminal_prime = largest_prime_factor(last)?;
    let multiplier = last / terminal_prime;

    let mut prime = terminal_prime;
    for (step, &value) in segment.iter().rev().enumerate() {
        if step > 0 {
            prime = prev_prime(prime)?;
        }
        if value != multiplier * prime {
            return None;
        }
    }

    Some(PrimeChainMatch {
        multiplier,
        terminal_prime,
        length: segment.len(),
    })
}
