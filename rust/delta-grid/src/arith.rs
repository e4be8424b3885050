//! Small-integer primality helpers for u64 with u128 intermediates.

/// Modular exponentiation: base^exp mod m using binary method.
pub fn mod_pow(mut base: u64, mut exp: u64, m: u64) -> u64 {
    if m == 1 {
        return 0;
    }
    let m = m as u128;
    base %= m as u64;
    let mut b = base as u128;
    let mut result = 1u128;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * b % m;
        }
        exp >>= 1;
        b = b * b % m;
    }
    result as u64
}

/// Deterministic Miller-Rabin for all u64.
/// Witnesses {2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37} cover n < 3.3 * 10^24.
pub fn is_prime_u64(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 || n % 3 == 0 {
        return false;
    }

    // n-1 = 2^s * d
    let mut d = n - 1;
    let mut s = 0u32;
    while d % 2 == 0 {
        d /= 2;
        s += 1;
    }

    let witnesses = [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];
    'outer: for &a in &witnesses {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 0..s - 1 {
            x = (x as u128 * x as u128 % n as u128) as u64;
            if x == n - 1 {
                continue 'outer;
            }
        }
        return false;
    }
    true
}

/// Largest prime strictly below `n`, or `None` when `n <= 2`.
pub fn prev_prime(n: u64) -> Option<u64> {
    if n <= 2 {
        return None;
    }
    if n == 3 {
        return Some(2);
    }
    // Odd candidates only from here down; 2 is handled above.
    let mut candidate = if n % 2 == 0 { n - 1 } else { n - 2 };
    while candidate >= 3 {
        if is_prime_u64(candidate) {
            return Some(candidate);
        }
        candidate -= 2;
    }
    Some(2)
}

/// Largest prime factor of `n` by trial division. `None` for 0 and 1.
pub fn largest_prime_factor(mut n: u64) -> Option<u64> {
    if n < 2 {
        return None;
    }
    let mut largest = 1u64;
    while n % 2 == 0 {
        largest = 2;
        n /= 2;
    }
    let mut d = 3u64;
    while d.saturating_mul(d) <= n {
        while n % d == 0 {
            largest = d;
            n /= d;
        }
        d += 2;
    }
    if n > 1 {
        largest = n;
    }
    Some(largest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_pow_basic() {
        assert_eq!(mod_pow(2, 10, 1000), 24);
        assert_eq!(mod_pow(3, 0, 7), 1);
        assert_eq!(mod_pow(5, 690, 691), 1);
        assert_eq!(mod_pow(7, 1, 7), 0);
    }

    fn is_prime_naive(n: u64) -> bool {
        n >= 2 && (2..n).take_while(|d| d * d <= n).all(|d| n % d != 0)
    }

    #[test]
    fn test_is_prime_matches_trial_division() {
        for n in 0..=2000u64 {
            assert_eq!(is_prime_u64(n), is_prime_naive(n), "n={n}");
        }
    }

    #[test]
    fn test_is_prime_large() {
        assert!(is_prime_u64(1_000_000_007));
        assert!(!is_prime_u64(1_000_000_007 * 3));
        // Carmichael number
        assert!(!is_prime_u64(561));
    }

    #[test]
    fn test_prev_prime() {
        assert_eq!(prev_prime(0), None);
        assert_eq!(prev_prime(2), None);
        assert_eq!(prev_prime(3), Some(2));
        assert_eq!(prev_prime(4), Some(3));
        assert_eq!(prev_prime(13), Some(11));
        assert_eq!(prev_prime(24), Some(23));
        assert_eq!(prev_prime(90), Some(89));
    }

    #[test]
    fn test_largest_prime_factor() {
        assert_eq!(largest_prime_factor(0), None);
        assert_eq!(largest_prime_factor(1), None);
        assert_eq!(largest_prime_factor(2), Some(2));
        assert_eq!(largest_prime_factor(244), Some(61));
        assert_eq!(largest_prime_factor(1024), Some(2));
        assert_eq!(largest_prime_factor(1_000_000_007), Some(1_000_000_007));
        assert_eq!(largest_prime_factor(2 * 3 * 5 * 7 * 11 * 13), Some(13));
    }
}
