//! Primality testing
//!
//! Primality is exposed as a capability rather than a fixed algorithm so the
//! scanner and aggregator contracts stay untouched when a faster oracle
//! (sieve, probabilistic) is substituted. The default is plain trial division,
//! which is entirely adequate below ~10^12 when the work is spread across
//! workers.

/// Primality oracle
///
/// Implementations must be deterministic: the scanner's output is a pure
/// function of its inputs and the oracle.
pub trait PrimalityOracle: Send + Sync {
    /// Returns true if `n` is prime.
    fn is_prime(&self, n: u64) -> bool;
}

/// Trial division oracle
///
/// Tests odd divisors up to sqrt(n). No precomputation, no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrialDivision;

impl PrimalityOracle for TrialDivision {
    fn is_prime(&self, n: u64) -> bool {
        if n < 2 {
            return false;
        }
        if n < 4 {
            return true; // 2 and 3
        }
        if n % 2 == 0 {
            return false;
        }
        let mut i = 3u64;
        while i * i <= n {
            if n % i == 0 {
                return false;
            }
            i += 2;
        }
        true
    }
}

/// Returns the smallest prime strictly greater than `x`.
///
/// Candidates 0 and 1 are rejected by the oracle, so `next_prime(oracle, 0)`
/// is 2.
pub fn next_prime(oracle: &dyn PrimalityOracle, x: u64) -> u64 {
    let mut i = x + 1;
    while !oracle.is_prime(i) {
        i += 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_primes() {
        let oracle = TrialDivision;
        for n in [2u64, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 97] {
            assert!(oracle.is_prime(n), "{} should be prime", n);
        }
    }

    #[test]
    fn test_small_composites() {
        let oracle = TrialDivision;
        for n in [0u64, 1, 4, 6, 8, 9, 15, 21, 25, 27, 49, 91, 100] {
            assert!(!oracle.is_prime(n), "{} should not be prime", n);
        }
    }

    #[test]
    fn test_perfect_squares_of_primes() {
        // 9, 25, 49 are the classic victims of an i*i < n loop bound
        let oracle = TrialDivision;
        assert!(!oracle.is_prime(9));
        assert!(!oracle.is_prime(25));
        assert!(!oracle.is_prime(49));
        assert!(!oracle.is_prime(121));
    }

    #[test]
    fn test_larger_values() {
        let oracle = TrialDivision;
        assert!(oracle.is_prime(1_000_003));
        assert!(!oracle.is_prime(1_000_001)); // 101 * 9901
        assert!(oracle.is_prime(999_999_937));
    }

    #[test]
    fn test_next_prime() {
        let oracle = TrialDivision;
        assert_eq!(next_prime(&oracle, 0), 2);
        assert_eq!(next_prime(&oracle, 1), 2);
        assert_eq!(next_prime(&oracle, 2), 3);
        assert_eq!(next_prime(&oracle, 3), 5);
        assert_eq!(next_prime(&oracle, 89), 97);
        assert_eq!(next_prime(&oracle, 97), 101);
    }
}
