// Copyright 2022, 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Division by the small primes of the factor base.
//!
//! The inner sieve loop strips prime factors from 64-bit cofactors
//! millions of times per tile; a hardware 64-bit division there costs
//! 20-40x more than a 64x64->128 multiply. Each prime gets a
//! precomputed reciprocal so the strip loop is mulhi + at most two
//! subtractions.
//!
//! <https://gmplib.org/~tege/divcnst-pldi94.pdf>

/// A precomputed structure to divide a u64 by a static prime number.
///
/// For odd p the multiplier is floor((2^64 - 1) / p), so that
/// mulhi(n, m64) is one of floor(n/p), floor(n/p)-1, floor(n/p)-2
/// for every n. For p = 2 the multiplier 2^63 makes mulhi an exact
/// right shift.
#[derive(Clone, Copy, Debug)]
pub struct Divider {
    pub p: u32,
    m64: u64,
}

impl Divider {
    pub const fn new(p: u32) -> Self {
        let m64 = if p == 2 { 1u64 << 63 } else { u64::MAX / p as u64 };
        Divider { p, m64 }
    }

    /// Returns (n / p, n % p).
    #[inline]
    pub fn divmod64(&self, n: u64) -> (u64, u64) {
        let p = self.p as u64;
        let mut q = (((n as u128) * (self.m64 as u128)) >> 64) as u64;
        let mut r = n - q * p;
        // The estimate is never more than 2 below the true quotient.
        if r >= p {
            r -= p;
            q += 1;
        }
        if r >= p {
            r -= p;
            q += 1;
        }
        (q, r)
    }

    #[inline]
    pub fn modu64(&self, n: u64) -> u64 {
        self.divmod64(n).1
    }

    /// If p divides n, replace n by n/p and return true.
    /// This is the inner step of trial division.
    #[inline]
    pub fn divide_if_divisible(&self, n: &mut u64) -> bool {
        let (q, r) = self.divmod64(*n);
        if r != 0 {
            return false;
        }
        *n = q;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divider() {
        const M64: u64 = 100_000_000_000_000_000;
        let ps = crate::fbase::primes_upto(2000);
        for p in ps {
            let d = Divider::new(p);
            let p = p as u64;
            for n in M64..M64 + std::cmp::max(1000, 2 * p) {
                assert_eq!((n / p, n % p), d.divmod64(n));
            }
            // Values around multiples of p exercise the r == 0 path.
            for i in 0..100u64 {
                let n = (M64 / p + i) * p;
                assert_eq!((n / p, 0), d.divmod64(n));
                assert_eq!((n / p, p - 1), d.divmod64(n - 1));
            }
        }
    }

    #[test]
    fn test_divider_extremes() {
        // Operands near 2^64 make the truncated reciprocal underestimate
        // the quotient, forcing the correction steps.
        let ps = crate::fbase::primes_upto(300);
        for p in ps {
            let d = Divider::new(p);
            let p = p as u64;
            for n in (u64::MAX - 4 * p)..=u64::MAX {
                assert_eq!((n / p, n % p), d.divmod64(n));
            }
            for n in [0u64, 1, p - 1, p, p + 1, u64::MAX / p * p] {
                assert_eq!((n / p, n % p), d.divmod64(n));
            }
        }
    }

    #[test]
    fn test_divider_random() {
        use rand::Rng;
        let mut rng = rand::thread_rng();
        for &p in &[2u32, 3, 5, 7, 97, 65521, 4294967291] {
            let d = Divider::new(p);
            let p = p as u64;
            for _ in 0..10_000 {
                let n: u64 = rng.gen();
                assert_eq!((n / p, n % p), d.divmod64(n));
            }
        }
    }

    #[test]
    fn test_divide_if_divisible() {
        let d = Divider::new(7);
        let mut n = 7u64 * 7 * 7 * 13;
        assert!(d.divide_if_divisible(&mut n));
        assert!(d.divide_if_divisible(&mut n));
        assert!(d.divide_if_divisible(&mut n));
        assert_eq!(n, 13);
        assert!(!d.divide_if_divisible(&mut n));
        assert_eq!(n, 13);
    }
}
