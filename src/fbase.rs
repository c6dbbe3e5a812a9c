// Copyright 2022, 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! The factor base for smoothness testing: all primes up to k.

use crate::arith::Divider;

/// Returns the ordered list of primes in [2, n].
pub fn primes_upto(n: u32) -> Vec<u32> {
    if n < 2 {
        return vec![];
    }
    let mut composite = vec![false; n as usize + 1];
    let mut primes = vec![];
    for i in 2..=n as usize {
        if composite[i] {
            continue;
        }
        primes.push(i as u32);
        // No need to cross off below i*i, smaller multiples have a
        // smaller prime factor.
        if (i as u64) * (i as u64) <= n as u64 {
            let mut j = i * i;
            while j <= n as usize {
                composite[j] = true;
                j += i;
            }
        }
    }
    primes
}

/// The primes p <= k along with their dividers, built once per k.
/// A number is k-smooth iff repeatedly dividing by these primes
/// reduces it to 1.
///
/// Each additional information is held in a separate vector to help
/// with memory locality.
#[derive(Clone, Debug)]
pub struct SmoothBase {
    pub primes: Vec<u32>,
    pub divs: Vec<Divider>,
}

impl SmoothBase {
    pub fn new(k: u32) -> Self {
        let primes = primes_upto(k);
        let divs = primes.iter().map(|&p| Divider::new(p)).collect();
        SmoothBase { primes, divs }
    }

    pub fn len(&self) -> usize {
        self.primes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primes.is_empty()
    }
}

#[test]
fn test_primes_upto() {
    assert_eq!(primes_upto(0), Vec::<u32>::new());
    assert_eq!(primes_upto(1), Vec::<u32>::new());
    assert_eq!(primes_upto(2), vec![2]);
    assert_eq!(
        primes_upto(100),
        vec![
            2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79,
            83, 89, 97
        ]
    );
    // pi(10^6) = 78498
    let ps = primes_upto(1_000_000);
    assert_eq!(ps.len(), 78498);
    assert_eq!(ps.last(), Some(&999983));
}

#[test]
fn test_smooth_base() {
    let base = SmoothBase::new(1);
    assert!(base.is_empty());

    let base = SmoothBase::new(30);
    assert_eq!(base.primes, vec![2, 3, 5, 7, 11, 13, 17, 19, 23, 29]);
    assert_eq!(base.len(), base.divs.len());
    for (&p, d) in base.primes.iter().zip(&base.divs) {
        assert_eq!(d.p, p);
        assert_eq!(d.divmod64(1000), (1000 / p as u64, 1000 % p as u64));
    }
}
