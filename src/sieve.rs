//! Tiled smoothness sieve.
//!
//! A tile is a run of `start_count` candidate starts owned by one
//! worker. The window base+1 .. base+start_count+k (the starts plus a
//! lookahead of k) is sieved by trial division: every prime p <= k
//! strips its factors from the positions it divides, so that after all
//! primes residual[j] is the largest divisor of base+1+j whose prime
//! factors all exceed k. A position is k-smooth iff its residual is 1.
//!
//! Workers scan tiles in strides of step = tile_len * thread_count.
//! For each prime the offset of its first multiple inside the window is
//! carried from one tile of the stride to the next:
//!
//!   off' = (off - step % p) mod p
//!
//! which replaces the per-tile base % p by a subtraction and a branch.
//! The offsets only ever feed positions inside the current window, so
//! a tile truncated by a shrinking scan horizon still carries exact
//! offsets for the full stride advance.

use bitvec::prelude::*;

use crate::fbase::SmoothBase;

/// Per-k, per-stride sieving plan shared by all workers of an epoch.
pub struct TileSieve<'a> {
    pub k: u32,
    base: &'a SmoothBase,
    // step % p for each prime of the base.
    step_mod: Vec<u32>,
}

/// Scratch owned by one worker thread. Grown on demand, never shrunk,
/// reused for every tile and every epoch.
#[derive(Default)]
pub struct Workspace {
    // For each prime, the least j >= 0 with p | base+1+j; always < p.
    off: Vec<u32>,
    // Cofactors of the window values with all primes <= k stripped.
    residual: Vec<u64>,
    // Bit j set iff base+1+j is k-smooth.
    smooth: BitVec,
}

impl<'a> TileSieve<'a> {
    pub fn new(k: u32, base: &'a SmoothBase, step: u64) -> Self {
        let step_mod = base
            .primes
            .iter()
            .zip(&base.divs)
            .map(|(&p, d)| {
                if p == 2 {
                    (step & 1) as u32
                } else {
                    d.modu64(step) as u32
                }
            })
            .collect();
        TileSieve { k, base, step_mod }
    }

    /// Positions the per-prime offsets for a worker's first tile of an
    /// epoch: off[i] = (-first_test) mod p.
    pub fn init_offsets(&self, w: &mut Workspace, first_test: u64) {
        w.off.clear();
        w.off
            .extend(self.base.primes.iter().zip(&self.base.divs).map(|(&p, d)| {
                if p == 2 {
                    (first_test & 1) as u32
                } else {
                    let r = d.modu64(first_test) as u32;
                    if r == 0 {
                        0
                    } else {
                        p - r
                    }
                }
            }));
    }

    fn sieve_window(&self, w: &mut Workspace, first_test: u64, win_len: usize) {
        w.residual.clear();
        w.residual.extend((0..win_len as u64).map(|j| first_test + j));
        w.smooth.clear();
        w.smooth.resize(win_len, false);

        let res = &mut w.residual[..win_len];
        for (i, (&p, div)) in self.base.primes.iter().zip(&self.base.divs).enumerate() {
            let mut j = w.off[i] as usize;
            if p == 2 {
                while j < win_len {
                    // The position is even, take out every factor of 2
                    // with one shift.
                    unsafe {
                        let x = res.get_unchecked_mut(j);
                        *x >>= x.trailing_zeros();
                    }
                    j += 2;
                }
            } else {
                while j < win_len {
                    unsafe {
                        let x = res.get_unchecked_mut(j);
                        while div.divide_if_divisible(x) {}
                    }
                    j += p as usize;
                }
            }
            // Carry the offset to this worker's next tile (base + step).
            let sm = self.step_mod[i];
            if sm != 0 {
                let o = w.off[i];
                w.off[i] = if o >= sm { o - sm } else { o + p - sm };
            }
        }

        for (j, &x) in res.iter().enumerate() {
            if x == 1 {
                w.smooth.set(j, true);
            }
        }
    }

    /// Scans the starts m0 .. m0+start_count-1 and returns the smallest
    /// m whose window m+1 .. m+k is entirely non-smooth, if any.
    ///
    /// Always advances the carried offsets by one full stride.
    pub fn scan_tile(&self, w: &mut Workspace, m0: u64, start_count: usize) -> Option<u64> {
        if start_count == 0 {
            return None;
        }
        let k = self.k as usize;
        let win_len = start_count + k;
        self.sieve_window(w, m0 + 1, win_len);

        let mut bad = w.smooth[..k].count_ones();
        if bad == 0 {
            return Some(m0);
        }
        for s in 1..start_count {
            bad -= w.smooth[s - 1] as usize;
            bad += w.smooth[s + k - 1] as usize;
            if bad == 0 {
                return Some(m0 + s as u64);
            }
        }
        None
    }
}

#[cfg(test)]
fn is_smooth(mut n: u64, k: u32) -> bool {
    for d in 2..=k as u64 {
        while n % d == 0 {
            n /= d;
        }
    }
    n == 1
}

#[test]
fn test_sieve_window_matches_naive() {
    let k = 10;
    let base = SmoothBase::new(k);
    let sieve = TileSieve::new(k, &base, 512);
    let mut w = Workspace::default();
    for first in [1u64, 97, 1_000_000_007] {
        sieve.init_offsets(&mut w, first);
        sieve.sieve_window(&mut w, first, 500);
        for j in 0..500u64 {
            assert_eq!(
                w.smooth[j as usize],
                is_smooth(first + j, k),
                "first={first} j={j}"
            );
            // The residual is the cofactor with small factors removed.
            let mut n = first + j;
            for &p in &base.primes {
                while n % p as u64 == 0 {
                    n /= p as u64;
                }
            }
            assert_eq!(w.residual[j as usize], n);
        }
    }
}

#[test]
fn test_offset_carry() {
    // After one tile the carried offsets must equal a fresh
    // initialization at base + step.
    let k = 7;
    let tile = 32usize;
    let step = (tile * 3) as u64;
    let base = SmoothBase::new(k);
    let sieve = TileSieve::new(k, &base, step);

    let mut w = Workspace::default();
    let m0 = 1000u64;
    sieve.init_offsets(&mut w, m0 + 1);
    for hop in 1..=4u64 {
        sieve.scan_tile(&mut w, m0 + (hop - 1) * step, tile);
        let mut fresh = Workspace::default();
        sieve.init_offsets(&mut fresh, m0 + hop * step + 1);
        assert_eq!(w.off, fresh.off, "hop={hop}");
    }
}

#[test]
fn test_scan_tile_smallest() {
    // k=2: the first window of two consecutive non-2-smooth numbers is
    // (5, 6), so m = 4.
    let base = SmoothBase::new(2);
    let sieve = TileSieve::new(2, &base, 64);
    let mut w = Workspace::default();
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 20), Some(4));

    // Only the starts 0 and 1 are scanned: both windows contain a
    // power of 2.
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 2), None);

    sieve.init_offsets(&mut w, 5);
    assert_eq!(sieve.scan_tile(&mut w, 4, 8), Some(4));
}

#[test]
fn test_scan_tile_boundary() {
    // k=3: m(3) = 12 (the block 13, 14, 15). A tile whose starts stop
    // just short of 12 must not find it; the next tile must.
    let base = SmoothBase::new(3);
    let sieve = TileSieve::new(3, &base, 12);
    let mut w = Workspace::default();
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 12), None);
    assert_eq!(sieve.scan_tile(&mut w, 12, 12), Some(12));

    let sieve = TileSieve::new(3, &base, 13);
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 13), Some(12));
}

#[test]
fn test_scan_tile_empty() {
    let base = SmoothBase::new(5);
    let sieve = TileSieve::new(5, &base, 16);
    let mut w = Workspace::default();
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 0), None);
}

#[test]
fn test_scan_tile_k1() {
    // With no primes in the base only the integer 1 is smooth, so the
    // smallest valid start is m = 1 (the block containing just 2).
    let base = SmoothBase::new(1);
    let sieve = TileSieve::new(1, &base, 64);
    let mut w = Workspace::default();
    sieve.init_offsets(&mut w, 1);
    assert_eq!(sieve.scan_tile(&mut w, 0, 64), Some(1));
}
