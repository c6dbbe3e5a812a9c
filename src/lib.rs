//! Computation of m(k), the least m such that no element of the block
//! m+1 .. m+k is k-smooth, and of the plateau points where m(k)
//! strictly increases (Erdős problem 962).
//!
//! The search tiles the half-line m >= m(k-1) across worker threads,
//! strips small prime factors with precomputed reciprocals instead of
//! hardware division, and shrinks the shared scan horizon whenever a
//! worker publishes a better candidate, so the returned m is the global
//! minimum even though tiles complete out of order.
//!
//! <https://www.erdosproblems.com/962>

use std::fmt;
use std::str::FromStr;

pub mod arith;
pub mod fbase;
pub mod params;
pub mod search;
pub mod sieve;
pub mod verify;

/// Runtime preferences shared by the binaries and the search routines.
#[derive(Clone, Debug, Default)]
pub struct Preferences {
    pub threads: Option<usize>,
    pub tile_len: Option<usize>,
    pub batch_tiles: Option<u64>,
    pub verbosity: Verbosity,
}

impl Preferences {
    pub fn verbose(&self, v: Verbosity) -> bool {
        self.verbosity >= v
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent,
    #[default]
    Info,
    Verbose,
    Debug,
}

impl FromStr for Verbosity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silent" => Ok(Verbosity::Silent),
            "info" => Ok(Verbosity::Info),
            "verbose" => Ok(Verbosity::Verbose),
            "debug" => Ok(Verbosity::Debug),
            _ => Err(format!("invalid verbosity {s}")),
        }
    }
}

/// The batched scan reached the top of the representable range without
/// finding a block free of k-smooth numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeExhausted(pub u32);

impl fmt::Display for RangeExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "search for k={} exhausted the 64-bit range", self.0)
    }
}

impl std::error::Error for RangeExhausted {}
