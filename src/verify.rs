//! Independent recheck of plateau points.
//!
//! The check deliberately avoids the crate's sieving machinery: each
//! block element is reduced by plain trial division, so that agreement
//! with the producer is evidence rather than tautology.

/// Returns true iff n keeps a prime factor strictly greater than k
/// after stripping all prime factors <= k.
pub fn has_factor_above(mut n: u64, k: u32) -> bool {
    if n <= 1 {
        return false;
    }
    let k = k as u64;
    if k >= 2 {
        while n & 1 == 0 {
            n >>= 1;
        }
    }
    let mut d = 3;
    while d <= k && d * d <= n {
        while n % d == 0 {
            n /= d;
        }
        d += 2;
    }
    // All prime factors below min(d, k+1) are gone. Either n is 1
    // (fully k-smooth), or its remaining factors are primes >= d, in
    // which case n itself tells whether one of them exceeds k.
    n > k
}

/// Checks that every element of the block m+1 .. m+k has a prime
/// factor greater than k. On failure returns the first offending
/// element.
pub fn check_window(k: u32, m: u64) -> Result<(), u64> {
    for i in 1..=k as u64 {
        let n = m + i;
        if !has_factor_above(n, k) {
            return Err(n);
        }
    }
    Ok(())
}

/// Extracts (k, m) from one CSV-ish row. Tokens may be separated by
/// commas and/or whitespace; rows whose first two tokens are not
/// non-negative decimal integers yield None and should be ignored.
pub fn parse_line(line: &str) -> Option<(u32, u64)> {
    let mut tokens = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty());
    let k = tokens.next()?.parse::<u32>().ok()?;
    let m = tokens.next()?.parse::<u64>().ok()?;
    Some((k, m))
}

#[test]
fn test_has_factor_above() {
    // 1 is smooth for every k.
    assert!(!has_factor_above(1, 1));
    assert!(!has_factor_above(1, 100));
    // Any n >= 2 passes for k = 1.
    assert!(has_factor_above(2, 1));
    assert!(has_factor_above(64, 1));
    // Powers of 2 are 2-smooth.
    assert!(!has_factor_above(64, 2));
    assert!(has_factor_above(6, 2));
    assert!(!has_factor_above(6, 3));
    // A remaining prime equal to k must not pass.
    assert!(!has_factor_above(49, 7));
    assert!(has_factor_above(49, 6));
    // Large prime survives deep stripping.
    assert!(has_factor_above(2 * 3 * 5 * 101, 100));
    assert!(!has_factor_above(2 * 3 * 5 * 97, 100));
}

#[test]
fn test_check_window() {
    // m(3) = 12: the block 13, 14, 15.
    assert_eq!(check_window(3, 12), Ok(()));
    // One below the plateau must fail and name the culprit 12.
    assert_eq!(check_window(3, 11), Err(12));
    assert_eq!(check_window(1, 1), Ok(()));
    assert_eq!(check_window(1, 0), Err(1));
}

#[test]
fn test_parse_line() {
    assert_eq!(parse_line("5, 54"), Some((5, 54)));
    assert_eq!(parse_line("5,54"), Some((5, 54)));
    assert_eq!(parse_line("  5\t 54  extra"), Some((5, 54)));
    assert_eq!(parse_line("; plateau points: k, m"), None);
    assert_eq!(parse_line("# comment"), None);
    assert_eq!(parse_line(""), None);
    assert_eq!(parse_line("12"), None);
    assert_eq!(parse_line("-3, 5"), None);
    assert_eq!(parse_line("3, -5"), None);
}

#[test]
fn test_sweep_output_verifies() {
    use crate::{search, Preferences, Verbosity};
    let prefs = Preferences {
        tile_len: Some(256),
        batch_tiles: Some(8),
        verbosity: Verbosity::Silent,
        ..Default::default()
    };
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap();
    let mut rows = String::from("; plateau points: k, m\n");
    search::sweep(10, &prefs, Some(&pool), |k, m| {
        rows.push_str(&format!("{k}, {m}\n"));
    })
    .unwrap();

    let mut checked = 0;
    for line in rows.lines() {
        let Some((k, m)) = parse_line(line) else {
            continue;
        };
        assert_eq!(check_window(k, m), Ok(()), "k={k} m={m}");
        // Minimality: the previous start must fail.
        if m > 0 {
            assert!(check_window(k, m - 1).is_err(), "k={k} m={m}");
        }
        checked += 1;
    }
    assert!(checked >= 3);
}
