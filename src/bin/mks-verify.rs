//! Rechecks a plateau listing produced by mks (or the CSV saved from
//! its output): for every row (k, m), each element of m+1 .. m+k must
//! keep a prime factor greater than k under naive trial division.
//!
//! Rows are accepted with any comma/whitespace separation; lines whose
//! first two tokens are not non-negative decimal integers (headers,
//! comments) are ignored.

use std::io::Read;
use std::time::Instant;

use mksieve::verify;

fn main() {
    let arg = arguments::parse(std::env::args()).unwrap();
    if arg.get::<bool>("help").is_some() || arg.orphans.len() > 1 {
        eprintln!("Usage: mks-verify [FILE]");
        eprintln!();
        eprintln!("Reads plateau rows `k, m` from FILE (or standard input)");
        eprintln!("and rechecks each block by trial division.");
        return;
    }

    let input = match arg.orphans.first() {
        Some(path) => std::fs::read_to_string(path).unwrap_or_else(|e| {
            eprintln!("cannot read {path}: {e}");
            std::process::exit(2);
        }),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf).unwrap_or_else(|e| {
                eprintln!("cannot read standard input: {e}");
                std::process::exit(2);
            });
            buf
        }
    };

    let start = Instant::now();
    let mut checked = 0u64;
    let mut failures = 0u64;
    for line in input.lines() {
        let Some((k, m)) = verify::parse_line(line) else {
            continue;
        };
        checked += 1;
        if let Err(n) = verify::check_window(k, m) {
            println!("FAIL: k={k}, m={m}: {n} has no prime factor > {k}");
            failures += 1;
        }
    }

    println!(
        "Checked {checked} plateau points in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    if failures == 0 {
        println!("All values check out.");
    } else {
        println!("Found {failures} failures.");
        std::process::exit(1);
    }
}
