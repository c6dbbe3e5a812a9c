// Copyright 2023 Rémy Oudompheng. All rights reserved.
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

//! Streams the plateau points of m(k) for Erdős problem 962:
//! m(k) is the least m such that every element of m+1 .. m+k has a
//! prime factor greater than k.
//!
//! Output is a header comment followed by one `k, m` row per plateau,
//! suitable for km_plateaus.csv.
//!
//! <https://www.erdosproblems.com/962>

use std::str::FromStr;

use mksieve::{params, search, Preferences, Verbosity};

fn main() {
    let arg = arguments::parse(std::env::args()).unwrap();
    if arg.get::<bool>("help").is_some() || arg.orphans.len() > 4 {
        eprintln!("Usage: mks [OPTIONS] [K] [THREADS] [TILE_LEN] [BATCH_TILES]");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  K            sweep k = 1..=K (default 200)");
        eprintln!("  THREADS      worker threads, 0 = all logical CPUs (default 0)");
        eprintln!("  TILE_LEN     candidate starts per worker tile (default 65536)");
        eprintln!("  BATCH_TILES  tiles per worker stride per batch (default 128)");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --help                    show this help");
        eprintln!("  --verbose silent|info|verbose|debug");
        return;
    }
    let bound = parse_orphan(&arg.orphans, 0).unwrap_or(params::DEFAULT_BOUND);
    let threads: usize = parse_orphan(&arg.orphans, 1).unwrap_or(0);
    let tile_len = parse_orphan(&arg.orphans, 2).unwrap_or(params::TILE_LEN);
    let batch_tiles = parse_orphan(&arg.orphans, 3).unwrap_or(params::BATCH_TILES);
    let v = arg.get::<String>("verbose").unwrap_or("info".into());

    let ncpus = std::thread::available_parallelism().map_or(1, |n| n.get());
    let mut prefs = Preferences::default();
    prefs.threads = Some(match threads {
        0 => ncpus,
        t => t.min(ncpus),
    });
    prefs.tile_len = Some(tile_len);
    prefs.batch_tiles = Some(batch_tiles);
    prefs.verbosity = Verbosity::from_str(&v).unwrap();

    // Keep the machine responsive during long sweeps.
    lower_priority();

    let tpool: Option<rayon::ThreadPool> = match prefs.threads {
        None | Some(0) | Some(1) => None,
        Some(t) => Some(
            rayon::ThreadPoolBuilder::new()
                .num_threads(t)
                .build()
                .expect("cannot create thread pool"),
        ),
    };
    if prefs.verbose(Verbosity::Info) {
        eprintln!(
            "Sweeping k = 1..={bound} with {} threads, tile {tile_len}, batch {batch_tiles}",
            prefs.threads.unwrap_or(1)
        );
    }

    println!("; plateau points: k, m");
    let res = search::sweep(bound, &prefs, tpool.as_ref(), |k, m| {
        println!("{k}, {m}");
    });
    if let Err(e) = res {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn parse_orphan<T: FromStr>(orphans: &[String], idx: usize) -> Option<T> {
    orphans.get(idx).and_then(|s| s.parse().ok())
}

#[cfg(unix)]
fn lower_priority() {
    unsafe {
        libc::nice(10);
    }
}

#[cfg(not(unix))]
fn lower_priority() {}
