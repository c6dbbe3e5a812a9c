use brunch::Bench;

use mksieve::arith::Divider;
use mksieve::fbase::{self, SmoothBase};
use mksieve::sieve::{TileSieve, Workspace};

brunch::benches! {
    // Eratosthenes sieve
    Bench::new("primes_upto(200)")
        .run_seeded(200u32, fbase::primes_upto),
    Bench::new("primes_upto(100000)")
        .run_seeded(100_000u32, fbase::primes_upto),
    // Reciprocal division against the hot strip loop's operand sizes
    {
        let d = Divider::new(199);
        Bench::new("1000x divmod64(n, 199)")
            .with_samples(10_000)
            .run_seeded(1_234_567_891_234_567_891u64, |n| {
                let mut acc = 0u64;
                for i in 0..1000 {
                    acc ^= d.divmod64(n + i).1;
                }
                acc
            })
    },
    // Full tile scan at the default production shape
    {
        let base = SmoothBase::new(200);
        let sieve = TileSieve::new(200, &base, 65536);
        let mut w = Workspace::default();
        Bench::new("scan_tile(k=200, tile=65536)")
            .run(move || {
                sieve.init_offsets(&mut w, 1_000_000_001);
                sieve.scan_tile(&mut w, 1_000_000_000, 65536)
            })
    },
}
