// Default tunables for the tiled search.

/// Candidate starts per worker tile. Small enough that the residual
/// array (8 bytes per position) stays inside per-core cache.
pub const TILE_LEN: usize = 65536;

/// Tiles per worker stride in one batch. Larger batches amortize epoch
/// setup; smaller batches let a shrinking end_limit cut work sooner
/// when a very small m exists.
pub const BATCH_TILES: u64 = 128;

/// Default upper bound of the outer sweep over k.
pub const DEFAULT_BOUND: u32 = 200;
