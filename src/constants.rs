//! Board-size configuration and geometry constants.
//!
//! Board size is selected by Cargo feature, mirroring the layout of the
//! original Go engine this crate descends from: exactly one size feature
//! must be enabled, and it drives both the 1D padded board array and the
//! [`crate::bitset::BitSet`] capacity.
//!
//! ```sh
//! cargo build                                      # 11x11 (default)
//! cargo build --no-default-features --features board19x19
//! ```

#[cfg(feature = "board11x11")]
pub const WIDTH: usize = 11;
#[cfg(feature = "board11x11")]
pub const HEIGHT: usize = 11;
#[cfg(feature = "board11x11")]
pub const BITSETSIZE: usize = 128;

#[cfg(feature = "board13x13")]
pub const WIDTH: usize = 13;
#[cfg(feature = "board13x13")]
pub const HEIGHT: usize = 13;
#[cfg(feature = "board13x13")]
pub const BITSETSIZE: usize = 192;

#[cfg(feature = "board14x14")]
pub const WIDTH: usize = 14;
#[cfg(feature = "board14x14")]
pub const HEIGHT: usize = 14;
#[cfg(feature = "board14x14")]
pub const BITSETSIZE: usize = 224;

#[cfg(feature = "board19x19")]
pub const WIDTH: usize = 19;
#[cfg(feature = "board19x19")]
pub const HEIGHT: usize = 19;
#[cfg(feature = "board19x19")]
pub const BITSETSIZE: usize = 384;

// Compile-time check: exactly one board size feature must be enabled.
#[cfg(all(feature = "board11x11", feature = "board13x13"))]
compile_error!("Cannot enable both 'board11x11' and 'board13x13' at the same time");
#[cfg(all(feature = "board11x11", feature = "board14x14"))]
compile_error!("Cannot enable both 'board11x11' and 'board14x14' at the same time");
#[cfg(all(feature = "board11x11", feature = "board19x19"))]
compile_error!("Cannot enable both 'board11x11' and 'board19x19' at the same time");
#[cfg(all(feature = "board13x13", feature = "board14x14"))]
compile_error!("Cannot enable both 'board13x13' and 'board14x14' at the same time");
#[cfg(all(feature = "board13x13", feature = "board19x19"))]
compile_error!("Cannot enable both 'board13x13' and 'board19x19' at the same time");
#[cfg(all(feature = "board14x14", feature = "board19x19"))]
compile_error!("Cannot enable both 'board14x14' and 'board19x19' at the same time");
#[cfg(not(any(
    feature = "board11x11",
    feature = "board13x13",
    feature = "board14x14",
    feature = "board19x19"
)))]
compile_error!(
    "Must enable exactly one board size feature: 'board11x11', 'board13x13', 'board14x14' or 'board19x19'"
);

/// Number of 64-bit words backing a [`crate::bitset::BitSet`].
pub const BITSET_WORDS: usize = BITSETSIZE.div_ceil(64);

/// Number of non-interior atoms: invalid, resign, swap, and the four edges.
pub const FIRST_CELL: usize = 7;

/// Total number of interior cells.
pub const NUM_INTERIOR: usize = WIDTH * HEIGHT;

/// Total number of addressable cells (atoms + interior).
pub const NUM_CELLS: usize = FIRST_CELL + NUM_INTERIOR;

const _: () = assert!(
    NUM_CELLS <= BITSETSIZE,
    "board dimensions exceed the configured BitSet capacity"
);

/// Hex-adjacency offsets in (delta_col, delta_row) form: the six directions
/// of a hex grid laid out as a parallelogram (W, E, N, S, NE, SW).
pub const HEX_NEIGHBOR_OFFSETS: [(isize, isize); 6] =
    [(-1, 0), (1, 0), (0, -1), (0, 1), (1, -1), (-1, 1)];
