//! Concrete challenges, one module per puzzle family.

mod alignment;
mod calibration;
mod cipher;
mod entry_code;
mod ibn5100;
mod inverted;
mod logic_gates;
mod mirror;
mod paradox;
mod patience;
mod predict;
mod signal;
mod trivia;

pub use alignment::*;
pub use calibration::*;
pub use cipher::*;
pub use entry_code::*;
pub use ibn5100::*;
pub use inverted::*;
pub use logic_gates::*;
pub use mirror::*;
pub use paradox::*;
pub use patience::*;
pub use predict::*;
pub use signal::*;
pub use trivia::*;

use rand::{Rng, RngCore};

const ENTROPY_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Random lowercase alphanumeric string of `len` characters.
pub fn entropy_sample(rng: &mut dyn RngCore, len: usize) -> String {
    (0..len)
        .map(|_| ENTROPY_ALPHABET[rng.gen_range(0..ENTROPY_ALPHABET.len())] as char)
        .collect()
}
