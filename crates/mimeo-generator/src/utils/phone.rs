//! Phone number function.

use mimeo_core::Atom;
use rand::Rng;

pub const DEFAULT_FORMAT: &str = "XXX-XXX-XXXX";

/// Replace every `X`/`x` in `format` with a random digit.
pub fn phone<R: Rng>(rng: &mut R, format: &str) -> Atom {
    let value: String = format
        .chars()
        .map(|c| match c {
            'X' | 'x' => char::from(b'0' + rng.random_range(0..10u8)),
            other => other,
        })
        .collect();
    Atom::String(value)
}
