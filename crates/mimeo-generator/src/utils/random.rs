//! Random scalar functions: `random_str`, `random_int`, `random_item`.

use crate::error::RenderError;
use mimeo_core::Atom;
use rand::Rng;
use serde_json::Value;

const LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// String of `length` random ASCII letters.
pub fn random_str<R: Rng>(rng: &mut R, length: usize) -> Atom {
    let value: String = (0..length)
        .map(|_| LETTERS[rng.random_range(0..LETTERS.len())] as char)
        .collect();
    Atom::String(value)
}

/// Random integer in `[start, limit]`.
pub fn random_int<R: Rng>(rng: &mut R, start: i64, limit: i64) -> Result<Atom, RenderError> {
    if start > limit {
        return Err(RenderError::InvalidValue {
            util: "random_int".into(),
            reason: format!("start ({start}) is greater than limit ({limit})"),
        });
    }
    Ok(Atom::from(rng.random_range(start..=limit)))
}

/// Random element of `items`, or an empty string when there is none.
pub fn random_item<R: Rng>(rng: &mut R, items: &[Value]) -> Result<Atom, RenderError> {
    let atoms = items
        .iter()
        .map(|item| {
            Atom::from_json(item).ok_or_else(|| RenderError::InvalidValue {
                util: "random_item".into(),
                reason: format!("items must be atomic, got {item}"),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    if atoms.is_empty() {
        return Ok(Atom::from(""));
    }
    let index = rng.random_range(0..atoms.len());
    Ok(atoms[index].clone())
}
