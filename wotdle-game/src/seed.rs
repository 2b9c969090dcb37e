//! Deterministic tank-of-day selection.
//! Every client picking for the same reference day over the same list agrees.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::vehicle::Vehicle;

fn fnv1a64(bytes: &[u8]) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0100_0000_01b3;
    let mut hash = FNV_OFFSET;
    for b in bytes {
        hash = (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Seed for a reference day (`yyyymmdd`), domain-separated from other uses.
#[must_use]
pub fn day_seed(day_number: u32) -> u64 {
    let mut buf = [0u8; 11];
    buf[..7].copy_from_slice(b"WOTDLE-");
    buf[7..].copy_from_slice(&day_number.to_le_bytes());
    fnv1a64(&buf)
}

/// Index into a list of `len` vehicles for the given day.
#[must_use]
pub fn day_index(day_number: u32, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let mut rng = ChaCha8Rng::seed_from_u64(day_seed(day_number));
    Some(rng.gen_range(0..len))
}

/// Pick the answer for `day_number` from `list`.
#[must_use]
pub fn pick_tank_of_day(list: &[Vehicle], day_number: u32) -> Option<&Vehicle> {
    day_index(day_number, list.len()).and_then(|idx| list.get(idx))
}
