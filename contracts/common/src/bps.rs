//! # Basis-Point Arithmetic
//!
//! Integer helpers for splitting token amounts by a rate expressed in basis
//! points (1 bps = 0.01%). All rounding is toward zero on the share, so the
//! remainder side of a split always absorbs the fractional unit.
//!
//! ## Model
//!
//! - `share = floor(amount * bps / 10_000)` for non-negative inputs.
//! - `remainder = amount - share`, so `share + remainder == amount` exactly.
//! - Out-of-range inputs return `None`; callers decide which error to
//!   surface. No non-negative amount overflows.

/// Denominator for basis-point rates.
pub const BPS_DENOMINATOR: i128 = 10_000;

/// Highest meaningful rate (100%).
pub const MAX_BPS: u32 = 10_000;

/// Share of `amount` at `bps`, rounded down.
///
/// Returns `None` if `amount` is negative or `bps` exceeds [`MAX_BPS`].
/// Any non-negative `i128` amount is accepted: the whole and fractional
/// parts of `amount / 10_000` are scaled separately, so no intermediate
/// exceeds `amount`.
pub fn share_floor(amount: i128, bps: u32) -> Option<i128> {
    if amount < 0 || bps > MAX_BPS {
        return None;
    }
    let bps = bps as i128;
    let whole = (amount / BPS_DENOMINATOR) * bps;
    let fraction = (amount % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR;
    Some(whole + fraction)
}

/// Split `amount` into `(share, remainder)` where `share` is
/// [`share_floor`] and `remainder` takes everything else.
pub fn split_floor(amount: i128, bps: u32) -> Option<(i128, i128)> {
    let share = share_floor(amount, bps)?;
    Some((share, amount - share))
}
