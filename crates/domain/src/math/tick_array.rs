use super::price_tick::{MAX_SQRT_PRICE_X64, MAX_TICK_INDEX, MIN_SQRT_PRICE_X64, MIN_TICK_INDEX};
use crate::error::DomainError;

/// Number of ticks stored in one tick array account.
pub const TICK_ARRAY_SIZE: i32 = 88;

/// Number of tick arrays a single swap instruction can traverse.
pub const MAX_SWAP_TICK_ARRAYS: usize = 3;

/// Number of ticks covered by one tick array.
pub fn ticks_in_array(tick_spacing: u16) -> i32 {
    TICK_ARRAY_SIZE * i32::from(tick_spacing)
}

/// Returns the start tick index of the array holding `tick_index`, moved by
/// `offset` arrays.
pub fn start_tick_index(tick_index: i32, tick_spacing: u16, offset: i32) -> Result<i32, DomainError> {
    if tick_spacing == 0 {
        return Err(DomainError::InvalidTickSpacing);
    }
    let span = ticks_in_array(tick_spacing);
    let real_index = tick_index.div_euclid(span);
    let start = (real_index + offset)
        .checked_mul(span)
        .ok_or(DomainError::Overflow("start_tick_index"))?;

    let min_start = MIN_TICK_INDEX - (MIN_TICK_INDEX % span + span);
    if start < min_start || start > MAX_TICK_INDEX {
        return Err(DomainError::StartTickOutOfBounds(start));
    }
    Ok(start)
}

/// Start tick indexes of the arrays at offsets `-radius..=radius` around the
/// array holding `tick_index`.
pub fn start_tick_indexes_around(
    tick_index: i32,
    tick_spacing: u16,
    radius: i32,
) -> Result<Vec<i32>, DomainError> {
    (-radius..=radius)
        .map(|offset| start_tick_index(tick_index, tick_spacing, offset))
        .collect()
}

/// Start tick indexes of the arrays a swap walks through, in traversal
/// order. Arrays past the price bounds are left out.
pub fn swap_start_tick_indexes(tick_current_index: i32, tick_spacing: u16, a_to_b: bool) -> Vec<i32> {
    let shift = if a_to_b { 0 } else { i32::from(tick_spacing) };
    let step = if a_to_b { -1 } else { 1 };

    let mut starts = Vec::with_capacity(MAX_SWAP_TICK_ARRAYS);
    let mut offset = 0;
    for _ in 0..MAX_SWAP_TICK_ARRAYS {
        match start_tick_index(tick_current_index + shift, tick_spacing, offset) {
            Ok(start) => starts.push(start),
            Err(_) => break,
        }
        offset += step;
    }
    starts
}

/// The loosest sqrt price limit for a swap direction.
pub fn default_sqrt_price_limit(a_to_b: bool) -> u128 {
    if a_to_b {
        MIN_SQRT_PRICE_X64
    } else {
        MAX_SQRT_PRICE_X64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_tick_index() {
        assert_eq!(start_tick_index(0, 128, 0).unwrap(), 0);
        assert_eq!(start_tick_index(11_263, 128, 0).unwrap(), 0);
        assert_eq!(start_tick_index(11_264, 128, 0).unwrap(), 11_264);
        assert_eq!(start_tick_index(-1, 128, 0).unwrap(), -11_264);
        assert_eq!(start_tick_index(-76_013, 128, 0).unwrap(), -78_848);
        assert_eq!(start_tick_index(-76_013, 128, -4).unwrap(), -123_904);
        assert_eq!(start_tick_index(-76_013, 128, 4).unwrap(), -33_792);
        assert_eq!(start_tick_index(5, 0, 0), Err(DomainError::InvalidTickSpacing));
    }

    #[test]
    fn test_start_tick_index_bounds() {
        // spacing 64 spans 5632 ticks, the last valid array starts at 439_296
        assert_eq!(start_tick_index(MAX_TICK_INDEX, 64, 0).unwrap(), 439_296);
        assert!(start_tick_index(MAX_TICK_INDEX, 64, 1).is_err());
        assert_eq!(start_tick_index(MIN_TICK_INDEX, 64, 0).unwrap(), -444_928);
        assert!(start_tick_index(MIN_TICK_INDEX, 64, -1).is_err());
    }

    #[test]
    fn test_start_tick_indexes_around() {
        let starts = start_tick_indexes_around(-76_013, 128, 4).unwrap();
        assert_eq!(starts.len(), 9);
        assert_eq!(starts[0], -123_904);
        assert_eq!(starts[4], -78_848);
        assert_eq!(starts[8], -33_792);
        assert!(starts.windows(2).all(|w| w[1] - w[0] == 11_264));
    }

    #[test]
    fn test_swap_start_tick_indexes() {
        assert_eq!(
            swap_start_tick_indexes(-76_013, 128, true),
            vec![-78_848, -90_112, -101_376]
        );
        assert_eq!(
            swap_start_tick_indexes(-76_013, 128, false),
            vec![-78_848, -67_584, -56_320]
        );
        // one spacing below the upper edge, b to a already looks at the next array
        assert_eq!(swap_start_tick_indexes(-67_585, 128, false)[0], -67_584);
    }

    #[test]
    fn test_swap_start_tick_indexes_near_bound() {
        let starts = swap_start_tick_indexes(MAX_TICK_INDEX - 10, 64, false);
        assert_eq!(starts, vec![439_296]);
    }

    #[test]
    fn test_default_sqrt_price_limit() {
        assert_eq!(default_sqrt_price_limit(true), MIN_SQRT_PRICE_X64);
        assert_eq!(default_sqrt_price_limit(false), MAX_SQRT_PRICE_X64);
    }
}
