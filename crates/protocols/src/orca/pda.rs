use moai_domain::DomainError;
use moai_domain::math::tick_array::{start_tick_index, swap_start_tick_indexes, MAX_SWAP_TICK_ARRAYS};
use solana_sdk::pubkey::Pubkey;

pub fn whirlpool_address(
    program_id: &Pubkey,
    whirlpools_config: &Pubkey,
    token_mint_a: &Pubkey,
    token_mint_b: &Pubkey,
    tick_spacing: u16,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"whirlpool",
            whirlpools_config.as_ref(),
            token_mint_a.as_ref(),
            token_mint_b.as_ref(),
            &tick_spacing.to_le_bytes(),
        ],
        program_id,
    )
}

pub fn fee_tier_address(program_id: &Pubkey, whirlpools_config: &Pubkey, tick_spacing: u16) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[b"fee_tier", whirlpools_config.as_ref(), &tick_spacing.to_le_bytes()],
        program_id,
    )
}

pub fn position_address(program_id: &Pubkey, position_mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"position", position_mint.as_ref()], program_id)
}

/// The start index seed is the decimal string of the index.
pub fn tick_array_address(program_id: &Pubkey, whirlpool: &Pubkey, start_tick_index: i32) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            b"tick_array",
            whirlpool.as_ref(),
            start_tick_index.to_string().as_bytes(),
        ],
        program_id,
    )
}

/// Tick array `offset` arrays away from the one holding `tick_index`.
/// Returns the address and the start index.
pub fn tick_array_from_tick_index(
    program_id: &Pubkey,
    whirlpool: &Pubkey,
    tick_index: i32,
    tick_spacing: u16,
    offset: i32,
) -> Result<(Pubkey, i32), DomainError> {
    let start = start_tick_index(tick_index, tick_spacing, offset)?;
    Ok((tick_array_address(program_id, whirlpool, start).0, start))
}

/// The three tick arrays passed to a swap. When fewer than three arrays fit
/// before the price bound the last one is repeated.
pub fn swap_tick_arrays(
    program_id: &Pubkey,
    whirlpool: &Pubkey,
    tick_current_index: i32,
    tick_spacing: u16,
    a_to_b: bool,
) -> Result<[Pubkey; MAX_SWAP_TICK_ARRAYS], DomainError> {
    let starts = swap_start_tick_indexes(tick_current_index, tick_spacing, a_to_b);
    let last = *starts
        .last()
        .ok_or(DomainError::TickOutOfBounds(tick_current_index))?;
    Ok(std::array::from_fn(|i| {
        let start = starts.get(i).copied().unwrap_or(last);
        tick_array_address(program_id, whirlpool, start).0
    }))
}

pub fn oracle_address(program_id: &Pubkey, whirlpool: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[b"oracle", whirlpool.as_ref()], program_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::programs::{WHIRLPOOL_PROGRAM_ID, WHIRLPOOLS_CONFIG};
    use moai_domain::math::price_tick::MAX_TICK_INDEX;

    #[test]
    fn test_whirlpool_address_depends_on_all_seeds() {
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        let (pool, _) = whirlpool_address(&WHIRLPOOL_PROGRAM_ID, &WHIRLPOOLS_CONFIG, &a, &b, 128);
        assert_ne!(pool, whirlpool_address(&WHIRLPOOL_PROGRAM_ID, &WHIRLPOOLS_CONFIG, &b, &a, 128).0);
        assert_ne!(pool, whirlpool_address(&WHIRLPOOL_PROGRAM_ID, &WHIRLPOOLS_CONFIG, &a, &b, 64).0);
    }

    #[test]
    fn test_tick_array_from_tick_index() {
        let pool = Pubkey::new_unique();
        let (address, start) = tick_array_from_tick_index(&WHIRLPOOL_PROGRAM_ID, &pool, -76_013, 128, -4).unwrap();
        assert_eq!(start, -123_904);
        assert_eq!(address, tick_array_address(&WHIRLPOOL_PROGRAM_ID, &pool, -123_904).0);
        assert!(tick_array_from_tick_index(&WHIRLPOOL_PROGRAM_ID, &pool, -76_013, 0, 0).is_err());
    }

    #[test]
    fn test_swap_tick_arrays() {
        let pool = Pubkey::new_unique();
        let arrays = swap_tick_arrays(&WHIRLPOOL_PROGRAM_ID, &pool, -76_013, 128, false).unwrap();
        let expected = [-78_848, -67_584, -56_320].map(|s| tick_array_address(&WHIRLPOOL_PROGRAM_ID, &pool, s).0);
        assert_eq!(arrays, expected);
    }

    #[test]
    fn test_swap_tick_arrays_repeat_last_near_bound() {
        let pool = Pubkey::new_unique();
        let arrays = swap_tick_arrays(&WHIRLPOOL_PROGRAM_ID, &pool, MAX_TICK_INDEX - 10, 64, false).unwrap();
        let last = tick_array_address(&WHIRLPOOL_PROGRAM_ID, &pool, 439_296).0;
        assert_eq!(arrays, [last, last, last]);
    }
}
