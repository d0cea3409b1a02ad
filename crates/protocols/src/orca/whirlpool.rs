//! Whirlpool program account layouts.

use crate::anchor::AnchorAccount;
use borsh::{BorshDeserialize, BorshSerialize};
use moai_domain::DomainError;
use moai_domain::math::price_tick::sqrt_price_x64_to_price;
use moai_domain::math::tick_array::{TICK_ARRAY_SIZE, ticks_in_array};
use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

pub const NUM_REWARDS: usize = 3;

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct WhirlpoolRewardInfo {
    pub mint: Pubkey,
    pub vault: Pubkey,
    pub authority: Pubkey,
    pub emissions_per_second_x64: u128,
    pub growth_global_x64: u128,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Whirlpool {
    pub whirlpools_config: Pubkey,
    pub whirlpool_bump: [u8; 1],
    pub tick_spacing: u16,
    pub tick_spacing_seed: [u8; 2],
    /// Hundredths of a basis point.
    pub fee_rate: u16,
    pub protocol_fee_rate: u16,
    pub liquidity: u128,
    pub sqrt_price: u128,
    pub tick_current_index: i32,
    pub protocol_fee_owed_a: u64,
    pub protocol_fee_owed_b: u64,
    pub token_mint_a: Pubkey,
    pub token_vault_a: Pubkey,
    pub fee_growth_global_a: u128,
    pub token_mint_b: Pubkey,
    pub token_vault_b: Pubkey,
    pub fee_growth_global_b: u128,
    pub reward_last_updated_timestamp: u64,
    pub reward_infos: [WhirlpoolRewardInfo; NUM_REWARDS],
}

impl AnchorAccount for Whirlpool {
    const DISCRIMINATOR: [u8; 8] = [63, 149, 209, 12, 225, 128, 99, 9];
    const NAME: &'static str = "Whirlpool";
}

impl Whirlpool {
    /// Price of token A in token B.
    pub fn price(&self, decimals_a: u8, decimals_b: u8) -> Result<Decimal, DomainError> {
        sqrt_price_x64_to_price(self.sqrt_price, decimals_a, decimals_b)
    }
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionRewardInfo {
    pub growth_inside_checkpoint: u128,
    pub amount_owed: u64,
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Position {
    pub whirlpool: Pubkey,
    pub position_mint: Pubkey,
    pub liquidity: u128,
    pub tick_lower_index: i32,
    pub tick_upper_index: i32,
    pub fee_growth_checkpoint_a: u128,
    pub fee_owed_a: u64,
    pub fee_growth_checkpoint_b: u128,
    pub fee_owed_b: u64,
    pub reward_infos: [PositionRewardInfo; NUM_REWARDS],
}

impl AnchorAccount for Position {
    const DISCRIMINATOR: [u8; 8] = [170, 188, 143, 228, 122, 64, 247, 208];
    const NAME: &'static str = "Position";
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Tick {
    pub initialized: bool,
    pub liquidity_net: i128,
    pub liquidity_gross: u128,
    pub fee_growth_outside_a: u128,
    pub fee_growth_outside_b: u128,
    pub reward_growths_outside: [u128; NUM_REWARDS],
}

#[derive(BorshDeserialize, BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct TickArray {
    pub start_tick_index: i32,
    pub ticks: [Tick; TICK_ARRAY_SIZE as usize],
    pub whirlpool: Pubkey,
}

impl AnchorAccount for TickArray {
    const DISCRIMINATOR: [u8; 8] = [69, 97, 189, 190, 110, 7, 66, 187];
    const NAME: &'static str = "TickArray";
}

impl TickArray {
    /// Empty array starting at `start_tick_index`.
    pub fn new(whirlpool: Pubkey, start_tick_index: i32) -> Self {
        Self {
            start_tick_index,
            ticks: std::array::from_fn(|_| Tick::default()),
            whirlpool,
        }
    }

    /// First tick index past the array.
    pub fn end_tick_index(&self, tick_spacing: u16) -> i32 {
        self.start_tick_index + ticks_in_array(tick_spacing)
    }

    pub fn contains(&self, tick_index: i32, tick_spacing: u16) -> bool {
        (self.start_tick_index..self.end_tick_index(tick_spacing)).contains(&tick_index)
    }

    /// Tick at `tick_index`, which must be a multiple of the spacing inside
    /// the array.
    pub fn tick(&self, tick_index: i32, tick_spacing: u16) -> Option<&Tick> {
        let spacing = i32::from(tick_spacing);
        if !self.contains(tick_index, tick_spacing) || tick_index % spacing != 0 {
            return None;
        }
        let offset = (tick_index - self.start_tick_index) / spacing;
        self.ticks.get(offset as usize)
    }

    /// Nearest initialized tick a swap from `tick_current_index` would reach
    /// inside this array.
    pub fn next_initialized_tick_index(
        &self,
        tick_current_index: i32,
        tick_spacing: u16,
        a_to_b: bool,
    ) -> Option<i32> {
        let spacing = i32::from(tick_spacing);
        let index_of = |offset: usize| self.start_tick_index + offset as i32 * spacing;
        let initialized = self
            .ticks
            .iter()
            .enumerate()
            .filter(|(_, tick)| tick.initialized)
            .map(|(offset, _)| index_of(offset));

        if a_to_b {
            initialized.filter(|&index| index <= tick_current_index).max()
        } else {
            initialized.filter(|&index| index > tick_current_index).min()
        }
    }
}

/// Orders two mints the way the Whirlpool program requires (a < b by bytes).
pub fn mint_order(first: Pubkey, second: Pubkey) -> (Pubkey, Pubkey) {
    if first.to_bytes() < second.to_bytes() {
        (first, second)
    } else {
        (second, first)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::anchor::encode_account;

    pub(crate) fn sample_whirlpool(mint_a: Pubkey, mint_b: Pubkey) -> Whirlpool {
        Whirlpool {
            whirlpools_config: Pubkey::new_unique(),
            whirlpool_bump: [255],
            tick_spacing: 128,
            tick_spacing_seed: 128u16.to_le_bytes(),
            fee_rate: 10_000,
            protocol_fee_rate: 300,
            liquidity: 0,
            sqrt_price: 412_481_737_123_559_485,
            tick_current_index: -76_013,
            protocol_fee_owed_a: 0,
            protocol_fee_owed_b: 0,
            token_mint_a: mint_a,
            token_vault_a: Pubkey::new_unique(),
            fee_growth_global_a: 0,
            token_mint_b: mint_b,
            token_vault_b: Pubkey::new_unique(),
            fee_growth_global_b: 0,
            reward_last_updated_timestamp: 0,
            reward_infos: Default::default(),
        }
    }

    #[test]
    fn test_account_sizes() {
        let whirlpool = sample_whirlpool(Pubkey::new_unique(), Pubkey::new_unique());
        assert_eq!(encode_account(&whirlpool, 0).len(), 653);

        let position = Position {
            whirlpool: Pubkey::new_unique(),
            position_mint: Pubkey::new_unique(),
            liquidity: 0,
            tick_lower_index: -123_904,
            tick_upper_index: -33_792,
            fee_growth_checkpoint_a: 0,
            fee_owed_a: 0,
            fee_growth_checkpoint_b: 0,
            fee_owed_b: 0,
            reward_infos: Default::default(),
        };
        assert_eq!(encode_account(&position, 0).len(), 216);

        let tick_array = TickArray::new(Pubkey::new_unique(), -78_848);
        assert_eq!(encode_account(&tick_array, 0).len(), 9988);
    }

    #[test]
    fn test_decode_whirlpool() {
        let whirlpool = sample_whirlpool(Pubkey::new_unique(), Pubkey::new_unique());
        let data = encode_account(&whirlpool, 0);
        let decoded = Whirlpool::try_from_account_data(&data).unwrap();
        assert_eq!(decoded, whirlpool);

        let price = decoded.price(9, 9).unwrap();
        assert!((price - Decimal::new(5, 4)).abs() < Decimal::new(1, 9));
    }

    #[test]
    fn test_tick_lookup() {
        let mut array = TickArray::new(Pubkey::new_unique(), -78_848);
        assert_eq!(array.end_tick_index(128), -67_584);
        assert!(array.contains(-76_013, 128));
        assert!(!array.contains(-67_584, 128));
        assert!(array.tick(-78_848, 128).is_some());
        assert!(array.tick(-78_847, 128).is_none());
        assert!(array.tick(-67_584, 128).is_none());

        array.ticks[87].initialized = true;
        assert_eq!(array.tick(-67_712, 128).map(|t| t.initialized), Some(true));
    }

    #[test]
    fn test_next_initialized_tick_index() {
        let mut array = TickArray::new(Pubkey::new_unique(), 0);
        array.ticks[2].initialized = true; // 256
        array.ticks[10].initialized = true; // 1280

        assert_eq!(array.next_initialized_tick_index(300, 128, false), Some(1280));
        assert_eq!(array.next_initialized_tick_index(300, 128, true), Some(256));
        assert_eq!(array.next_initialized_tick_index(1280, 128, false), None);
        assert_eq!(array.next_initialized_tick_index(100, 128, true), None);
    }

    #[test]
    fn test_mint_order() {
        let low = Pubkey::new_from_array([1; 32]);
        let high = Pubkey::new_from_array([2; 32]);
        assert_eq!(mint_order(high, low), (low, high));
        assert_eq!(mint_order(low, high), (low, high));
    }
}
