use super::Q64;
use crate::error::DomainError;
use primitive_types::U256;
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// Lowest tick index a pool accepts.
pub const MIN_TICK_INDEX: i32 = -443_636;
/// Highest tick index a pool accepts.
pub const MAX_TICK_INDEX: i32 = 443_636;
/// Sqrt price at [`MIN_TICK_INDEX`].
pub const MIN_SQRT_PRICE_X64: u128 = 4_295_048_016;
/// Sqrt price at [`MAX_TICK_INDEX`].
pub const MAX_SQRT_PRICE_X64: u128 = 79_226_673_515_401_279_992_447_579_055;

/// Converts a human price of token A in units of token B into a Q64.64 sqrt
/// price, adjusting for the mints' decimals.
///
/// The square root is taken on the integer radicand so the result is the
/// floor of the exact value.
pub fn price_to_sqrt_price_x64(
    price: Decimal,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<u128, DomainError> {
    if price <= Decimal::ZERO {
        return Err(DomainError::NonPositivePrice);
    }

    let exponent = i32::from(decimals_b) - i32::from(decimals_a);
    let factor = 10u64
        .checked_pow(exponent.unsigned_abs())
        .map(Decimal::from)
        .ok_or(DomainError::Overflow("price_to_sqrt_price_x64"))?;
    let adjusted = if exponent >= 0 {
        price.checked_mul(factor)
    } else {
        price.checked_div(factor)
    }
    .ok_or(DomainError::Overflow("price_to_sqrt_price_x64"))?;

    let mantissa = U256::from(adjusted.mantissa().unsigned_abs());
    let scale = U256::from(10u64).pow(U256::from(adjusted.scale()));
    let radicand = (mantissa << 128) / scale;
    let root = radicand.integer_sqrt();

    if root > U256::from(u128::MAX) {
        return Err(DomainError::Overflow("price_to_sqrt_price_x64"));
    }
    let sqrt_price = root.as_u128();
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price) {
        return Err(DomainError::SqrtPriceOutOfBounds(sqrt_price));
    }
    Ok(sqrt_price)
}

/// Converts a Q64.64 sqrt price back into a human price of token A in
/// units of token B.
pub fn sqrt_price_x64_to_price(
    sqrt_price: u128,
    decimals_a: u8,
    decimals_b: u8,
) -> Result<Decimal, DomainError> {
    let sqrt = sqrt_price as f64 / Q64 as f64;
    let exponent = i32::from(decimals_a) - i32::from(decimals_b);
    let price = sqrt * sqrt * 10f64.powi(exponent);
    Decimal::from_f64(price).ok_or(DomainError::Overflow("sqrt_price_x64_to_price"))
}

/// `sqrt(1.0001)^(2^i) * 2^96` for bits 1..=18 of a positive tick.
const POSITIVE_TICK_FACTORS_X96: [u128; 18] = [
    79_236_085_330_515_764_027_303_304_731,
    79_244_008_939_048_815_603_706_035_061,
    79_259_858_533_276_714_757_314_932_305,
    79_291_567_232_598_584_799_939_703_904,
    79_355_022_692_464_371_645_785_046_466,
    79_482_085_999_252_804_386_437_311_141,
    79_736_823_300_114_093_921_829_183_326,
    80_248_749_790_819_932_309_965_073_892,
    81_282_483_887_344_747_381_513_967_011,
    83_390_072_131_320_151_908_154_831_281,
    87_770_609_709_833_776_024_991_924_138,
    97_234_110_755_111_693_312_479_820_773,
    119_332_217_159_966_728_226_237_229_890,
    179_736_315_981_702_064_433_883_588_727,
    407_748_233_172_238_350_107_850_275_304,
    2_098_478_828_474_011_932_436_660_412_517,
    55_581_415_166_113_811_149_459_800_483_533,
    38_992_368_544_603_139_932_233_054_999_993_551,
];

/// `2^64 / sqrt(1.0001)^(2^i)` for bits 1..=18 of a negative tick.
const NEGATIVE_TICK_FACTORS_X64: [u128; 18] = [
    18_444_899_583_751_176_498,
    18_443_055_278_223_354_162,
    18_439_367_220_385_604_838,
    18_431_993_317_065_449_817,
    18_417_254_355_718_160_513,
    18_387_811_781_193_591_352,
    18_329_067_761_203_520_168,
    18_212_142_134_806_087_854,
    17_980_523_815_641_551_639,
    17_526_086_738_831_147_013,
    16_651_378_430_235_024_244,
    15_030_750_278_693_429_944,
    12_247_334_978_882_834_399,
    8_131_365_268_884_726_200,
    3_584_323_654_723_342_297,
    696_457_651_847_595_233,
    26_294_789_957_452_057,
    37_481_735_321_082,
];

/// Returns the Q64.64 sqrt price of a tick, `sqrt(1.0001)^tick * 2^64`,
/// computed bit by bit the way the Whirlpool program does.
pub fn tick_index_to_sqrt_price_x64(tick: i32) -> Result<u128, DomainError> {
    if !(MIN_TICK_INDEX..=MAX_TICK_INDEX).contains(&tick) {
        return Err(DomainError::TickOutOfBounds(tick));
    }
    let abs_tick = tick.unsigned_abs();

    let ratio = if tick >= 0 {
        // Q96 until the final shift
        let mut ratio = if abs_tick & 1 != 0 {
            U256::from(79_232_123_823_359_799_118_286_999_567u128)
        } else {
            U256::one() << 96
        };
        for (bit, factor) in POSITIVE_TICK_FACTORS_X96.iter().enumerate() {
            if abs_tick & (2 << bit) != 0 {
                ratio = (ratio * U256::from(*factor)) >> 96;
            }
        }
        ratio >> 32
    } else {
        let mut ratio = if abs_tick & 1 != 0 {
            U256::from(18_445_821_805_675_392_311u128)
        } else {
            U256::from(Q64)
        };
        for (bit, factor) in NEGATIVE_TICK_FACTORS_X64.iter().enumerate() {
            if abs_tick & (2 << bit) != 0 {
                ratio = (ratio * U256::from(*factor)) >> 64;
            }
        }
        ratio
    };
    Ok(ratio.as_u128())
}

/// Returns the greatest tick whose sqrt price does not exceed `sqrt_price`.
pub fn sqrt_price_x64_to_tick_index(sqrt_price: u128) -> Result<i32, DomainError> {
    if !(MIN_SQRT_PRICE_X64..=MAX_SQRT_PRICE_X64).contains(&sqrt_price) {
        return Err(DomainError::SqrtPriceOutOfBounds(sqrt_price));
    }

    let (mut low, mut high) = (MIN_TICK_INDEX, MAX_TICK_INDEX);
    while low < high {
        let mid = low + (high - low + 1) / 2;
        if tick_index_to_sqrt_price_x64(mid)? <= sqrt_price {
            low = mid;
        } else {
            high = mid - 1;
        }
    }
    Ok(low)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_to_sqrt_price_x64() {
        assert_eq!(price_to_sqrt_price_x64(dec!(1), 9, 9).unwrap(), Q64);
        assert_eq!(price_to_sqrt_price_x64(dec!(4), 6, 6).unwrap(), 2 * Q64);
        assert_eq!(
            price_to_sqrt_price_x64(dec!(0.0005), 9, 9).unwrap(),
            412_481_737_123_559_485
        );
        // 0.04 scaled by 10^(7 - 9) is 0.0004, whose root is 0.02
        assert_eq!(price_to_sqrt_price_x64(dec!(0.04), 9, 7).unwrap(), Q64 / 50);
        assert!(price_to_sqrt_price_x64(dec!(-1), 9, 9).is_err());
    }

    #[test]
    fn test_sqrt_price_round_trip() {
        let sqrt = price_to_sqrt_price_x64(dec!(0.0005), 9, 9).unwrap();
        let price = sqrt_price_x64_to_price(sqrt, 9, 9).unwrap();
        assert!((price - dec!(0.0005)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_tick_index_conversions() {
        assert_eq!(tick_index_to_sqrt_price_x64(0).unwrap(), Q64);
        assert_eq!(sqrt_price_x64_to_tick_index(Q64).unwrap(), 0);

        let sqrt = price_to_sqrt_price_x64(dec!(0.0005), 9, 9).unwrap();
        let tick = sqrt_price_x64_to_tick_index(sqrt).unwrap();
        assert_eq!(tick, -76013);
        assert!(tick_index_to_sqrt_price_x64(tick).unwrap() <= sqrt);
        assert!(tick_index_to_sqrt_price_x64(tick + 1).unwrap() > sqrt);
    }

    #[test]
    fn test_tick_sqrt_prices_are_exact() {
        assert_eq!(tick_index_to_sqrt_price_x64(MAX_TICK_INDEX).unwrap(), MAX_SQRT_PRICE_X64);
        assert_eq!(tick_index_to_sqrt_price_x64(MIN_TICK_INDEX).unwrap(), MIN_SQRT_PRICE_X64);
        assert_eq!(tick_index_to_sqrt_price_x64(1).unwrap(), 18_447_666_387_855_959_850);
        assert_eq!(tick_index_to_sqrt_price_x64(-1).unwrap(), 18_445_821_805_675_392_311);
        assert_eq!(tick_index_to_sqrt_price_x64(-76_013).unwrap(), 412_478_127_760_461_252);
    }

    #[test]
    fn test_tick_index_at_boundaries() {
        assert_eq!(sqrt_price_x64_to_tick_index(MAX_SQRT_PRICE_X64).unwrap(), MAX_TICK_INDEX);
        assert_eq!(sqrt_price_x64_to_tick_index(MIN_SQRT_PRICE_X64).unwrap(), MIN_TICK_INDEX);
        assert_eq!(sqrt_price_x64_to_tick_index(18_447_666_387_855_959_850).unwrap(), 1);
        assert_eq!(sqrt_price_x64_to_tick_index(18_447_666_387_855_959_849).unwrap(), 0);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(
            tick_index_to_sqrt_price_x64(MAX_TICK_INDEX + 1),
            Err(DomainError::TickOutOfBounds(MAX_TICK_INDEX + 1))
        );
        assert_eq!(
            sqrt_price_x64_to_tick_index(MIN_SQRT_PRICE_X64 - 1),
            Err(DomainError::SqrtPriceOutOfBounds(MIN_SQRT_PRICE_X64 - 1))
        );
    }
}
