use thlotto_combora::{HistoricalSet, LottoNumber, NUMBER_SPACE};

/// Coprime with `NUMBER_SPACE`, so `i * STRIDE mod NUMBER_SPACE` visits every
/// number once and spreads consecutive members across the whole range.
const STRIDE: u64 = 7_919;

/// Deterministic set holding `drawn` distinct numbers.
pub fn synthetic_set(drawn: usize) -> HistoricalSet {
    let space = u64::from(NUMBER_SPACE);
    (0..drawn.min(NUMBER_SPACE as usize) as u64)
        .filter_map(|i| u32::try_from(i * STRIDE % space).ok())
        .filter_map(|v| LottoNumber::new(v).ok())
        .collect()
}

/// Set with the given fraction of the number space drawn.
pub fn set_with_saturation(fraction: f64) -> HistoricalSet {
    let drawn = (f64::from(NUMBER_SPACE) * fraction.clamp(0.0, 1.0)).round() as usize;
    synthetic_set(drawn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_sets_have_requested_size() {
        assert_eq!(synthetic_set(0).len(), 0);
        assert_eq!(synthetic_set(12_345).len(), 12_345);
        assert!(synthetic_set(usize::MAX).is_saturated());
    }

    #[test]
    fn saturation_fraction_is_clamped() {
        assert_eq!(set_with_saturation(0.5).len(), 500_000);
        assert!(set_with_saturation(2.0).is_saturated());
        assert!(set_with_saturation(-1.0).is_empty());
    }
}
