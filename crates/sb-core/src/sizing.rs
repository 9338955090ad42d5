//! Order quantity sizing.
//!
//! Every order risks the same margin: `quantity = margin × leverage / price`,
//! floored onto the symbol's `LOT_SIZE` grid and clamped into
//! `[min_qty, max_qty]`. The result carries the grid's decimal precision so it
//! can be sent to the exchange verbatim (`step 0.001` → `"1.000"`).

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{SbError, SbResult};
use crate::types::LotSizeRule;

/// Precision the raw quantity is rounded to before gridding.
const RAW_QTY_DP: u32 = 8;

/// Margin and leverage applied to every signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizingConfig {
    /// Margin committed per trade, in quote currency.
    pub margin_size: Decimal,
    /// Leverage multiplier.
    pub leverage: Decimal,
}

impl SizingConfig {
    /// Parse margin and leverage from their configured string form.
    ///
    /// Both must be positive decimals.
    pub fn parse(margin_size: &str, leverage: &str) -> SbResult<Self> {
        Ok(Self {
            margin_size: parse_positive("TOTAL_MARGIN_SIZE", margin_size)?,
            leverage: parse_positive("TARGET_LEVERAGE", leverage)?,
        })
    }

    /// Position value in quote currency.
    pub fn target_notional(&self) -> SbResult<Decimal> {
        self.margin_size.checked_mul(self.leverage).ok_or_else(|| {
            SbError::Sizing(format!(
                "margin {} × leverage {} overflowed",
                self.margin_size, self.leverage
            ))
        })
    }

    /// Quantity for `price`, before any lot-size adjustment.
    pub fn raw_quantity(&self, price: Decimal) -> SbResult<Decimal> {
        if price <= Decimal::ZERO {
            return Err(SbError::Sizing(format!("market price must be positive, got {price}")));
        }
        let raw = self
            .target_notional()?
            .checked_div(price)
            .ok_or_else(|| SbError::Sizing(format!("notional / {price} overflowed")))?;
        Ok(raw.round_dp_with_strategy(RAW_QTY_DP, RoundingStrategy::MidpointAwayFromZero))
    }

    /// Sized order quantity for `price` under `rule`.
    pub fn order_quantity(&self, price: Decimal, rule: &LotSizeRule) -> SbResult<Decimal> {
        apply_lot_size(self.raw_quantity(price)?, rule)
    }
}

/// Floor `raw` onto the step grid, clamp it into the allowed range, and
/// rescale it to the grid's precision.
pub fn apply_lot_size(raw: Decimal, rule: &LotSizeRule) -> SbResult<Decimal> {
    if rule.step_size <= Decimal::ZERO {
        return Err(SbError::Sizing(format!("invalid step size {}", rule.step_size)));
    }

    let overflow = || SbError::Sizing(format!("{raw} on step {} overflowed", rule.step_size));
    let steps = raw.checked_div(rule.step_size).ok_or_else(overflow)?.floor();
    let mut qty = steps
        .checked_mul(rule.step_size)
        .ok_or_else(overflow)?
        .max(rule.min_qty);
    if let Some(max_qty) = rule.max_qty.filter(|m| *m > Decimal::ZERO) {
        qty = qty.min(max_qty);
    }

    qty.rescale(grid_scale(rule));
    Ok(qty)
}

/// Number of decimal places the exchange accepts for this rule.
fn grid_scale(rule: &LotSizeRule) -> u32 {
    rule.step_size.normalize().scale().max(rule.min_qty.normalize().scale())
}

fn parse_positive(key: &str, raw: &str) -> SbResult<Decimal> {
    let value: Decimal = raw
        .trim()
        .parse()
        .map_err(|e| SbError::Config(format!("{key}={raw:?} is not a valid number: {e}")))?;
    if value <= Decimal::ZERO {
        return Err(SbError::Config(format!("{key} must be positive, got {value}")));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn rule(min_qty: Decimal, step_size: Decimal) -> LotSizeRule {
        LotSizeRule {
            min_qty,
            step_size,
            max_qty: None,
        }
    }

    #[test]
    fn grid_aligned_quantity_is_kept() {
        let sizing = SizingConfig::parse("100", "5").unwrap();
        assert_eq!(sizing.target_notional().unwrap(), dec!(500));
        assert_eq!(sizing.raw_quantity(dec!(500)).unwrap(), dec!(1));

        let qty = sizing
            .order_quantity(dec!(500), &rule(dec!(0.001), dec!(0.001)))
            .unwrap();
        assert_eq!(qty, dec!(1));
        assert_eq!(qty.to_string(), "1.000");
    }

    #[test]
    fn quantity_floors_to_grid() {
        let qty = apply_lot_size(dec!(1.0007), &rule(dec!(0.001), dec!(0.001))).unwrap();
        assert_eq!(qty.to_string(), "1.000");
    }

    #[test]
    fn quantity_below_min_is_clamped_up() {
        let qty = apply_lot_size(dec!(0.0004), &rule(dec!(0.001), dec!(0.001))).unwrap();
        assert_eq!(qty, dec!(0.001));
    }

    #[test]
    fn quantity_above_max_is_clamped_down() {
        let r = LotSizeRule {
            min_qty: dec!(1),
            step_size: dec!(1),
            max_qty: Some(dec!(1000)),
        };
        assert_eq!(apply_lot_size(dec!(5000.9), &r).unwrap(), dec!(1000));
    }

    #[test]
    fn output_precision_follows_step() {
        // 500 / 0.2745 = 1821.4936..; floored on a 0.1 grid.
        let sizing = SizingConfig::parse("50", "10").unwrap();
        let qty = sizing
            .order_quantity(dec!(0.2745), &rule(dec!(0.1), dec!(0.1)))
            .unwrap();
        assert_eq!(qty.to_string(), "1821.4");

        let qty = apply_lot_size(dec!(12.9), &rule(dec!(1.000), dec!(1.000))).unwrap();
        assert_eq!(qty.to_string(), "12");
    }

    #[test]
    fn zero_price_is_an_error() {
        let sizing = SizingConfig::parse("100", "5").unwrap();
        assert!(matches!(sizing.raw_quantity(Decimal::ZERO), Err(SbError::Sizing(_))));
    }

    #[test]
    fn oversized_notional_is_an_error() {
        let sizing = SizingConfig::parse("79228162514264337593543950335", "2").unwrap();
        assert!(matches!(sizing.target_notional(), Err(SbError::Sizing(_))));
        let err = sizing
            .order_quantity(dec!(500), &rule(dec!(0.001), dec!(0.001)))
            .unwrap_err();
        assert!(matches!(err, SbError::Sizing(_)));
    }

    #[test]
    fn tiny_price_on_fine_grid_is_an_error() {
        let sizing = SizingConfig::parse("100", "5").unwrap();
        let fine = rule(dec!(0.00000001), dec!(0.00000001));
        let result = sizing.order_quantity(dec!(0.0000000000000000000001), &fine);
        assert!(matches!(result, Err(SbError::Sizing(_))));

        let huge = apply_lot_size(dec!(5000000000000000000000000), &fine);
        assert!(matches!(huge, Err(SbError::Sizing(_))));
    }

    #[test]
    fn zero_step_is_an_error() {
        assert!(apply_lot_size(dec!(1), &rule(dec!(0.001), Decimal::ZERO)).is_err());
    }

    #[test]
    fn config_values_must_be_positive_numbers() {
        assert!(SizingConfig::parse("abc", "5").is_err());
        assert!(SizingConfig::parse("100", "").is_err());
        assert!(SizingConfig::parse("-1", "5").is_err());
        assert_eq!(SizingConfig::parse(" 25.5 ", "3").unwrap().margin_size, dec!(25.5));
    }
}
