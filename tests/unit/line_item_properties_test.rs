/// Property-based tests for line item money arithmetic
///
/// total = total_after_discount + tax_amount, every amount carries exactly two
/// decimals, and discounts are accepted up to the subtotal and no further.
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use procuretrack::core::money;
use procuretrack::purchase_orders::OrderLineItem;
use procuretrack::AppError;

/// Price in cents so generated values are exact
fn cents(value: u32) -> Decimal {
    Decimal::new(value as i64, 2)
}

/// Tax rate in basis points (0..=10000 → 0..=100%)
fn rate(bps: u32) -> Decimal {
    Decimal::new(bps as i64, 4)
}

proptest! {
    #[test]
    fn test_total_is_discounted_amount_plus_tax(
        quantity in 1i32..1000,
        price_cents in 0u32..10_000_000,
        discount_pct in 0u32..=100,
        tax_bps in 0u32..=10_000,
    ) {
        let mut item = OrderLineItem::new(1, 1, quantity, cents(price_cents)).unwrap();
        item.apply_discount_percent(Decimal::from(discount_pct)).unwrap();
        item.apply_tax_rate(rate(tax_bps)).unwrap();

        prop_assert_eq!(item.total(), item.total_after_discount() + item.tax_amount());

        let amounts = [
            item.subtotal(),
            item.total_after_discount(),
            item.tax_amount(),
            item.total(),
        ];
        for amount in amounts {
            prop_assert_eq!(amount.scale(), 2);
            prop_assert!(amount >= Decimal::ZERO);
        }
    }

    #[test]
    fn test_subtotal_is_quantity_times_price(
        quantity in 1i32..1000,
        price_cents in 0u32..10_000_000,
    ) {
        let item = OrderLineItem::new(1, 1, quantity, cents(price_cents)).unwrap();
        prop_assert_eq!(item.subtotal(), Decimal::from(quantity) * cents(price_cents));
    }

    #[test]
    fn test_discount_up_to_subtotal_is_accepted(
        quantity in 1i32..100,
        price_cents in 1u32..1_000_000,
        share in 0u32..=100,
    ) {
        let mut item = OrderLineItem::new(1, 1, quantity, cents(price_cents)).unwrap();
        let discount = money::quantize(item.subtotal() * Decimal::from(share) / dec!(100));

        prop_assert!(item.apply_discount_amount(discount).is_ok());
        prop_assert_eq!(item.discount, discount);
    }

    #[test]
    fn test_discount_above_subtotal_is_rejected(
        quantity in 1i32..100,
        price_cents in 0u32..1_000_000,
        excess_cents in 1u32..1_000_000,
    ) {
        let mut item = OrderLineItem::new(1, 1, quantity, cents(price_cents)).unwrap();
        let before = item.clone();

        let err = item
            .apply_discount_amount(item.subtotal() + cents(excess_cents))
            .unwrap_err();

        prop_assert!(matches!(err, AppError::Validation(_)));
        prop_assert_eq!(item, before);
    }

    #[test]
    fn test_quantize_is_idempotent(raw in -1_000_000_000i64..1_000_000_000, scale in 0u32..8) {
        let value = Decimal::new(raw, scale);
        let once = money::quantize(value);
        prop_assert_eq!(money::quantize(once), once);
        prop_assert_eq!(once.scale(), 2);
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_non_positive_quantity_is_rejected() {
        for quantity in [0, -1] {
            let err = OrderLineItem::new(1, 1, quantity, dec!(5)).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn test_non_numeric_price_is_rejected() {
        let err = OrderLineItem::new(1, 1, 1, "five").unwrap_err();
        assert!(err.to_string().contains("invalid amount"));
    }

    #[test]
    fn test_discount_percent_out_of_range() {
        let mut item = OrderLineItem::new(1, 1, 2, dec!(10)).unwrap();
        assert!(item.apply_discount_percent(dec!(100.5)).is_err());
        assert!(item.apply_discount_percent(dec!(-1)).is_err());
        assert_eq!(item.discount, dec!(0.00));
    }

    #[test]
    fn test_worked_example() {
        let item =
            OrderLineItem::with_adjustments(1, 1, 3, dec!(19.99), dec!(5), dec!(0.11))
                .unwrap();

        assert_eq!(item.subtotal(), dec!(59.97));
        assert_eq!(item.total_after_discount(), dec!(54.97));
        assert_eq!(item.tax_amount(), dec!(6.05));
        assert_eq!(item.total(), dec!(61.02));
    }

    #[test]
    fn test_json_round_trip_keeps_money_as_strings() {
        let item =
            OrderLineItem::with_adjustments(4, 2, 2, dec!(10), dec!(1.5), dec!(0.1)).unwrap();

        let json = item.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["unit_price"], "10.00");
        assert_eq!(value["discount"], "1.50");

        assert_eq!(OrderLineItem::from_json(&json).unwrap(), item);
    }
}
