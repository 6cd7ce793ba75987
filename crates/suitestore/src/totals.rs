//! Order total derivation.
//!
//! Order totals are derived fields: they are always a pure function of the
//! current line items and tax rate, and are recomputed rather than trusted
//! whenever an order is read.

use serde::{Deserialize, Serialize};

/// Amounts that make up a priced line.
pub trait LineAmounts {
    /// Units ordered.
    fn quantity(&self) -> f64;

    /// Price per unit.
    fn unit_price(&self) -> f64;

    /// Flat discount for the whole line, if any.
    fn discount(&self) -> Option<f64>;

    /// `quantity * unit_price - discount`, with a missing discount counting as 0.
    fn line_subtotal(&self) -> f64 {
        self.quantity() * self.unit_price() - self.discount().unwrap_or(0.0)
    }
}

/// Derived order amounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    /// Sum of all line subtotals.
    pub subtotal_before_tax: f64,
    /// `subtotal_before_tax * tax_rate / 100`.
    pub tax_amount: f64,
    /// `subtotal_before_tax + tax_amount`.
    pub total: f64,
}

/// Derive subtotal, tax and total from line items and a percentage tax rate.
///
/// Negative quantities, prices and rates are not rejected.
#[must_use]
pub fn calculate_order_totals<L: LineAmounts>(items: &[L], tax_rate: f64) -> OrderTotals {
    let subtotal_before_tax = items
        .iter()
        .fold(0.0, |acc, item| acc + item.line_subtotal());
    let tax_amount = subtotal_before_tax * (tax_rate / 100.0);

    OrderTotals {
        subtotal_before_tax,
        tax_amount,
        total: subtotal_before_tax + tax_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Line(f64, f64, Option<f64>);

    impl LineAmounts for Line {
        fn quantity(&self) -> f64 {
            self.0
        }

        fn unit_price(&self) -> f64 {
            self.1
        }

        fn discount(&self) -> Option<f64> {
            self.2
        }
    }

    #[test]
    fn test_two_line_order_with_tax() {
        let items = [Line(2.0, 1500.0, Some(50.0)), Line(1.0, 2000.0, Some(50.0))];
        let totals = calculate_order_totals(&items, 8.0);

        assert_eq!(totals.subtotal_before_tax, 4900.0);
        assert_eq!(totals.tax_amount, 392.0);
        assert_eq!(totals.total, 5292.0);
    }

    #[test]
    fn test_empty_items_are_zero() {
        for rate in [0.0, 8.0, 21.5, -3.0] {
            let totals = calculate_order_totals::<Line>(&[], rate);
            assert_eq!(totals, OrderTotals::default());
            assert!(totals.total.is_sign_positive());
        }
    }

    #[test]
    fn test_missing_discount_counts_as_zero() {
        let line = Line(3.0, 10.0, None);
        assert_eq!(line.line_subtotal(), 30.0);
    }

    #[test]
    fn test_total_is_subtotal_plus_tax() {
        let items = [
            Line(3.0, 19.99, Some(1.5)),
            Line(0.5, 7.25, None),
            Line(12.0, 0.1, Some(0.0)),
        ];
        for rate in [0.0, 5.0, 7.75, 19.0] {
            let totals = calculate_order_totals(&items, rate);
            let expected_subtotal: f64 = items.iter().map(LineAmounts::line_subtotal).sum();
            assert_eq!(totals.subtotal_before_tax, expected_subtotal);
            assert_eq!(totals.total, totals.subtotal_before_tax + totals.tax_amount);
        }
    }

    #[test]
    fn test_negative_amounts_pass_through() {
        let items = [Line(-1.0, 100.0, None)];
        let totals = calculate_order_totals(&items, 10.0);
        assert_eq!(totals.subtotal_before_tax, -100.0);
        assert_eq!(totals.tax_amount, -10.0);
        assert_eq!(totals.total, -110.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(OrderTotals::default()).unwrap();
        assert!(json.get("subtotalBeforeTax").is_some());
        assert!(json.get("taxAmount").is_some());
        assert!(json.get("total").is_some());
    }
}
