//! Theoretical receipt price and divergence
//!
//! theoretical = stock * exchange_rate / conversion_factor
//! divergence  = (actual / theoretical - 1) * 100

use crate::table::PriceTable;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Fair value of one receipt implied by the underlying and the exchange rate
///
/// Returns `None` for a zero conversion factor.
pub fn theoretical_price(stock: Decimal, exchange_rate: Decimal, factor: u32) -> Option<Decimal> {
    (stock * exchange_rate).checked_div(Decimal::from(factor))
}

/// Premium (positive) or discount (negative) of the actual price, in percent
///
/// Returns `None` for a zero theoretical price.
pub fn divergence_pct(actual: Decimal, theoretical: Decimal) -> Option<Decimal> {
    let ratio = actual.checked_div(theoretical)?;
    Some((ratio - Decimal::ONE) * dec!(100))
}

/// Derived columns for one trading day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValuationRow {
    pub date: NaiveDate,
    pub actual: Decimal,
    pub theoretical: Decimal,
    pub divergence_pct: Decimal,
}

/// Divergence statistics over the whole window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DivergenceSummary {
    pub latest: Decimal,
    pub mean: Decimal,
    pub min: Decimal,
    pub max: Decimal,
}

/// Valuation of one asset over a price table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Valuation {
    rows: Vec<ValuationRow>,
}

impl Valuation {
    /// Compute both derived columns for every row of the table
    pub fn compute(table: &PriceTable, factor: u32) -> Self {
        let rows = table
            .rows()
            .iter()
            .filter_map(|row| {
                let theoretical = theoretical_price(row.stock, row.exchange_rate, factor)?;
                let Some(divergence) = divergence_pct(row.receipt, theoretical) else {
                    tracing::debug!(date = %row.date, "Zero theoretical price, row skipped");
                    return None;
                };
                Some(ValuationRow {
                    date: row.date,
                    actual: row.receipt,
                    theoretical,
                    divergence_pct: divergence,
                })
            })
            .collect();

        Self { rows }
    }

    pub fn rows(&self) -> &[ValuationRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn latest(&self) -> Option<&ValuationRow> {
        self.rows.last()
    }

    pub fn summary(&self) -> Option<DivergenceSummary> {
        let latest = self.latest()?.divergence_pct;

        let mut sum = Decimal::ZERO;
        let mut min = latest;
        let mut max = latest;
        for row in &self.rows {
            sum += row.divergence_pct;
            min = min.min(row.divergence_pct);
            max = max.max(row.divergence_pct);
        }
        let mean = sum.checked_div(Decimal::from(self.rows.len() as u64))?;

        Some(DivergenceSummary {
            latest,
            mean,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::PriceRow;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn row(day: u32, receipt: Decimal, stock: Decimal, exchange_rate: Decimal) -> PriceRow {
        PriceRow {
            date: d(day),
            receipt,
            stock,
            exchange_rate,
        }
    }

    #[test]
    fn test_theoretical_price() {
        assert_eq!(theoretical_price(dec!(150.00), dec!(5.00), 20), Some(dec!(37.50)));
    }

    #[test]
    fn test_theoretical_price_zero_factor() {
        assert_eq!(theoretical_price(dec!(150), dec!(5), 0), None);
    }

    #[test]
    fn test_divergence_premium() {
        let divergence = divergence_pct(dec!(40.00), dec!(37.50)).unwrap();
        assert_eq!(divergence.round_dp(6), dec!(6.666667));
        assert!(divergence > dec!(6.6666666666) && divergence < dec!(6.6666666667));
    }

    #[test]
    fn test_divergence_discount() {
        assert_eq!(divergence_pct(dec!(36), dec!(40)), Some(dec!(-10)));
    }

    #[test]
    fn test_divergence_at_parity() {
        assert_eq!(divergence_pct(dec!(37.5), dec!(37.5)), Some(Decimal::ZERO));
    }

    #[test]
    fn test_divergence_zero_theoretical() {
        assert_eq!(divergence_pct(dec!(40), Decimal::ZERO), None);
    }

    #[test]
    fn test_compute_matches_formulas_per_row() {
        let table = PriceTable::from_rows(vec![
            row(2, dec!(40.00), dec!(150.00), dec!(5.00)),
            row(3, dec!(36.72), dec!(153.00), dec!(4.80)),
        ]);
        let valuation = Valuation::compute(&table, 20);
        let rows = valuation.rows();

        assert_eq!(rows.len(), 2);
        for (v, p) in rows.iter().zip(table.rows()) {
            assert_eq!(v.date, p.date);
            assert_eq!(v.actual, p.receipt);
            assert_eq!(v.theoretical, p.stock * p.exchange_rate / dec!(20));
            assert_eq!(
                v.divergence_pct,
                (p.receipt / v.theoretical - Decimal::ONE) * dec!(100)
            );
        }
        assert_eq!(rows[1].theoretical, dec!(36.72));
        assert_eq!(rows[1].divergence_pct, Decimal::ZERO);
    }

    #[test]
    fn test_compute_skips_zero_theoretical() {
        let table = PriceTable::from_rows(vec![
            row(2, dec!(40), Decimal::ZERO, dec!(5)),
            row(3, dec!(40), dec!(150), dec!(5)),
        ]);
        let valuation = Valuation::compute(&table, 20);
        assert_eq!(valuation.rows().len(), 1);
        assert_eq!(valuation.rows()[0].date, d(3));
    }

    #[test]
    fn test_compute_empty_table() {
        let valuation = Valuation::compute(&PriceTable::default(), 20);
        assert!(valuation.is_empty());
        assert!(valuation.latest().is_none());
        assert!(valuation.summary().is_none());
    }

    #[test]
    fn test_summary() {
        // Divergences: +10%, -10%, +3%
        let table = PriceTable::from_rows(vec![
            row(2, dec!(11), dec!(10), dec!(1)),
            row(3, dec!(9), dec!(10), dec!(1)),
            row(6, dec!(10.3), dec!(10), dec!(1)),
        ]);
        let summary = Valuation::compute(&table, 1).summary().unwrap();
        assert_eq!(summary.latest, dec!(3));
        assert_eq!(summary.min, dec!(-10));
        assert_eq!(summary.max, dec!(10));
        assert_eq!(summary.mean, dec!(1));
    }
}
