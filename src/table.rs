//! Date-aligned price table
//!
//! Joins the receipt, stock and exchange-rate series on trading date. Each
//! market keeps its own holiday calendar, so the join takes the union of
//! dates, forward-fills gaps column by column, and drops rows that are still
//! incomplete (only possible before a column's first observation).

use crate::market::ClosingSeries;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// One trading day with all three prices present
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    /// Depositary receipt close (local currency)
    pub receipt: Decimal,
    /// Underlying stock close (foreign currency)
    pub stock: Decimal,
    /// Local currency per one unit of foreign currency
    pub exchange_rate: Decimal,
}

/// Cleaned, ascending-by-date price table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceTable {
    rows: Vec<PriceRow>,
}

impl PriceTable {
    /// Outer-join three series on date, forward-fill, drop incomplete rows
    pub fn align(receipt: &ClosingSeries, stock: &ClosingSeries, fx: &ClosingSeries) -> Self {
        let mut joined: BTreeMap<NaiveDate, [Option<Decimal>; 3]> = BTreeMap::new();

        for (column, series) in [receipt, stock, fx].into_iter().enumerate() {
            for (date, price) in &series.points {
                joined.entry(*date).or_default()[column] = Some(*price);
            }
        }

        let mut last: [Option<Decimal>; 3] = [None; 3];
        let mut rows = Vec::with_capacity(joined.len());

        for (date, values) in joined {
            for (slot, value) in last.iter_mut().zip(values) {
                if value.is_some() {
                    *slot = value;
                }
            }

            if let [Some(receipt), Some(stock), Some(exchange_rate)] = last {
                rows.push(PriceRow {
                    date,
                    receipt,
                    stock,
                    exchange_rate,
                });
            }
        }

        Self { rows }
    }

    pub fn from_rows(mut rows: Vec<PriceRow>) -> Self {
        rows.sort_by_key(|r| r.date);
        Self { rows }
    }

    pub fn rows(&self) -> &[PriceRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.rows.first().map(|r| r.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.rows.last().map(|r| r.date)
    }
}
