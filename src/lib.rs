//! bdr-reporter: Brazilian Depositary Receipt divergence report
//!
//! This library provides the components for:
//! - Daily closing prices from the Yahoo Finance chart API
//! - Date alignment with forward-fill across market calendars
//! - Theoretical receipt price and divergence calculation
//! - Multi-page PDF rendering, one page per asset
//! - Structured logging

pub mod chart;
pub mod cli;
pub mod config;
pub mod market;
pub mod report;
pub mod table;
pub mod telemetry;
pub mod valuation;
