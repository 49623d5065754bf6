//! Chart geometry
//!
//! All coordinates are millimetres with the origin at the bottom-left of
//! the page, matching PDF user space.

use chrono::{Datelike, NaiveDate};

/// Axis-aligned rectangle on the page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Frame {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    /// Shrink the frame by the given margins
    pub fn inset(&self, left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            x: self.x + left,
            y: self.y + bottom,
            width: (self.width - left - right).max(0.0),
            height: (self.height - top - bottom).max(0.0),
        }
    }
}

/// Linear mapping from data values to page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    min: f64,
    max: f64,
    start: f32,
    end: f32,
}

impl Scale {
    pub fn new(min: f64, max: f64, start: f32, end: f32) -> Self {
        Self {
            min,
            max,
            start,
            end,
        }
    }

    /// Map a value into `[start, end]`; a degenerate domain maps to the middle
    pub fn map(&self, value: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return (self.start + self.end) / 2.0;
        }
        let t = (value - self.min) / span;
        self.start + (self.end - self.start) * t as f32
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Min/max of `values` widened by `pad` of the span on each side
///
/// A flat series is widened by `pad` of its magnitude (or by 1 at zero) so
/// the line is drawn mid-panel. Non-finite values are ignored.
pub fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    let span = max - min;
    let margin = if span > 0.0 {
        span * pad
    } else if min != 0.0 {
        min.abs() * pad
    } else {
        1.0
    };
    Some((min - margin, max + margin))
}

/// Round tick positions covering `[min, max]`, roughly `target` of them
///
/// Steps are 1, 2 or 5 times a power of ten.
pub fn nice_ticks(min: f64, max: f64, target: usize) -> Vec<f64> {
    let span = max - min;
    if !(span > 0.0) || !span.is_finite() || target == 0 {
        return vec![min];
    }

    let step = nice_step(span / target as f64);
    let first = (min / step).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;

    (first..=last)
        .map(|i| {
            let v = i as f64 * step;
            if v.abs() < step * 1e-9 {
                0.0
            } else {
                v
            }
        })
        .collect()
}

fn nice_step(raw: f64) -> f64 {
    let magnitude = 10f64.powf(raw.log10().floor());
    let normalized = raw / magnitude;
    let multiplier = if normalized < 1.5 {
        1.0
    } else if normalized < 3.0 {
        2.0
    } else if normalized < 7.0 {
        5.0
    } else {
        10.0
    };
    multiplier * magnitude
}

/// Format a tick value with just enough decimals for its step
pub fn format_tick(value: f64, ticks: &[f64]) -> String {
    let step = match ticks {
        [a, b, ..] => (b - a).abs(),
        _ => 1.0,
    };
    let decimals = if step > 0.0 && step < 1.0 {
        (-step.log10().floor()) as usize
    } else {
        0
    };
    format!("{:.*}", decimals, value)
}

/// Calendar-aligned date ticks between `first` and `last`
///
/// Spans over two years get yearly ticks, over six months quarterly, over
/// two months monthly, otherwise weekly.
pub fn date_ticks(first: NaiveDate, last: NaiveDate) -> Vec<(NaiveDate, String)> {
    if last <= first {
        return vec![(first, first.format("%Y-%m-%d").to_string())];
    }

    let days = (last - first).num_days();

    if days > 730 {
        (first.year()..=last.year())
            .filter_map(|y| NaiveDate::from_ymd_opt(y, 1, 1))
            .filter(|d| *d >= first && *d <= last)
            .map(|d| (d, d.format("%Y").to_string()))
            .collect()
    } else if days > 60 {
        let every = if days > 180 { 3 } else { 1 };
        month_starts(first, last)
            .filter(|d| (d.month() - 1) % every == 0)
            .map(|d| (d, d.format("%Y-%m").to_string()))
            .collect()
    } else {
        first
            .iter_days()
            .step_by(7)
            .take_while(|d| *d <= last)
            .map(|d| (d, d.format("%m-%d").to_string()))
            .collect()
    }
}

fn month_starts(first: NaiveDate, last: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    let mut cursor = NaiveDate::from_ymd_opt(first.year(), first.month(), 1);
    std::iter::from_fn(move || {
        let current = cursor?;
        cursor = if current.month() == 12 {
            NaiveDate::from_ymd_opt(current.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(current.year(), current.month() + 1, 1)
        };
        Some(current)
    })
    .skip_while(move |d| *d < first)
    .take_while(move |d| *d <= last)
}
