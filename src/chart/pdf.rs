//! PDF report backed by printpdf
//!
//! The document is created when the first page is appended and written
//! once by [`PageSink::finish`].

use super::layout::{date_ticks, format_tick, nice_ticks, padded_range, Frame, Scale};
use super::{AssetPage, PageSink, RenderError};
use crate::valuation::ValuationRow;
use chrono::NaiveDate;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerIndex, PdfLayerReference, PdfPageIndex, Point, Rgb,
};
use rust_decimal::prelude::ToPrimitive;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// A4 portrait
const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;

const MARGIN_MM: f32 = 15.0;
const LAYER_NAME: &str = "Charts";
const PT_TO_MM: f32 = 0.3528;

const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const GRID: (f32, f32, f32) = (0.8, 0.8, 0.8);
const ACTUAL: (f32, f32, f32) = (0.12, 0.47, 0.71);
const THEORETICAL: (f32, f32, f32) = (1.0, 0.5, 0.05);
const DIVERGENCE: (f32, f32, f32) = (0.17, 0.63, 0.17);
const ZERO_LINE: (f32, f32, f32) = (0.84, 0.15, 0.16);

/// Multi-page PDF with one page per asset
pub struct PdfReport {
    title: String,
    document: Option<OpenDocument>,
    pages: usize,
}

struct OpenDocument {
    doc: PdfDocumentReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// `PdfDocument::new` always creates a page; it is used by the first append
    first_page: Option<(PdfPageIndex, PdfLayerIndex)>,
}

impl OpenDocument {
    fn new(title: &str) -> Result<Self, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            Mm(PAGE_WIDTH_MM),
            Mm(PAGE_HEIGHT_MM),
            LAYER_NAME,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;

        Ok(Self {
            doc,
            regular,
            bold,
            first_page: Some((page, layer)),
        })
    }

    fn next_layer(&mut self) -> PdfLayerReference {
        let (page, layer) = self.first_page.take().unwrap_or_else(|| {
            self.doc
                .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME)
        });
        self.doc.get_page(page).get_layer(layer)
    }
}

fn pdf_error(err: impl std::fmt::Display) -> RenderError {
    RenderError::Pdf(err.to_string())
}

impl PdfReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            document: None,
            pages: 0,
        }
    }
}

impl PageSink for PdfReport {
    fn append(&mut self, page: &AssetPage) -> Result<(), RenderError> {
        if page.rows.is_empty() {
            return Err(RenderError::EmptyPage(page.name.clone()));
        }

        if self.document.is_none() {
            self.document = Some(OpenDocument::new(&self.title)?);
        }
        let Some(open) = self.document.as_mut() else {
            return Err(RenderError::Pdf("document not initialised".to_string()));
        };

        let layer = open.next_layer();
        let canvas = Canvas {
            layer,
            regular: &open.regular,
            bold: &open.bold,
        };
        draw_page(&canvas, page);

        self.pages += 1;
        Ok(())
    }

    fn pages(&self) -> usize {
        self.pages
    }

    /// Nothing is written when no page was appended.
    fn finish(self, path: impl AsRef<Path>) -> Result<usize, RenderError> {
        let path = path.as_ref();
        let Some(open) = self.document else {
            tracing::warn!(path = %path.display(), "No pages rendered, report not written");
            return Ok(0);
        };

        let mut writer = BufWriter::new(File::create(path)?);
        open.doc.save(&mut writer).map_err(pdf_error)?;

        tracing::info!(path = %path.display(), pages = self.pages, "Report written");
        Ok(self.pages)
    }
}

/// Thin drawing helpers over a printpdf layer
struct Canvas<'a> {
    layer: PdfLayerReference,
    regular: &'a IndirectFontRef,
    bold: &'a IndirectFontRef,
}

#[derive(Clone, Copy)]
enum Stroke {
    Solid,
    Dashed,
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Center,
    Right,
}

impl Canvas<'_> {
    fn stroke(&self, color: (f32, f32, f32), width_pt: f32, stroke: Stroke) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(color.0, color.1, color.2, None)));
        self.layer.set_outline_thickness(width_pt);
        let pattern = match stroke {
            Stroke::Solid => LineDashPattern::default(),
            Stroke::Dashed => LineDashPattern {
                dash_1: Some(4),
                gap_1: Some(2),
                ..LineDashPattern::default()
            },
        };
        self.layer.set_line_dash_pattern(pattern);
    }

    fn polyline(&self, points: &[(f32, f32)]) {
        if points.len() < 2 {
            return;
        }
        self.layer.add_line(Line {
            points: points
                .iter()
                .map(|(x, y)| (Point::new(Mm(*x), Mm(*y)), false))
                .collect(),
            is_closed: false,
        });
    }

    fn rect(&self, frame: &Frame) {
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(frame.x), Mm(frame.y)), false),
                (Point::new(Mm(frame.right()), Mm(frame.y)), false),
                (Point::new(Mm(frame.right()), Mm(frame.top())), false),
                (Point::new(Mm(frame.x), Mm(frame.top())), false),
            ],
            is_closed: true,
        });
    }

    fn text(&self, text: &str, size_pt: f32, x: f32, y: f32, align: Align, bold: bool) {
        // Helvetica averages roughly half an em per glyph
        let width = text.chars().count() as f32 * size_pt * PT_TO_MM * 0.5;
        let x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
        let font = if bold { self.bold } else { self.regular };
        self.layer.use_text(text, size_pt, Mm(x), Mm(y), font);
    }
}

/// One plotted line
struct Series<'a> {
    label: &'a str,
    color: (f32, f32, f32),
    stroke: Stroke,
    values: Vec<(NaiveDate, f64)>,
}

/// Panel decoration
struct Panel<'a> {
    title: &'a str,
    y_label: &'a str,
    x_label: Option<&'a str>,
    legend: bool,
    zero_line: bool,
}

fn draw_page(canvas: &Canvas<'_>, page: &AssetPage) {
    let top = PAGE_HEIGHT_MM - MARGIN_MM;
    canvas.text(&page.title, 16.0, PAGE_WIDTH_MM / 2.0, top - 5.0, Align::Center, true);
    canvas.text(&page.subtitle, 8.0, PAGE_WIDTH_MM / 2.0, top - 12.0, Align::Center, false);

    let width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let panel_height = (top - 20.0 - MARGIN_MM - 10.0) / 2.0;
    let upper = Frame::new(MARGIN_MM, MARGIN_MM + panel_height + 10.0, width, panel_height);
    let lower = Frame::new(MARGIN_MM, MARGIN_MM, width, panel_height);

    let prices = [
        Series {
            label: "Actual BDR Price (BRL)",
            color: ACTUAL,
            stroke: Stroke::Solid,
            values: column(&page.rows, |r| r.actual.to_f64()),
        },
        Series {
            label: "Theoretical BDR Price (BRL)",
            color: THEORETICAL,
            stroke: Stroke::Dashed,
            values: column(&page.rows, |r| r.theoretical.to_f64()),
        },
    ];
    draw_panel(
        canvas,
        upper,
        &Panel {
            title: "Price Comparison (BRL)",
            y_label: "Price (R$)",
            x_label: None,
            legend: true,
            zero_line: false,
        },
        &prices,
    );

    let divergence = [Series {
        label: "Divergence",
        color: DIVERGENCE,
        stroke: Stroke::Solid,
        values: column(&page.rows, |r| r.divergence_pct.to_f64()),
    }];
    draw_panel(
        canvas,
        lower,
        &Panel {
            title: "Divergence (Premium/Discount)",
            y_label: "Divergence (%)",
            x_label: Some("Date"),
            legend: false,
            zero_line: true,
        },
        &divergence,
    );
}

fn column(
    rows: &[ValuationRow],
    value: impl Fn(&ValuationRow) -> Option<f64>,
) -> Vec<(NaiveDate, f64)> {
    rows.iter()
        .filter_map(|r| value(r).map(|v| (r.date, v)))
        .collect()
}

fn draw_panel(canvas: &Canvas<'_>, outer: Frame, panel: &Panel<'_>, series: &[Series<'_>]) {
    canvas.text(
        panel.title,
        12.0,
        outer.x + outer.width / 2.0,
        outer.top() - 4.0,
        Align::Center,
        true,
    );

    let plot = outer.inset(16.0, 2.0, 12.0, 10.0);
    canvas.text(panel.y_label, 8.0, plot.x, plot.top() + 2.0, Align::Left, false);
    if let Some(x_label) = panel.x_label {
        canvas.text(x_label, 9.0, plot.x + plot.width / 2.0, outer.y, Align::Center, false);
    }

    let dates = series.iter().flat_map(|s| s.values.iter().map(|(d, _)| *d));
    let (Some(first), Some(last)) = (dates.clone().min(), dates.max()) else {
        return;
    };

    let mut y_values: Vec<f64> = series
        .iter()
        .flat_map(|s| s.values.iter().map(|(_, v)| *v))
        .collect();
    if panel.zero_line {
        y_values.push(0.0);
    }
    let Some((y_min, y_max)) = padded_range(y_values, 0.05) else {
        return;
    };

    let day_span = (last - first).num_days() as f64;
    let x_scale = Scale::new(0.0, day_span, plot.x, plot.right());
    let y_scale = Scale::new(y_min, y_max, plot.y, plot.top());
    let x_of = |date: NaiveDate| x_scale.map((date - first).num_days() as f64);

    // Grid and tick labels
    canvas.stroke(GRID, 0.4, Stroke::Dashed);
    let y_ticks = nice_ticks(y_min, y_max, 6);
    for tick in &y_ticks {
        let y = y_scale.map(*tick);
        canvas.polyline(&[(plot.x, y), (plot.right(), y)]);
        canvas.text(&format_tick(*tick, &y_ticks), 7.0, plot.x - 1.5, y - 1.0, Align::Right, false);
    }
    for (date, label) in date_ticks(first, last) {
        let x = x_of(date);
        canvas.polyline(&[(x, plot.y), (x, plot.top())]);
        canvas.text(&label, 7.0, x, plot.y - 4.0, Align::Center, false);
    }

    canvas.stroke(BLACK, 0.6, Stroke::Solid);
    canvas.rect(&plot);

    if panel.zero_line && y_scale.contains(0.0) {
        canvas.stroke(ZERO_LINE, 0.8, Stroke::Dashed);
        let y = y_scale.map(0.0);
        canvas.polyline(&[(plot.x, y), (plot.right(), y)]);
    }

    for s in series {
        let points: Vec<(f32, f32)> = s
            .values
            .iter()
            .map(|(date, v)| (x_of(*date), y_scale.map(*v)))
            .collect();
        canvas.stroke(s.color, 0.7, s.stroke);
        canvas.polyline(&points);
    }

    if panel.legend {
        let mut y = plot.top() - 5.0;
        for s in series {
            canvas.stroke(s.color, 1.0, s.stroke);
            canvas.polyline(&[(plot.x + 3.0, y + 1.0), (plot.x + 11.0, y + 1.0)]);
            canvas.text(s.label, 8.0, plot.x + 13.0, y, Align::Left, false);
            y -= 5.0;
        }
    }
}
