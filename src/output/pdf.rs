//! A4 PDF rendering of the report table.
//!
//! Layout is in millimetres from the top-left corner of the page and only
//! converted to PDF user space (bottom-left origin) when drawing.

use anyhow::{Context, Result, anyhow};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};
use std::fs;
use tracing::{debug, info};

use crate::report::{Column, Report};

const TITLE: &str = "Informe de Disponibilitat: La Alta Ruta de los Perdidos";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 10.0;
/// Rows may not extend below this line.
const PAGE_BREAK_AT: f32 = PAGE_HEIGHT - 20.0;
const TABLE_TOP: f32 = 30.0;
const ROW_HEIGHT: f32 = 10.0;
const DATE_WIDTH: f32 = 25.0;

const PT_TO_MM: f32 = 0.3528;
const TITLE_SIZE: f32 = 16.0;
const TABLE_SIZE: f32 = 8.0;
const FOOTER_SIZE: f32 = 8.0;

const HEADER_FILL: (f32, f32, f32) = (200.0, 220.0, 255.0);

fn column_width(column: Column) -> f32 {
    match column {
        Column::Pineta => 20.0,
        _ => 25.0,
    }
}

/// Where a table line (header or data row) lands.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    page: usize,
    top: f32,
}

/// Places `lines` table lines, breaking to a new page when a line would
/// cross [`PAGE_BREAK_AT`]. Pages are numbered from 1.
fn layout(lines: usize) -> Vec<Placement> {
    let mut placements = Vec::with_capacity(lines);
    let mut page = 1;
    let mut top = TABLE_TOP;
    for _ in 0..lines {
        if top + ROW_HEIGHT > PAGE_BREAK_AT {
            page += 1;
            top = TABLE_TOP;
        }
        placements.push(Placement { page, top });
        top += ROW_HEIGHT;
    }
    placements
}

/// Approximate Helvetica advance width in thousandths of an em.
fn glyph_width(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | '\'' | '|' => 222.0,
        ' ' | '.' | ',' | ':' | ';' | '/' | '!' | '(' | ')' | '[' | ']' | 'f' | 't' | 'I' => 278.0,
        'r' | '-' => 333.0,
        'm' | 'M' => 833.0,
        'w' => 722.0,
        'W' => 944.0,
        'A'..='Z' => 667.0,
        _ => 556.0,
    }
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(glyph_width).sum::<f32>() / 1000.0 * size * PT_TO_MM
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r / 255.0, g / 255.0, b / 255.0, None))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self> {
        let load = |font| {
            doc.add_builtin_font(font)
                .map_err(|e| anyhow!("failed to load builtin font: {e:?}"))
        };
        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
            italic: load(BuiltinFont::HelveticaOblique)?,
        })
    }
}

/// A rectangle on the page, top-left origin.
#[derive(Debug, Clone, Copy)]
struct Area {
    x: f32,
    top: f32,
    width: f32,
    height: f32,
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    fonts: Fonts,
    layer: PdfLayerReference,
    page: usize,
}

impl PageWriter<'_> {
    /// Draws text centred in `area`.
    fn centered(&self, text: &str, font: &IndirectFontRef, size: f32, area: Area) {
        let left = area.x + (area.width - text_width(text, size)).max(0.0) / 2.0;
        let baseline = area.top + area.height / 2.0 + 0.35 * size * PT_TO_MM;
        self.layer
            .use_text(text, size, Mm(left), Mm(PAGE_HEIGHT - baseline), font);
    }

    fn cell_box(&self, x: f32, top: f32, width: f32, fill: bool) {
        let bottom = PAGE_HEIGHT - top - ROW_HEIGHT;
        let upper = PAGE_HEIGHT - top;
        let ring = vec![
            (Point::new(Mm(x), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(bottom)), false),
            (Point::new(Mm(x + width), Mm(upper)), false),
            (Point::new(Mm(x), Mm(upper)), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: if fill {
                PaintMode::FillStroke
            } else {
                PaintMode::Stroke
            },
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Title at the top, page number at the bottom.
    fn decorate(&self) {
        self.layer.set_outline_color(rgb((0.0, 0.0, 0.0)));
        self.layer.set_outline_thickness(0.57);
        self.layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
        let band = |top| Area {
            x: MARGIN,
            top,
            width: PAGE_WIDTH - 2.0 * MARGIN,
            height: 10.0,
        };
        self.centered(TITLE, &self.fonts.bold, TITLE_SIZE, band(MARGIN));
        self.centered(
            &format!("Pàgina {}", self.page),
            &self.fonts.italic,
            FOOTER_SIZE,
            band(PAGE_HEIGHT - 15.0),
        );
    }

    fn move_to(&mut self, page: usize) {
        while self.page < page {
            let (page_index, layer_index) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}", self.page + 1));
            self.layer = self.doc.get_page(page_index).get_layer(layer_index);
            self.page += 1;
            self.decorate();
        }
    }

    fn row<S: AsRef<str>>(&self, fields: &[S], widths: &[f32], top: f32, header: bool) {
        let font = if header { &self.fonts.bold } else { &self.fonts.regular };
        let mut x = MARGIN;
        for (field, width) in fields.iter().zip(widths) {
            if header {
                self.layer.set_fill_color(rgb(HEADER_FILL));
            }
            self.cell_box(x, top, *width, header);
            self.layer.set_fill_color(rgb((0.0, 0.0, 0.0)));
            let area = Area {
                x,
                top,
                width: *width,
                height: ROW_HEIGHT,
            };
            self.centered(field.as_ref(), font, TABLE_SIZE, area);
            x += width;
        }
    }
}

/// Renders the report as a paginated A4 PDF and returns the file bytes.
pub fn render_pdf(report: &Report) -> Result<Vec<u8>> {
    let (doc, page, layer) =
        PdfDocument::new(TITLE, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
    let fonts = Fonts::load(&doc)?;

    let widths: Vec<f32> = std::iter::once(DATE_WIDTH)
        .chain(report.columns.iter().map(|c| column_width(*c)))
        .collect();
    let placements = layout(report.rows.len() + 1);

    {
        let mut writer = PageWriter {
            doc: &doc,
            fonts,
            layer: doc.get_page(page).get_layer(layer),
            page: 1,
        };
        writer.decorate();

        writer.row(&report.short_header(), &widths, placements[0].top, true);
        for (row, place) in report.rows.iter().zip(&placements[1..]) {
            writer.move_to(place.page);
            writer.row(&row.fields(), &widths, place.top, false);
        }

        debug!(pages = writer.page, rows = report.rows.len(), "PDF laid out");
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("failed to serialize PDF: {e:?}"))
}

/// Writes [`render_pdf`] output to `path`, replacing any existing file.
pub fn write_pdf(path: &str, report: &Report) -> Result<()> {
    let bytes = render_pdf(report)?;
    fs::write(path, bytes).with_context(|| format!("failed to write PDF report to '{path}'"))?;
    info!(path, rows = report.rows.len(), "PDF report saved");
    Ok(())
}
