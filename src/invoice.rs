//! PDF invoice rendering.
//!
//! One single-page A4 document per order, written to
//! `{invoice_dir}/invoice_{order_id}.pdf`.

use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::domain::Order;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const TITLE_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 12.0;
const PT_TO_MM: f32 = 0.3528;
// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Invoice IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invoice task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Renders orders to PDF files under a fixed directory.
#[derive(Debug, Clone)]
pub struct InvoiceRenderer {
    dir: PathBuf,
    shop_name: String,
    currency: String,
}

impl InvoiceRenderer {
    pub fn new(dir: impl Into<PathBuf>, shop_name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            shop_name: shop_name.into(),
            currency: currency.into(),
        }
    }

    /// The path an order's invoice is written to.
    pub fn path_for(&self, order_id: &str) -> PathBuf {
        self.dir.join(format!("invoice_{}.pdf", order_id))
    }

    #[instrument(fields(order_id = %order.id), skip(self, order))]
    pub async fn render(&self, order: &Order) -> Result<PathBuf, InvoiceError> {
        debug!("Rendering invoice");

        let path = self.path_for(&order.id);
        let title = format!("{} Invoice", self.shop_name);
        let lines = invoice_lines(order, &self.currency);
        let dir = self.dir.clone();
        let target = path.clone();

        tokio::task::spawn_blocking(move || write_pdf(&dir, &target, &title, &lines)).await??;

        info!(path = %path.display(), "Invoice written");
        Ok(path)
    }
}

/// The `Key: value` lines printed under the title.
pub fn invoice_lines(order: &Order, currency: &str) -> Vec<String> {
    vec![
        format!("Id: {}", order.id),
        format!("Name: {}", order.name),
        format!("Address: {}", order.address),
        format!("Location: {}", order.location.as_deref().unwrap_or("-")),
        format!("Product: {}", order.product),
        format!("Quantity: {}", order.quantity),
        format!("Total: {} {}", currency, order.total),
        format!("Status: {}", order.status),
    ]
}

fn centred_x(text: &str, font_size: f32) -> f32 {
    let width = text.chars().count() as f32 * font_size * AVG_GLYPH_EM * PT_TO_MM;
    ((PAGE_WIDTH_MM - width) / 2.0).max(MARGIN_MM)
}

fn write_pdf(dir: &Path, path: &Path, title: &str, lines: &[String]) -> Result<(), InvoiceError> {
    std::fs::create_dir_all(dir)?;

    let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Invoice");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| InvoiceError::Pdf(e.to_string()))?;
    let layer = doc.get_page(page).get_layer(layer);

    let mut y = PAGE_HEIGHT_MM - MARGIN_MM;
    layer.use_text(title, TITLE_SIZE, Mm(centred_x(title, TITLE_SIZE)), Mm(y), &font);
    y -= 2.0 * LINE_HEIGHT_MM;

    for line in lines {
        layer.use_text(line.as_str(), BODY_SIZE, Mm(MARGIN_MM), Mm(y), &font);
        y -= LINE_HEIGHT_MM;
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| InvoiceError::Pdf(e.to_string()))
}
