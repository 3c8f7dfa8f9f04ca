//! Fixed-layout PDF reports for classification results.
//!
//! One letter-size page: title block, owner/date metadata, the analyzed
//! image (or a textual placeholder when the source file is gone), the
//! prediction result, the advisory, and a disclaimer footer.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference,
};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors returned while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Creating the output directory or writing the file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Document assembly failed.
    #[error("pdf error: {0}")]
    Pdf(String),
}

/// A finished report on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedReport {
    /// Bare filename, servable by name.
    pub filename: String,
    /// Full path under the reports directory.
    pub path: PathBuf,
}

/// Inputs for one report page.
#[derive(Debug, Clone)]
pub struct ReportInput<'a> {
    /// Display name of the owning account.
    pub owner_name: &'a str,
    /// Path of the analyzed source image; may no longer exist.
    pub source_image: &'a Path,
    /// Human-readable class name.
    pub display_label: &'a str,
    /// Winning class probability in [0,1].
    pub confidence: f64,
    /// Treatment advisory text.
    pub treatment: &'a str,
    /// Medicine advisory text.
    pub medicine: &'a str,
    /// Timestamp of the underlying prediction.
    pub when: DateTime<Utc>,
}

/// US letter page size.
const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 18.0;
/// Display edge for the embedded source image (3 inches).
const IMAGE_EDGE: f32 = 76.2;
/// Line advance per wrapped body line.
const LINE_HEIGHT: f32 = 6.0;
/// Rough character budget per wrapped body line at 11pt.
const WRAP_WIDTH: usize = 88;

const DISCLAIMER: &str = "This report was automatically generated by AgroGuard AI. \
Please consult with agricultural experts for additional guidance.";

/// Renders reports into a dedicated directory it owns.
pub struct ReportRenderer {
    reports_dir: PathBuf,
}

impl ReportRenderer {
    /// Create a renderer, ensuring the reports directory exists.
    pub fn new(reports_dir: impl Into<PathBuf>) -> Result<Self, ReportError> {
        let reports_dir = reports_dir.into();
        fs::create_dir_all(&reports_dir)?;
        info!("initialized report renderer (dir={})", reports_dir.display());
        Ok(Self { reports_dir })
    }

    /// Directory the finished documents are written to.
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Render one report and write it to the reports directory.
    ///
    /// The output filename is derived from the generation timestamp;
    /// collisions are not deduplicated.
    pub fn render(&self, input: &ReportInput<'_>) -> Result<RenderedReport, ReportError> {
        let filename = format!("report_{}.pdf", Utc::now().format("%Y%m%d_%H%M%S"));
        let path = self.reports_dir.join(&filename);

        let (doc, page, layer) =
            PdfDocument::new("AgroGuard AI Report", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Page 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| ReportError::Pdf(err.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| ReportError::Pdf(err.to_string()))?;

        let mut cursor = PAGE_HEIGHT - MARGIN - 10.0;
        layer.use_text("AgroGuard AI", 24.0, Mm(72.0), Mm(cursor), &bold);
        cursor -= 9.0;
        layer.use_text(
            "Plant Disease Prediction Report",
            14.0,
            Mm(66.0),
            Mm(cursor),
            &regular,
        );
        cursor -= 14.0;

        cursor = labeled_line(&layer, cursor, "User Name:", input.owner_name, &bold, &regular);
        let date = input.when.format("%Y-%m-%d %H:%M:%S").to_string();
        cursor = labeled_line(&layer, cursor, "Report Date:", &date, &bold, &regular);
        cursor -= 6.0;

        layer.use_text("Analyzed Image", 14.0, Mm(MARGIN), Mm(cursor), &bold);
        cursor -= 4.0;
        cursor = self.place_image(&layer, cursor, input.source_image, &regular);
        cursor -= 10.0;

        layer.use_text("Prediction Results", 14.0, Mm(MARGIN), Mm(cursor), &bold);
        cursor -= 8.0;
        cursor = labeled_line(
            &layer,
            cursor,
            "Detected Disease:",
            input.display_label,
            &bold,
            &regular,
        );
        let confidence = format!("{:.2}%", input.confidence * 100.0);
        cursor = labeled_line(&layer, cursor, "Confidence Score:", &confidence, &bold, &regular);
        cursor -= 6.0;

        layer.use_text("Treatment Recommendations", 14.0, Mm(MARGIN), Mm(cursor), &bold);
        cursor -= 8.0;
        cursor = labeled_block(
            &layer,
            cursor,
            "Recommended Treatment:",
            input.treatment,
            &bold,
            &regular,
        );
        cursor = labeled_block(
            &layer,
            cursor,
            "Suggested Medicine:",
            input.medicine,
            &bold,
            &regular,
        );
        cursor -= 8.0;

        for line in wrap_text(DISCLAIMER, WRAP_WIDTH) {
            layer.use_text(line, 9.0, Mm(MARGIN), Mm(cursor), &regular);
            cursor -= 4.5;
        }

        let file = File::create(&path)?;
        doc.save(&mut BufWriter::new(file))
            .map_err(|err| ReportError::Pdf(err.to_string()))?;
        info!("rendered report (path={})", path.display());
        Ok(RenderedReport { filename, path })
    }

    /// Embed the source image at a fixed display size, or a placeholder
    /// line when the file is missing or undecodable.
    fn place_image(
        &self,
        layer: &PdfLayerReference,
        cursor: f32,
        source_image: &Path,
        regular: &IndirectFontRef,
    ) -> f32 {
        match printpdf::image_crate::open(source_image) {
            Ok(decoded) => {
                let rgb = decoded.to_rgb8();
                let (width_px, height_px) = (rgb.width(), rgb.height());
                let image = Image::from_dynamic_image(&printpdf::image_crate::DynamicImage::ImageRgb8(rgb));
                // Natural size at 300 dpi, scaled to a fixed display edge.
                let dpi = 300.0;
                let natural_width = width_px as f32 * 25.4 / dpi;
                let natural_height = height_px as f32 * 25.4 / dpi;
                let top = cursor - IMAGE_EDGE;
                image.add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(MARGIN)),
                        translate_y: Some(Mm(top)),
                        scale_x: Some(IMAGE_EDGE / natural_width),
                        scale_y: Some(IMAGE_EDGE / natural_height),
                        dpi: Some(dpi),
                        ..ImageTransform::default()
                    },
                );
                top - 4.0
            }
            Err(err) => {
                warn!(
                    "source image unavailable, rendering placeholder (path={}): {}",
                    source_image.display(),
                    err
                );
                let line = cursor - 6.0;
                layer.use_text(
                    "Source image not available.",
                    11.0,
                    Mm(MARGIN),
                    Mm(line),
                    regular,
                );
                line - 4.0
            }
        }
    }
}

/// Draw a bold label and its value on one line; returns the next cursor.
fn labeled_line(
    layer: &PdfLayerReference,
    cursor: f32,
    label: &str,
    value: &str,
    bold: &IndirectFontRef,
    regular: &IndirectFontRef,
) -> f32 {
    layer.use_text(label, 11.0, Mm(MARGIN), Mm(cursor), bold);
    layer.use_text(value, 11.0, Mm(MARGIN + 48.0), Mm(cursor), regular);
    cursor - LINE_HEIGHT
}

/// Draw a bold label followed by wrapped body text; returns the next cursor.
fn labeled_block(
    layer: &PdfLayerReference,
    mut cursor: f32,
    label: &str,
    value: &str,
    bold: &IndirectFontRef,
    regular: &IndirectFontRef,
) -> f32 {
    layer.use_text(label, 11.0, Mm(MARGIN), Mm(cursor), bold);
    cursor -= LINE_HEIGHT;
    for line in wrap_text(value, WRAP_WIDTH) {
        layer.use_text(line, 11.0, Mm(MARGIN + 4.0), Mm(cursor), regular);
        cursor -= LINE_HEIGHT;
    }
    debug!("rendered block (label={label})");
    cursor
}

/// Greedy word wrap on a character budget.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
