//! Rasterization backends for the label region.

use crate::error::LabelError;
use crate::geometry::RenderPlan;
use image::{imageops, DynamicImage, RgbImage, RgbaImage};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, warn};

/// Renders a region of a PDF page into an RGB raster.
///
/// Implementations must return a raster of exactly
/// `plan.pixel_width x plan.pixel_height` pixels.
pub trait PageRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8], plan: &RenderPlan) -> Result<RgbImage, LabelError>;

    fn backend_name(&self) -> &str;
}

/// PDFium-backed rasterizer. Needs the PDFium shared library at runtime.
pub struct PdfiumRasterizer {
    pdfium: Pdfium,
}

impl PdfiumRasterizer {
    /// Bind to PDFium in `library_dir`, falling back to the system library.
    pub fn bind(library_dir: Option<&Path>) -> Result<Self, LabelError> {
        let bindings = match library_dir {
            Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                .or_else(|e| {
                    warn!("PDFium not found in {}: {}, trying system library", dir.display(), e);
                    Pdfium::bind_to_system_library()
                }),
            None => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| LabelError::Render(format!("failed to load PDFium: {}", e)))?;

        Ok(Self {
            pdfium: Pdfium::new(bindings),
        })
    }
}

impl PageRasterizer for PdfiumRasterizer {
    fn rasterize(&self, pdf_bytes: &[u8], plan: &RenderPlan) -> Result<RgbImage, LabelError> {
        let document = self
            .pdfium
            .load_pdf_from_byte_slice(pdf_bytes, None)
            .map_err(|e| LabelError::DocumentOpen(e.to_string()))?;

        let page = document
            .pages()
            .get(plan.page_index)
            .map_err(|e| LabelError::Render(format!("page {}: {}", plan.page_index, e)))?;

        // PDFium renders whole pages; render at the plan's scale and crop.
        let config = PdfRenderConfig::new().scale_page_by_factor(plan.scale as f32);
        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| LabelError::Render(e.to_string()))?;

        let (width, height) = (bitmap.width() as u32, bitmap.height() as u32);
        debug!(width, height, "rendered page bitmap");

        let page_raster = RgbaImage::from_raw(width, height, bitmap.as_rgba_bytes())
            .ok_or_else(|| LabelError::Render("bitmap size does not match its data".into()))?;

        let (x, y) = plan.pixel_origin();
        if x + plan.pixel_width > width || y + plan.pixel_height > height {
            return Err(LabelError::Render(format!(
                "page rendered at {}x{} cannot hold region {}x{} at ({}, {})",
                width, height, plan.pixel_width, plan.pixel_height, x, y
            )));
        }

        let region = imageops::crop_imm(&page_raster, x, y, plan.pixel_width, plan.pixel_height)
            .to_image();
        Ok(DynamicImage::ImageRgba8(region).to_rgb8())
    }

    fn backend_name(&self) -> &str {
        "pdfium"
    }
}
