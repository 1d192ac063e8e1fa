//! Shared fixtures: in-memory label sheets and a synthetic rasterizer.

#![allow(dead_code)]

use image::{Rgb, RgbImage};
use label_split::{LabelError, PageRasterizer, RenderPlan};
use lopdf::{dictionary, Document, Object};
use std::cell::Cell;
use std::path::{Path, PathBuf};

/// Build a PDF with `pages` pages of `width x height` points.
pub fn sheet_pdf(width: i64, height: i64, pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = (0..pages)
        .map(|_| {
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => Object::Array(vec![0i64.into(), 0i64.into(), width.into(), height.into()]),
            });
            Object::Reference(page_id)
        })
        .collect();

    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => pages as i64,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

pub fn a4_pdf() -> Vec<u8> {
    sheet_pdf(595, 842, 1)
}

/// Write `bytes` to `name` inside `dir`.
pub fn write_pdf(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// Pixel pattern used by [`PatternRasterizer`]. Never pure white.
pub fn pattern_pixel(x: u32, y: u32) -> Rgb<u8> {
    Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
}

/// Rasterizer that paints [`pattern_pixel`] at the planned size and counts calls.
#[derive(Default)]
pub struct PatternRasterizer {
    pub calls: Cell<usize>,
}

impl PageRasterizer for PatternRasterizer {
    fn rasterize(&self, _pdf_bytes: &[u8], plan: &RenderPlan) -> Result<RgbImage, LabelError> {
        self.calls.set(self.calls.get() + 1);
        Ok(RgbImage::from_fn(plan.pixel_width, plan.pixel_height, pattern_pixel))
    }

    fn backend_name(&self) -> &str {
        "pattern"
    }
}

/// Rasterizer that ignores the plan and returns a fixed-size raster.
pub struct FixedSizeRasterizer {
    pub width: u32,
    pub height: u32,
}

impl PageRasterizer for FixedSizeRasterizer {
    fn rasterize(&self, _pdf_bytes: &[u8], _plan: &RenderPlan) -> Result<RgbImage, LabelError> {
        Ok(RgbImage::from_fn(self.width, self.height, pattern_pixel))
    }

    fn backend_name(&self) -> &str {
        "fixed"
    }
}

/// Rasterizer that always fails.
pub struct FailingRasterizer;

impl PageRasterizer for FailingRasterizer {
    fn rasterize(&self, _pdf_bytes: &[u8], _plan: &RenderPlan) -> Result<RgbImage, LabelError> {
        Err(LabelError::Render("renderer crashed".to_string()))
    }

    fn backend_name(&self) -> &str {
        "failing"
    }
}

/// Printer that records every label it is given, optionally failing on one.
#[derive(Default)]
pub struct RecordingPrinter {
    pub jobs: std::cell::RefCell<Vec<(String, RgbImage)>>,
    pub fail_on: Option<&'static str>,
}

impl label_split::LabelPrinter for RecordingPrinter {
    fn print(&self, image: &RgbImage, name: &str) -> Result<(), LabelError> {
        if self.fail_on == Some(name) {
            return Err(LabelError::PrintFailed {
                code: 1,
                stderr: "printer offline".to_string(),
            });
        }
        self.jobs.borrow_mut().push((name.to_string(), image.clone()));
        Ok(())
    }

    fn backend_name(&self) -> &str {
        "recording"
    }
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}
