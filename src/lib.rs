//! Shipping label splitter library
//!
//! Renders the top-left quarter of the first page of a label sheet PDF at
//! 300 DPI and cuts it into two equally sized label images, ready to be
//! saved as PNG files or sent to a Brother QL printer.
//!
//! The page is rasterized through a [`PageRasterizer`], so the geometry can
//! be exercised without a PDF renderer installed.

pub mod error;
pub mod geometry;
pub mod print;
pub mod render;
pub mod sheet;

pub use error::LabelError;
pub use geometry::{PageSize, Region, RenderPlan};
pub use print::{BrotherQlCommand, LabelPrinter, PrinterConfig};
pub use render::{PageRasterizer, PdfiumRasterizer};
pub use sheet::LabelSheet;

use image::{imageops, RgbImage};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Which of the two labels on the sheet an image holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelPart {
    Top,
    Bottom,
}

impl LabelPart {
    /// Suffix used in output file names.
    pub fn suffix(&self) -> &'static str {
        match self {
            LabelPart::Top => "top",
            LabelPart::Bottom => "bottom",
        }
    }
}

impl fmt::Display for LabelPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} label", self.suffix())
    }
}

/// Rotation applied to label images after extraction.
///
/// Degrees follow the usual image-editor convention: positive values turn
/// the image counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    /// 90 degrees counter-clockwise (`90`).
    CounterClockwise,
    /// 90 degrees clockwise (`-90`).
    Clockwise,
}

impl Rotation {
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::None),
            90 => Some(Rotation::CounterClockwise),
            270 => Some(Rotation::Clockwise),
            _ => None,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::None => 0,
            Rotation::CounterClockwise => 90,
            Rotation::Clockwise => -90,
        }
    }

    pub fn apply(&self, image: &RgbImage) -> RgbImage {
        match self {
            Rotation::None => image.clone(),
            Rotation::CounterClockwise => imageops::rotate270(image),
            Rotation::Clockwise => imageops::rotate90(image),
        }
    }
}

impl FromStr for Rotation {
    type Err = LabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i32>()
            .ok()
            .and_then(Rotation::from_degrees)
            .ok_or_else(|| LabelError::InvalidRotation(s.to_string()))
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.degrees())
    }
}

/// The two label images cut from a sheet. Both have the same dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPair {
    pub top: RgbImage,
    pub bottom: RgbImage,
}

impl LabelPair {
    pub fn get(&self, part: LabelPart) -> &RgbImage {
        match part {
            LabelPart::Top => &self.top,
            LabelPart::Bottom => &self.bottom,
        }
    }

    /// Both images in sheet order, tagged with their part.
    pub fn parts(&self) -> [(LabelPart, &RgbImage); 2] {
        [
            (LabelPart::Top, &self.top),
            (LabelPart::Bottom, &self.bottom),
        ]
    }

    pub fn rotated(&self, rotation: Rotation) -> LabelPair {
        LabelPair {
            top: rotation.apply(&self.top),
            bottom: rotation.apply(&self.bottom),
        }
    }

    pub fn into_tuple(self) -> (RgbImage, RgbImage) {
        (self.top, self.bottom)
    }
}

/// Extracts the label pair from a label sheet PDF.
pub struct LabelExtractor<R> {
    rasterizer: R,
}

impl<R: PageRasterizer> LabelExtractor<R> {
    pub fn new(rasterizer: R) -> Self {
        Self { rasterizer }
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// Parse the PDF and work out the render plan for its first page.
    pub fn plan(&self, pdf_bytes: &[u8]) -> Result<RenderPlan, LabelError> {
        let sheet = LabelSheet::load(pdf_bytes)?;
        let page = sheet.first_page_size()?;
        let plan = RenderPlan::for_page(page);
        debug!(
            pages = sheet.page_count(),
            page_width = page.width,
            page_height = page.height,
            pixel_width = plan.pixel_width,
            pixel_height = plan.pixel_height,
            "planned label region"
        );
        Ok(plan)
    }

    /// Extract the label pair from a PDF held in memory.
    pub fn extract_bytes(&self, pdf_bytes: &[u8]) -> Result<LabelPair, LabelError> {
        let plan = self.plan(pdf_bytes)?;
        if plan.pixel_width == 0 || plan.pixel_height == 0 {
            return Err(LabelError::Render(format!(
                "label region {:.1}x{:.1} pt is empty",
                plan.region.width, plan.region.height
            )));
        }

        let raster = self.rasterizer.rasterize(pdf_bytes, &plan)?;
        if raster.dimensions() != (plan.pixel_width, plan.pixel_height) {
            return Err(LabelError::Render(format!(
                "{} returned {}x{} raster, expected {}x{}",
                self.rasterizer.backend_name(),
                raster.width(),
                raster.height(),
                plan.pixel_width,
                plan.pixel_height
            )));
        }

        let (top, bottom) = geometry::split_labels(&raster)?;
        debug!(
            cut_height = top.height(),
            width = top.width(),
            "split label raster"
        );
        Ok(LabelPair { top, bottom })
    }
}

pub mod file_ops {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tracing::info;

    /// Paths of the two saved label images.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SavedLabels {
        pub top: PathBuf,
        pub bottom: PathBuf,
    }

    impl<R: PageRasterizer> LabelExtractor<R> {
        /// Extract the label pair from a PDF file.
        pub fn extract(&self, pdf_path: &Path) -> Result<LabelPair, LabelError> {
            if !pdf_path.is_file() {
                return Err(LabelError::NotFound(pdf_path.to_path_buf()));
            }

            let bytes = fs::read(pdf_path).map_err(|e| {
                LabelError::DocumentOpen(format!("{}: {}", pdf_path.display(), e))
            })?;

            self.extract_bytes(&bytes)
        }
    }

    /// Output path for one label: `{stem}_{part}.png` in `output_dir`, or
    /// next to the PDF when no directory is given.
    pub fn label_path(pdf_path: &Path, output_dir: Option<&Path>, part: LabelPart) -> PathBuf {
        let dir = match output_dir {
            Some(dir) => dir,
            None => pdf_path.parent().unwrap_or_else(|| Path::new("")),
        };
        let stem = pdf_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "label".to_string());
        dir.join(format!("{}_{}.png", stem, part.suffix()))
    }

    /// Rotate and write both labels as PNG files.
    pub fn save_labels(
        labels: &LabelPair,
        pdf_path: &Path,
        output_dir: Option<&Path>,
        rotation: Rotation,
    ) -> Result<SavedLabels, LabelError> {
        if let Some(dir) = output_dir {
            fs::create_dir_all(dir).map_err(|e| LabelError::Save {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            })?;
        }

        let save = |part: LabelPart| -> Result<PathBuf, LabelError> {
            let path = label_path(pdf_path, output_dir, part);
            rotation
                .apply(labels.get(part))
                .save_with_format(&path, image::ImageFormat::Png)
                .map_err(|e| LabelError::Save {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;
            info!(path = %path.display(), %part, "saved label");
            Ok(path)
        };

        Ok(SavedLabels {
            top: save(LabelPart::Top)?,
            bottom: save(LabelPart::Bottom)?,
        })
    }

    /// How extracted labels leave the program.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DeliveryOptions<'a> {
        /// Send both labels to the printer.
        pub print: bool,
        /// Rotation applied before printing.
        pub print_rotation: Rotation,
        /// Where to save PNGs. When printing, labels are saved only if set;
        /// otherwise they go next to the PDF when unset.
        pub output_dir: Option<&'a Path>,
        /// Rotation applied before saving.
        pub save_rotation: Rotation,
    }

    /// What [`deliver_labels`] did.
    #[derive(Debug, Clone, PartialEq, Eq, Default)]
    pub struct Delivery {
        pub printed: Vec<LabelPart>,
        pub saved: Option<SavedLabels>,
    }

    /// Print the labels top first, then save them as requested by `options`.
    pub fn deliver_labels<P: LabelPrinter + ?Sized>(
        labels: &LabelPair,
        pdf_path: &Path,
        printer: &P,
        options: &DeliveryOptions<'_>,
    ) -> Result<Delivery, LabelError> {
        let mut delivery = Delivery::default();

        if options.print {
            let rotated = labels.rotated(options.print_rotation);
            for (part, image) in rotated.parts() {
                printer.print(image, &part.to_string())?;
                info!(backend = printer.backend_name(), %part, "sent label to printer");
                delivery.printed.push(part);
            }
        }

        if !options.print || options.output_dir.is_some() {
            delivery.saved = Some(save_labels(
                labels,
                pdf_path,
                options.output_dir,
                options.save_rotation,
            )?);
        }

        Ok(delivery)
    }
}
