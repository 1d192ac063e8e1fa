//! Label sheet geometry: which part of the page is rendered, at what size,
//! and where the raster is cut into the two labels.

use crate::error::LabelError;
use image::{imageops, Rgb, RgbImage};

/// Rendering resolution for the label region.
pub const RENDER_DPI: f64 = 300.0;

/// PDF user space units per inch.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Divisor of the raster height that gives the boundary between the two labels.
pub const SPLIT_RATIO: f64 = 1.7;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Size of a page in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Top-left quarter of the page, where both labels live.
    pub fn quarter(&self) -> Region {
        Region {
            x: 0.0,
            y: 0.0,
            width: self.width / 2.0,
            height: self.height / 2.0,
        }
    }
}

/// Rectangle in points, origin at the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// What to rasterize and the exact pixel size the result must have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPlan {
    pub page_index: u16,
    pub region: Region,
    /// Pixels per point, applied to both axes.
    pub scale: f64,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl RenderPlan {
    /// Plan the 300 DPI render of the quarter region of the first page.
    pub fn for_page(page: PageSize) -> Self {
        let region = page.quarter();
        let scale = RENDER_DPI / POINTS_PER_INCH;
        Self {
            page_index: 0,
            region,
            scale,
            pixel_width: to_pixels(region.width * scale),
            pixel_height: to_pixels(region.height * scale),
        }
    }

    /// Region origin in raster pixels of the whole page at `scale`.
    pub fn pixel_origin(&self) -> (u32, u32) {
        (
            to_pixels(self.region.x * self.scale),
            to_pixels(self.region.y * self.scale),
        )
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}

/// Row at which the raster is split: `floor(raster_height / 1.7)`.
pub fn cut_height(raster_height: u32) -> u32 {
    (raster_height as f64 / SPLIT_RATIO).floor() as u32
}

/// Split a raster into the top and bottom label.
///
/// The bottom crop is pasted onto a white canvas the size of the top crop,
/// so both labels come out with identical dimensions.
pub fn split_labels(raster: &RgbImage) -> Result<(RgbImage, RgbImage), LabelError> {
    let (width, height) = raster.dimensions();
    let cut = cut_height(height);
    let rest = height - cut;

    if width == 0 || cut == 0 || rest > cut {
        return Err(LabelError::Render(format!(
            "raster {}x{} is too small to split into two labels",
            width, height
        )));
    }

    let top = imageops::crop_imm(raster, 0, 0, width, cut).to_image();
    let bottom_crop = imageops::crop_imm(raster, 0, cut, width, rest).to_image();

    let mut bottom = RgbImage::from_pixel(top.width(), top.height(), WHITE);
    imageops::replace(&mut bottom, &bottom_crop, 0, 0);

    Ok((top, bottom))
}
