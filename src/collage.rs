//! Four-quadrant collage: each input contributes the quadrant matching its
//! position, stretched to the first input's size, labelled with the timestamp
//! found in its file name.

use image::imageops::{self, FilterType};
use image::{ImageError, ImageReader, Rgb, RgbImage};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::font::LabelFont;
use crate::timestamp::timestamp_for_path;

pub const IMAGE_COUNT: usize = 4;

const LABEL_INSET: u32 = 10;
const LABEL_FONT: &str = "arial.ttf";
const LABEL_PX: f32 = 18.0;
const LABEL_YELLOW: [u8; 3] = [255, 255, 0];

#[derive(Debug, thiserror::Error)]
pub enum CollageError {
    #[error("exactly 4 images are required, got {0}")]
    ImageCount(usize),

    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to save {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("embedded label font is unusable: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CollageError {
    pub fn is_count_error(&self) -> bool {
        matches!(self, CollageError::ImageCount(_))
    }
}

/// Resampling used when stretching inputs 2-4 onto the first input's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResizeFilter {
    Nearest,
    Triangle,
    #[default]
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Triangle => FilterType::Triangle,
            ResizeFilter::CatmullRom => FilterType::CatmullRom,
            ResizeFilter::Gaussian => FilterType::Gaussian,
            ResizeFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollageOptions {
    /// Burn timestamps into the quadrant corners.
    pub labels: bool,
    /// Font file looked up in the system font directories; empty selects the
    /// embedded face.
    pub font_name: String,
    pub font_px: f32,
    pub label_color: [u8; 3],
    /// Offset of each label from its quadrant's top-left corner.
    pub label_inset: u32,
    pub resize_filter: ResizeFilter,
}

impl Default for CollageOptions {
    fn default() -> Self {
        Self {
            labels: true,
            font_name: LABEL_FONT.to_string(),
            font_px: LABEL_PX,
            label_color: LABEL_YELLOW,
            label_inset: LABEL_INSET,
            resize_filter: ResizeFilter::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadrantRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Quadrant {
    /// Input order maps onto quadrants in this order.
    pub const ALL: [Quadrant; IMAGE_COUNT] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// Area of this quadrant on a `width` x `height` canvas. The split is at
    /// `width / 2` and `height / 2`, so the right and bottom quadrants take
    /// the odd pixel.
    pub fn rect(self, width: u32, height: u32) -> QuadrantRect {
        let half_w = width / 2;
        let half_h = height / 2;
        match self {
            Quadrant::TopLeft => QuadrantRect { x: 0, y: 0, width: half_w, height: half_h },
            Quadrant::TopRight => QuadrantRect { x: half_w, y: 0, width: width - half_w, height: half_h },
            Quadrant::BottomLeft => QuadrantRect { x: 0, y: half_h, width: half_w, height: height - half_h },
            Quadrant::BottomRight => QuadrantRect {
                x: half_w,
                y: half_h,
                width: width - half_w,
                height: height - half_h,
            },
        }
    }

    pub fn label_origin(self, width: u32, height: u32, inset: u32) -> (i32, i32) {
        let rect = self.rect(width, height);
        ((rect.x + inset) as i32, (rect.y + inset) as i32)
    }
}

/// A decoded input together with the timestamp taken from its file name.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub path: PathBuf,
    pub image: RgbImage,
    pub timestamp: String,
}

impl SourceImage {
    /// Decodes `path`, choosing the format from the file contents so that
    /// a missing or misleading extension does not matter.
    pub fn open(path: &Path) -> Result<Self, CollageError> {
        let decode_error = |source| CollageError::Decode {
            path: path.to_path_buf(),
            source,
        };
        let decoded = ImageReader::open(path)
            .and_then(ImageReader::with_guessed_format)
            .map_err(|err| decode_error(ImageError::IoError(err)))?
            .decode()
            .map_err(decode_error)?;
        let image = decoded.to_rgb8();
        debug!(path = %path.display(), width = image.width(), height = image.height(), "decoded source image");
        Ok(Self {
            path: path.to_path_buf(),
            timestamp: timestamp_for_path(path),
            image,
        })
    }
}

/// Four inputs plus the free-text metadata shown in the display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollageRequest {
    pub images: Vec<PathBuf>,
    pub sat_model: String,
    pub orbit: String,
}

impl CollageRequest {
    pub fn new(images: Vec<PathBuf>, sat_model: impl Into<String>, orbit: impl Into<String>) -> Self {
        Self {
            images,
            sat_model: sat_model.into(),
            orbit: orbit.into(),
        }
    }

    pub fn title(&self) -> String {
        format!("Satellite: {} | Orbit: {}", self.sat_model, self.orbit)
    }
}

/// Decodes the four inputs and composes them. Fails with
/// [`CollageError::ImageCount`] before touching the filesystem unless exactly
/// four paths are given.
pub fn build_collage<P: AsRef<Path>>(paths: &[P], options: &CollageOptions) -> Result<RgbImage, CollageError> {
    if paths.len() != IMAGE_COUNT {
        return Err(CollageError::ImageCount(paths.len()));
    }

    let sources = paths
        .iter()
        .map(|p| SourceImage::open(p.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    let sources: [SourceImage; IMAGE_COUNT] = sources
        .try_into()
        .map_err(|rest: Vec<SourceImage>| CollageError::ImageCount(rest.len()))?;

    let font = if options.labels {
        Some(LabelFont::resolve(&options.font_name, options.font_px)?)
    } else {
        None
    };

    Ok(compose(&sources, options, font.as_ref()))
}

/// Builds the collage for `request` and writes it to `output`, creating the
/// parent directory if needed. The format follows the output extension.
pub fn generate_collage(
    request: &CollageRequest,
    options: &CollageOptions,
    output: &Path,
) -> Result<PathBuf, CollageError> {
    let collage = build_collage(&request.images, options)?;

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    collage.save(output).map_err(|source| CollageError::Save {
        path: output.to_path_buf(),
        source,
    })?;

    info!(output = %output.display(), title = %request.title(), "collage written");
    Ok(output.to_path_buf())
}

/// Pastes the matching quadrant of each (resized) source onto a canvas the
/// size of the first source, then draws the labels if a font is given.
pub fn compose(sources: &[SourceImage; IMAGE_COUNT], options: &CollageOptions, font: Option<&LabelFont>) -> RgbImage {
    let (width, height) = sources[0].image.dimensions();
    let filter = FilterType::from(options.resize_filter);
    let mut canvas = RgbImage::new(width, height);

    for (quadrant, source) in Quadrant::ALL.iter().zip(sources) {
        let fitted = fit_to(&source.image, width, height, filter);
        let r = quadrant.rect(width, height);
        let crop = imageops::crop_imm(&*fitted, r.x, r.y, r.width, r.height).to_image();
        imageops::replace(&mut canvas, &crop, i64::from(r.x), i64::from(r.y));
    }

    if let Some(font) = font {
        let color = Rgb(options.label_color);
        for (quadrant, source) in Quadrant::ALL.iter().zip(sources) {
            let (x, y) = quadrant.label_origin(width, height, options.label_inset);
            font.draw(&mut canvas, x, y, color, &source.timestamp);
        }
    }

    canvas
}

/// Stretches `image` to `width` x `height`; an image already that size is
/// borrowed unchanged.
pub fn fit_to(image: &RgbImage, width: u32, height: u32, filter: FilterType) -> Cow<'_, RgbImage> {
    if image.dimensions() == (width, height) {
        Cow::Borrowed(image)
    } else {
        debug!(from_w = image.width(), from_h = image.height(), width, height, "resizing source");
        Cow::Owned(imageops::resize(image, width, height, filter))
    }
}
