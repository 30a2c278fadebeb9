//! Label fonts: a named TrueType font found on the system, or the embedded
//! DejaVu Sans Mono face when the named font is unavailable.

use ab_glyph::{Font, FontArc, GlyphId, InvalidFont, PxScale, ScaleFont, point};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_text_mut;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, PoisonError};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const EMBEDDED_FONT_DATA: &[u8] = include_bytes!("../assets/DejaVuSansMono/DejaVuSansMono.ttf");

const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "/System/Library/Fonts",
    "C:\\Windows\\Fonts",
];

static EMBEDDED_FONT: LazyLock<Result<FontArc, InvalidFont>> =
    LazyLock::new(|| FontArc::try_from_slice(EMBEDDED_FONT_DATA));

/// Named lookups already done, including misses, so the font directories are
/// walked once per name for the life of the process.
static NAMED_FONTS: LazyLock<Mutex<HashMap<String, Option<(FontArc, PathBuf)>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Embedded,
}

#[derive(Debug, Clone)]
pub struct LabelFont {
    font: FontArc,
    scale: PxScale,
    source: FontSource,
}

impl LabelFont {
    /// Looks up `name` (a font file name such as `arial.ttf`, or a path to
    /// one) and falls back to the embedded face. An empty name selects the
    /// embedded face directly.
    pub fn resolve(name: &str, px: f32) -> Result<Self, InvalidFont> {
        if name.is_empty() {
            return Self::embedded(px);
        }

        match named_font(name) {
            Some((font, path)) => Ok(LabelFont {
                font,
                scale: PxScale::from(px),
                source: FontSource::File(path),
            }),
            None => Self::embedded(px),
        }
    }

    pub fn embedded(px: f32) -> Result<Self, InvalidFont> {
        let font = EMBEDDED_FONT.clone()?;
        Ok(LabelFont {
            font,
            scale: PxScale::from(px),
            source: FontSource::Embedded,
        })
    }

    pub fn source(&self) -> &FontSource {
        &self.source
    }

    pub fn is_embedded(&self) -> bool {
        self.source == FontSource::Embedded
    }

    /// Draws `text` with its top-left corner at (`x`, `y`). Pixels outside the
    /// canvas are clipped.
    pub fn draw(&self, canvas: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, text: &str) {
        draw_text_mut(canvas, color, x, y, self.scale, &self.font, text);
    }

    /// Width and height, measured from the draw origin, of the area `draw`
    /// may touch for `text`. Glyphs are laid out the same way `draw_text_mut`
    /// lays them out.
    pub fn text_size(&self, text: &str) -> (u32, u32) {
        let scaled = self.font.as_scaled(self.scale);
        let mut caret = 0.0f32;
        let mut last: Option<GlyphId> = None;
        let (mut right, mut bottom) = (0.0f32, 0.0f32);

        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            let glyph = id.with_scale_and_position(self.scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            if let Some(outline) = self.font.outline_glyph(glyph) {
                if let Some(last) = last {
                    caret += scaled.kern(id, last);
                }
                last = Some(id);
                let bounds = outline.px_bounds();
                right = right.max(bounds.max.x);
                bottom = bottom.max(bounds.max.y);
            }
        }

        (right.ceil() as u32, bottom.ceil() as u32)
    }
}

fn named_font(name: &str) -> Option<(FontArc, PathBuf)> {
    let mut cache = NAMED_FONTS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(found) = cache.get(name) {
        return found.clone();
    }

    let found = match find_font_file(name) {
        Some(path) => match load_font_file(&path) {
            Ok(font) => {
                debug!(font = %path.display(), "loaded label font");
                Some((font, path))
            }
            Err(err) => {
                warn!(font = %path.display(), "unusable font ({err}), using embedded face");
                None
            }
        },
        None => {
            warn!(font = name, "font not found, using embedded face");
            None
        }
    };
    cache.insert(name.to_string(), found.clone());
    found
}

fn load_font_file(path: &Path) -> Result<FontArc, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    Ok(FontArc::try_from_vec(data)?)
}

fn font_dirs() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(user) = dirs::font_dir() {
        dirs.push(user);
    }
    if let Some(home) = dirs::home_dir() {
        dirs.push(home.join(".fonts"));
    }
    dirs.extend(SYSTEM_FONT_DIRS.iter().map(PathBuf::from));
    dirs
}

/// Case-insensitive search for a font file name in the usual font directories.
pub fn find_font_file(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 && direct.is_file() {
        return Some(direct.to_path_buf());
    }

    font_dirs()
        .into_iter()
        .filter(|dir| dir.is_dir())
        .find_map(|dir| {
            WalkDir::new(dir)
                .follow_links(true)
                .into_iter()
                .filter_map(Result::ok)
                .find(|entry| {
                    entry.file_type().is_file()
                        && entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                })
                .map(|entry| entry.into_path())
        })
}
