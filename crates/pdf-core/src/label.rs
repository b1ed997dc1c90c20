//! Caption label rasterization

use crate::{PdfError, Result};
use ab_glyph::{point, Font, FontVec, GlyphId, OutlinedGlyph, PxScale, ScaleFont};
use image::{Rgb, RgbImage};
use std::path::Path;

/// TrueType font used to rasterize attachment captions
pub struct LabelFont {
    font: FontVec,
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelFont")
            .field("glyphs", &self.font.glyph_count())
            .finish()
    }
}

/// One laid-out caption line and its ink bounds
struct LabelLine {
    glyphs: Vec<OutlinedGlyph>,
    min_x: f32,
    min_y: f32,
    width: u32,
    height: u32,
}

impl LabelFont {
    /// Parse font bytes (TTF/OTF)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let font =
            FontVec::try_from_vec(data).map_err(|e| PdfError::FontParseError(e.to_string()))?;
        Ok(Self { font })
    }

    /// Read and parse a font file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_bytes(std::fs::read(path)?)
    }

    /// Scale for an em size of `size` pixels
    fn scale(&self, size: f32) -> PxScale {
        let units_per_em = self.font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * self.font.height_unscaled() / units_per_em)
    }

    fn layout_line(&self, line: &str, scale: PxScale) -> LabelLine {
        let scaled = self.font.as_scaled(scale);
        let mut caret = 0.0;
        let mut previous: Option<GlyphId> = None;
        let mut glyphs = Vec::new();

        for c in line.chars() {
            let id = self.font.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            previous = Some(id);

            if let Some(outlined) = self.font.outline_glyph(glyph) {
                glyphs.push(outlined);
            }
        }

        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for glyph in &glyphs {
            let b = glyph.px_bounds();
            bounds = Some(match bounds {
                None => (b.min.x, b.min.y, b.max.x, b.max.y),
                Some((x0, y0, x1, y1)) => {
                    (x0.min(b.min.x), y0.min(b.min.y), x1.max(b.max.x), y1.max(b.max.y))
                }
            });
        }

        let (min_x, min_y, max_x, max_y) = bounds.unwrap_or_default();
        LabelLine {
            glyphs,
            min_x,
            min_y,
            width: (max_x - min_x).ceil() as u32,
            height: (max_y - min_y).ceil() as u32,
        }
    }

    /// Rasterize caption text, black on white
    ///
    /// Lines are stacked top to bottom; each contributes its ink height and
    /// the image is as wide as the widest line. Returns `None` when the text
    /// has no visible ink.
    pub fn render_label(&self, text: &str, size: f32) -> Option<RgbImage> {
        let scale = self.scale(size);
        let lines: Vec<LabelLine> = text.lines().map(|l| self.layout_line(l, scale)).collect();

        let extents: Vec<(u32, u32)> = lines.iter().map(|l| (l.width, l.height)).collect();
        let (width, height, tops) = stack_lines(&extents)?;

        let mut label = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        for (line, top) in lines.iter().zip(tops) {
            for glyph in &line.glyphs {
                let b = glyph.px_bounds();
                let origin_x = (b.min.x - line.min_x) as i64;
                let origin_y = (b.min.y - line.min_y) as i64 + top as i64;
                glyph.draw(|gx, gy, coverage| {
                    let x = origin_x + gx as i64;
                    let y = origin_y + gy as i64;
                    if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
                        return;
                    }
                    let shade = (255.0 * (1.0 - coverage.clamp(0.0, 1.0))) as u8;
                    let pixel = label.get_pixel_mut(x as u32, y as u32);
                    let value = pixel[0].min(shade);
                    *pixel = Rgb([value, value, value]);
                });
            }
        }

        Some(label)
    }
}

/// Stack lines of `(width, height)` top to bottom
///
/// Returns the label size (widest line, summed heights) and the top offset
/// of each line, or `None` when nothing would be visible.
fn stack_lines(extents: &[(u32, u32)]) -> Option<(u32, u32, Vec<u32>)> {
    let width = extents.iter().map(|&(w, _)| w).max().unwrap_or(0);
    let mut tops = Vec::with_capacity(extents.len());
    let mut height = 0u32;
    for &(_, h) in extents {
        tops.push(height);
        height += h;
    }

    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height, tops))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_lines_widest_and_summed() {
        let stacked = stack_lines(&[(40, 12), (65, 9), (20, 14)]);
        assert_eq!(stacked, Some((65, 35, vec![0, 12, 21])));
    }

    #[test]
    fn test_stack_lines_keeps_blank_lines() {
        assert_eq!(stack_lines(&[(30, 10), (0, 0), (10, 10)]), Some((30, 20, vec![0, 10, 10])));
    }

    #[test]
    fn test_stack_lines_without_ink() {
        assert_eq!(stack_lines(&[]), None);
        assert_eq!(stack_lines(&[(0, 0), (0, 0)]), None);
    }

    #[test]
    fn test_invalid_font_bytes() {
        let result = LabelFont::from_bytes(b"not a font".to_vec());
        assert!(matches!(result, Err(PdfError::FontParseError(_))));
    }

    #[test]
    fn test_missing_font_file() {
        let result = LabelFont::from_file("/nonexistent/label-font.ttf");
        assert!(matches!(result, Err(PdfError::IoError(_))));
    }
}
