// surface/raster.rs - Software framebuffer backend
//
// RGBA8 row-major buffer sized css-dimensions x device-pixel-ratio. All
// primitives rasterize at pixel centres with src-over blending; the logical
// transform is recomputed on every resize so no previous transform leaks.

use image::{ImageBuffer, ImageFormat, Rgba};
use static_assertions::const_assert_eq;
use std::io::Cursor;

use super::{Colour, DrawingSurface};
use crate::error_handling::{Result, ViewerError};

const BYTES_PER_PIXEL: usize = 4;
// The buffer is handed to `ImageBuffer::from_raw` untouched.
const_assert_eq!(std::mem::size_of::<Rgba<u8>>(), BYTES_PER_PIXEL);

pub struct RasterSurface {
    px_width: u32,
    px_height: u32,
    dpr: f32,
    cols: u32,
    rows: u32,
    sx: f32,
    sy: f32,
    line_width: f32,
    line_width_px: f32,
    colour: Colour,
    background: Colour,
    pixels: Vec<u8>,
    disposed: bool,
}

impl RasterSurface {
    /// Create a surface backed by a `css_width x css_height` area at the
    /// given device pixel ratio, cleared to `background`.
    pub fn new(css_width: u32, css_height: u32, dpr: f32, background: Colour) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        let px_width = ((css_width as f32 * dpr).round() as u32).max(1);
        let px_height = ((css_height as f32 * dpr).round() as u32).max(1);
        let mut surface = Self {
            px_width,
            px_height,
            dpr,
            cols: 1,
            rows: 1,
            sx: px_width as f32,
            sy: px_height as f32,
            line_width: 0.0,
            line_width_px: 0.0,
            colour: Colour::rgb8(0xff, 0xff, 0xff),
            background,
            pixels: vec![0; px_width as usize * px_height as usize * BYTES_PER_PIXEL],
            disposed: false,
        };
        surface.clear();
        surface
    }

    pub fn width(&self) -> u32 {
        self.px_width
    }

    pub fn height(&self) -> u32 {
        self.px_height
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }

    /// React to a change of the backing area or scale factor: reallocate the
    /// buffer and recompute the logical transform from the retained grid
    /// dimensions.
    pub fn resize(&mut self, css_width: u32, css_height: u32, dpr: f32) {
        if self.disposed {
            return;
        }
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        self.dpr = dpr;
        self.px_width = ((css_width as f32 * dpr).round() as u32).max(1);
        self.px_height = ((css_height as f32 * dpr).round() as u32).max(1);
        self.pixels =
            vec![0; self.px_width as usize * self.px_height as usize * BYTES_PER_PIXEL];
        self.recompute_transform();
        self.clear();
    }

    /// RGBA value at a pixel, for inspection. `None` out of bounds or after
    /// disposal.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.disposed || x >= self.px_width || y >= self.px_height {
            return None;
        }
        let at = (y as usize * self.px_width as usize + x as usize) * BYTES_PER_PIXEL;
        Some([
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ])
    }

    /// Encode the current buffer as PNG.
    pub fn to_png(&self) -> Result<Vec<u8>> {
        if self.disposed {
            return Err(ViewerError::SurfaceDisposed);
        }
        let img =
            ImageBuffer::<Rgba<u8>, _>::from_raw(self.px_width, self.px_height, self.pixels.clone())
                .ok_or(ViewerError::SurfaceDisposed)?;
        let mut png = Vec::new();
        img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
        Ok(png)
    }

    fn recompute_transform(&mut self) {
        self.sx = self.px_width as f32 / self.cols.max(1) as f32;
        self.sy = self.px_height as f32 / self.rows.max(1) as f32;
        self.line_width_px = self.line_width * self.sx.min(self.sy);
    }

    #[inline]
    fn to_px(&self, x: f32, y: f32) -> (f32, f32) {
        (x * self.sx, y * self.sy)
    }

    #[inline]
    fn blend_pixel(&mut self, x: i32, y: i32) {
        if x < 0 || y < 0 || x >= self.px_width as i32 || y >= self.px_height as i32 {
            return;
        }
        let src = self.colour;
        let at = (y as usize * self.px_width as usize + x as usize) * BYTES_PER_PIXEL;
        let dst = &mut self.pixels[at..at + BYTES_PER_PIXEL];
        let a = src.a.clamp(0.0, 1.0);
        let blend = |s: f32, d: u8| ((s * a + d as f32 / 255.0 * (1.0 - a)) * 255.0).round() as u8;
        dst[0] = blend(src.r, dst[0]);
        dst[1] = blend(src.g, dst[1]);
        dst[2] = blend(src.b, dst[2]);
        dst[3] = ((a + dst[3] as f32 / 255.0 * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Even-odd scanline fill over pixel-space vertices.
    fn fill_polygon_px(&mut self, points: &[(f32, f32)]) {
        if points.len() < 3 {
            return;
        }
        let min_y = points.iter().map(|p| p.1).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.1).fold(f32::NEG_INFINITY, f32::max);
        let y_start = (min_y.floor() as i32).max(0);
        let y_end = (max_y.ceil() as i32).min(self.px_height as i32);

        let mut crossings: Vec<f32> = Vec::with_capacity(points.len());
        for py in y_start..y_end {
            let sample_y = py as f32 + 0.5;
            crossings.clear();
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                if (a.1 <= sample_y) != (b.1 <= sample_y) {
                    let t = (sample_y - a.1) / (b.1 - a.1);
                    crossings.push(a.0 + t * (b.0 - a.0));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let x_start = (span[0].floor() as i32).max(0);
                let x_end = (span[1].ceil() as i32).min(self.px_width as i32);
                for px in x_start..x_end {
                    let centre = px as f32 + 0.5;
                    if centre >= span[0] && centre < span[1] {
                        self.blend_pixel(px, py);
                    }
                }
            }
        }
    }
}

impl DrawingSurface for RasterSurface {
    fn set_space_requirements(&mut self, cols: u32, rows: u32, line_width: f32) {
        if self.disposed {
            return;
        }
        self.cols = cols.max(1);
        self.rows = rows.max(1);
        self.line_width = line_width.max(0.0);
        self.recompute_transform();
    }

    fn set_colour(&mut self, colour: Colour) {
        self.colour = colour;
    }

    fn clear(&mut self) {
        if self.disposed {
            return;
        }
        let rgba = self.background.to_rgba8();
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }

    fn fill_polygon(&mut self, points: &[(f32, f32)]) {
        if self.disposed {
            return;
        }
        let px_points: Vec<(f32, f32)> =
            points.iter().map(|&(x, y)| self.to_px(x, y)).collect();
        self.fill_polygon_px(&px_points);
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        if self.disposed {
            return;
        }
        let (ax, ay) = self.to_px(x1, y1);
        let (bx, by) = self.to_px(x2, y2);
        let (dx, dy) = (bx - ax, by - ay);
        let len = (dx * dx + dy * dy).sqrt();
        if len < f32::EPSILON || self.line_width_px <= 0.0 {
            return;
        }
        let half = self.line_width_px / 2.0;
        let (ux, uy) = (dx / len, dy / len);
        let (nx, ny) = (-uy * half, ux * half);
        // Square caps so wall segments meeting at a corner close the joint.
        let (ax, ay) = (ax - ux * half, ay - uy * half);
        let (bx, by) = (bx + ux * half, by + uy * half);
        self.fill_polygon_px(&[
            (ax + nx, ay + ny),
            (bx + nx, by + ny),
            (bx - nx, by - ny),
            (ax - nx, ay - ny),
        ]);
    }

    fn fill_segment(
        &mut self,
        cx: f32,
        cy: f32,
        inner_radius: f32,
        outer_radius: f32,
        start_angle: f32,
        end_angle: f32,
    ) {
        if self.disposed || outer_radius <= 0.0 {
            return;
        }
        let full_circle = end_angle - start_angle >= std::f32::consts::TAU - 1e-4;
        let sweep = (end_angle - start_angle).rem_euclid(std::f32::consts::TAU);
        let start = start_angle.rem_euclid(std::f32::consts::TAU);

        let x_min = (((cx - outer_radius) * self.sx).floor() as i32).max(0);
        let x_max = (((cx + outer_radius) * self.sx).ceil() as i32).min(self.px_width as i32);
        let y_min = (((cy - outer_radius) * self.sy).floor() as i32).max(0);
        let y_max = (((cy + outer_radius) * self.sy).ceil() as i32).min(self.px_height as i32);

        for py in y_min..y_max {
            for px in x_min..x_max {
                // Test the pixel centre back in logical space; this keeps the
                // sector circular even under anisotropic scaling.
                let lx = (px as f32 + 0.5) / self.sx - cx;
                let ly = (py as f32 + 0.5) / self.sy - cy;
                let dist = (lx * lx + ly * ly).sqrt();
                if dist < inner_radius || dist > outer_radius {
                    continue;
                }
                if !full_circle {
                    let angle = ly.atan2(lx).rem_euclid(std::f32::consts::TAU);
                    if (angle - start).rem_euclid(std::f32::consts::TAU) > sweep {
                        continue;
                    }
                }
                self.blend_pixel(px, py);
            }
        }
    }

    fn dispose(&mut self) {
        self.pixels = Vec::new();
        self.disposed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Colour = Colour::rgb8(0x10, 0x10, 0x18);
    const RED: Colour = Colour::rgb8(0xff, 0x00, 0x00);

    fn surface_8x8() -> RasterSurface {
        let mut surface = RasterSurface::new(64, 64, 1.0, BG);
        surface.set_space_requirements(8, 8, 0.1);
        surface
    }

    #[test]
    fn clear_fills_the_background() {
        let surface = surface_8x8();
        assert_eq!(surface.pixel(0, 0).unwrap(), BG.to_rgba8());
        assert_eq!(surface.pixel(63, 63).unwrap(), BG.to_rgba8());
    }

    #[test]
    fn unit_cell_polygon_fills_exactly_one_cell() {
        let mut surface = surface_8x8();
        surface.set_colour(RED);
        surface.fill_polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);

        // Inside cell (0,0): scaled to pixels 0..8 in both axes.
        assert_eq!(surface.pixel(4, 4).unwrap(), RED.to_rgba8());
        // Neighbouring cells untouched.
        assert_eq!(surface.pixel(12, 4).unwrap(), BG.to_rgba8());
        assert_eq!(surface.pixel(4, 12).unwrap(), BG.to_rgba8());
    }

    #[test]
    fn translucent_fill_blends_over_background() {
        let mut surface = surface_8x8();
        surface.set_colour(Colour::rgba8(0xff, 0xff, 0xff, 0x80));
        surface.fill_polygon(&[(0.0, 0.0), (8.0, 0.0), (8.0, 8.0), (0.0, 8.0)]);

        let [r, _, _, a] = surface.pixel(32, 32).unwrap();
        // Halfway between background and white.
        assert!(r > BG.to_rgba8()[0] && r < 0xff, "got r={r}");
        assert_eq!(a, 0xff);
    }

    #[test]
    fn line_strokes_with_the_configured_width() {
        let mut surface = surface_8x8();
        surface.set_space_requirements(8, 8, 0.5); // 4px wide strokes
        surface.set_colour(RED);
        surface.line(0.0, 4.0, 8.0, 4.0);

        // Pixels straddling the stroke centre at y=32.
        assert_eq!(surface.pixel(16, 31).unwrap(), RED.to_rgba8());
        assert_eq!(surface.pixel(16, 32).unwrap(), RED.to_rgba8());
        // Well outside the stroke.
        assert_eq!(surface.pixel(16, 40).unwrap(), BG.to_rgba8());
    }

    #[test]
    fn zero_length_line_draws_nothing() {
        let mut surface = surface_8x8();
        surface.set_colour(RED);
        surface.line(2.0, 2.0, 2.0, 2.0);
        for y in 0..64 {
            for x in 0..64 {
                assert_eq!(surface.pixel(x, y).unwrap(), BG.to_rgba8());
            }
        }
    }

    #[test]
    fn full_circle_segment_fills_a_disc() {
        let mut surface = surface_8x8();
        surface.set_colour(RED);
        surface.fill_segment(4.0, 4.0, 0.0, 2.0, 0.0, std::f32::consts::TAU);

        // Centre of the disc (logical (4,4) -> pixel (32,32)).
        assert_eq!(surface.pixel(32, 32).unwrap(), RED.to_rgba8());
        // Radius is 2 cells = 16px; a point 20px away stays background.
        assert_eq!(surface.pixel(32 + 20, 32).unwrap(), BG.to_rgba8());
    }

    #[test]
    fn annular_segment_leaves_the_hole_empty() {
        let mut surface = surface_8x8();
        surface.set_colour(RED);
        surface.fill_segment(4.0, 4.0, 1.0, 2.0, 0.0, std::f32::consts::TAU);

        assert_eq!(surface.pixel(32, 32).unwrap(), BG.to_rgba8());
        // Mid-ring at 1.5 cells = 12px to the right.
        assert_eq!(surface.pixel(32 + 12, 32).unwrap(), RED.to_rgba8());
    }

    #[test]
    fn resize_recomputes_the_transform() {
        let mut surface = surface_8x8();
        surface.resize(32, 32, 2.0); // still 64x64 physical pixels
        assert_eq!(surface.width(), 64);
        surface.set_colour(RED);
        surface.fill_polygon(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        // One cell still maps to 8x8 pixels under the recomputed transform.
        assert_eq!(surface.pixel(4, 4).unwrap(), RED.to_rgba8());
        assert_eq!(surface.pixel(12, 4).unwrap(), BG.to_rgba8());
    }

    #[test]
    fn dispose_is_idempotent_and_silences_draws() {
        let mut surface = surface_8x8();
        surface.dispose();
        surface.dispose();

        surface.set_colour(RED);
        surface.fill_polygon(&[(0.0, 0.0), (8.0, 0.0), (8.0, 8.0)]);
        surface.line(0.0, 0.0, 8.0, 8.0);
        surface.clear();
        assert!(surface.pixel(0, 0).is_none());
        assert!(matches!(surface.to_png(), Err(ViewerError::SurfaceDisposed)));
    }

    #[test]
    fn png_export_produces_a_png_stream() {
        let surface = surface_8x8();
        let png = surface.to_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
