use std::sync::Arc;

use image::{Pixel, RgbImage};

use crate::color::Color;
use crate::vector::Vector2f;

/// A pure function from (u,v) to colour. Grounded on the earlier revision's
/// `ColorSource` trait (`src/texture.rs`): `Texture::{Solid,Pattern,Image}` plus
/// nearest-neighbour `RgbImage` sampling via the `image` crate. The single
/// `Pattern::Checkerboard` variant there is the stylistic precedent for the
/// larger variant tree §4.D requires.
pub trait ColorSource {
    fn color_at_uv(&self, uv: Vector2f) -> Color;
}

#[derive(Debug, Clone)]
pub enum Texture {
    Solid(Color),
    Image(Arc<RgbImage>),
    CircularRamp(Vec<Color>),
    ColourRamp(Vec<Color>),
    ColourBands(Vec<Color>),
    BandedSpiral { colors: Vec<Color>, twist: f64 },
    Tiled { u_repeat: f64, v_repeat: f64, inner: Box<Texture> },
    Flip(Box<Texture>),
    Rotate90(Box<Texture>),
    Mosaic { regions: Vec<MosaicRegion>, default: Color },
}

#[derive(Debug, Clone)]
pub struct MosaicRegion {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub texture: Box<Texture>,
}

impl MosaicRegion {
    pub fn new(left: f64, right: f64, top: f64, bottom: f64, texture: Texture) -> MosaicRegion {
        MosaicRegion { left, right, top, bottom, texture: Box::new(texture) }
    }

    fn contains(&self, uv: Vector2f) -> bool {
        uv.0 >= self.left && uv.0 <= self.right && uv.1 >= self.top && uv.1 <= self.bottom
    }

    fn local_uv(&self, uv: Vector2f) -> Vector2f {
        let w = (self.right - self.left).max(f64::EPSILON);
        let h = (self.bottom - self.top).max(f64::EPSILON);
        Vector2f((uv.0 - self.left) / w, (uv.1 - self.top) / h)
    }
}

impl ColorSource for Texture {
    fn color_at_uv(&self, uv: Vector2f) -> Color {
        // Texture out-of-range UV is clamped, never treated as an error (§7).
        let uv = Vector2f(uv.0.max(0.0).min(1.0), uv.1.max(0.0).min(1.0));

        match self {
            Texture::Solid(c) => *c,
            Texture::Image(img) => img.color_at_uv(uv),
            Texture::CircularRamp(colors) => {
                let dx = uv.0 - 0.5;
                let dy = uv.1 - 0.5;
                let radius = (dx * dx + dy * dy).sqrt() * std::f64::consts::SQRT_2;
                ramp_sample(colors, radius.min(1.0))
            }
            Texture::ColourRamp(colors) => ramp_sample(colors, uv.0),
            Texture::ColourBands(colors) => band_sample(colors, uv.0),
            Texture::BandedSpiral { colors, twist } => {
                let dx = uv.0 - 0.5;
                let dy = uv.1 - 0.5;
                let angle = dy.atan2(dx) / (2.0 * std::f64::consts::PI) + 0.5;
                let radius = (dx * dx + dy * dy).sqrt();
                let param = (angle + radius * twist).fract();
                let param = if param < 0.0 { param + 1.0 } else { param };
                band_sample(colors, param)
            }
            Texture::Tiled { u_repeat, v_repeat, inner } => {
                let u = (uv.0 * u_repeat).fract();
                let v = (uv.1 * v_repeat).fract();
                inner.color_at_uv(Vector2f(if u < 0.0 { u + 1.0 } else { u }, if v < 0.0 { v + 1.0 } else { v }))
            }
            Texture::Flip(inner) => inner.color_at_uv(Vector2f(uv.0, 1.0 - uv.1)),
            Texture::Rotate90(inner) => inner.color_at_uv(Vector2f(uv.1, 1.0 - uv.0)),
            Texture::Mosaic { regions, default } => regions
                .iter()
                .find(|r| r.contains(uv))
                .map(|r| r.texture.color_at_uv(r.local_uv(uv)))
                .unwrap_or(*default),
        }
    }
}

impl ColorSource for RgbImage {
    fn color_at_uv(&self, uv: Vector2f) -> Color {
        let x = ((uv.0 * (self.width() as f64)) as u32).min(self.width().saturating_sub(1));
        let y = ((uv.1 * (self.height() as f64)) as u32).min(self.height().saturating_sub(1));
        let p = self.get_pixel(x, y);
        let c = p.channels();
        Color::new((c[0] as f64) / 255.0, (c[1] as f64) / 255.0, (c[2] as f64) / 255.0)
    }
}

fn mix(a: Color, b: Color, v: f64) -> Color {
    a * (1.0 - v) + b * v
}

/// Linear blend across an ordered colour list by a parameter in [0,1].
fn ramp_sample(colors: &[Color], t: f64) -> Color {
    if colors.is_empty() {
        return Color::black();
    }
    if colors.len() == 1 {
        return colors[0];
    }
    let t = t.max(0.0).min(1.0);
    let scaled = t * (colors.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(colors.len() - 2);
    let frac = scaled - i as f64;
    mix(colors[i], colors[i + 1], frac)
}

/// Discrete (non-blended) band index, wrapping around the list.
fn band_sample(colors: &[Color], t: f64) -> Color {
    if colors.is_empty() {
        return Color::black();
    }
    let t = t.rem_euclid(1.0);
    let i = ((t * colors.len() as f64) as usize).min(colors.len() - 1);
    colors[i]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn solid_ignores_uv() {
        let t = Texture::Solid(Color::red());
        assert_approx_eq!(t.color_at_uv(Vector2f(0.0, 0.0)).r, 1.0);
        assert_approx_eq!(t.color_at_uv(Vector2f(1.0, 1.0)).r, 1.0);
    }

    #[test]
    fn colour_ramp_endpoints() {
        let t = Texture::ColourRamp(vec![Color::black(), Color::white()]);
        let black = t.color_at_uv(Vector2f(0.0, 0.5));
        let white = t.color_at_uv(Vector2f(1.0, 0.5));
        assert_approx_eq!(black.r, 0.0);
        assert_approx_eq!(white.r, 1.0);
    }

    #[test]
    fn colour_bands_discrete() {
        let t = Texture::ColourBands(vec![Color::red(), Color::green(), Color::blue()]);
        assert_approx_eq!(t.color_at_uv(Vector2f(0.1, 0.0)).r, 1.0);
        assert_approx_eq!(t.color_at_uv(Vector2f(0.5, 0.0)).g, 1.0);
        assert_approx_eq!(t.color_at_uv(Vector2f(0.9, 0.0)).b, 1.0);
    }

    #[test]
    fn tiled_wraps_uv() {
        let inner = Texture::ColourBands(vec![Color::red(), Color::green()]);
        let t = Texture::Tiled { u_repeat: 2.0, v_repeat: 1.0, inner: Box::new(inner) };
        // u=0.75 repeated twice -> fract(1.5) = 0.5, lands in the second band (green)
        let c = t.color_at_uv(Vector2f(0.75, 0.0));
        assert_approx_eq!(c.g, 1.0);
    }

    #[test]
    fn flip_mirrors_v() {
        let inner = Texture::ColourBands(vec![Color::red(), Color::green()]);
        let t = Texture::Flip(Box::new(inner));
        let direct = Texture::ColourBands(vec![Color::red(), Color::green()]).color_at_uv(Vector2f(0.0, 0.9));
        let flipped = t.color_at_uv(Vector2f(0.0, 0.1));
        assert_approx_eq!(flipped.r, direct.r);
    }

    #[test]
    fn mosaic_first_match_wins_with_fallthrough() {
        let t = Texture::Mosaic {
            regions: vec![
                MosaicRegion::new(0.0, 0.5, 0.0, 0.5, Texture::Solid(Color::red())),
                MosaicRegion::new(0.0, 1.0, 0.0, 1.0, Texture::Solid(Color::green())),
            ],
            default: Color::blue(),
        };
        assert_approx_eq!(t.color_at_uv(Vector2f(0.1, 0.1)).r, 1.0);
        assert_approx_eq!(t.color_at_uv(Vector2f(0.9, 0.9)).g, 1.0);
        let t_empty = Texture::Mosaic { regions: vec![], default: Color::blue() };
        assert_approx_eq!(t_empty.color_at_uv(Vector2f(0.5, 0.5)).b, 1.0);
    }

    #[test]
    fn uv_out_of_range_is_clamped_not_fatal() {
        let t = Texture::ColourRamp(vec![Color::black(), Color::white()]);
        let c = t.color_at_uv(Vector2f(-5.0, 10.0));
        assert_approx_eq!(c.r, 0.0);
    }
}
