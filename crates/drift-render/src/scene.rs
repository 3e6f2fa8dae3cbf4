//! Backend-neutral drawing commands.
//!
//! A frame is painted into a [`DisplayList`] once, then executed by
//! whichever backend owns the surface (Canvas2D in the browser, SVG text
//! in the headless runner).

use kurbo::{Affine, BezPath, Circle, Point, Rect};

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgba8(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba8(0, 0, 0, 255);
    pub const RED: Color = Color::rgba8(255, 0, 0, 255);

    pub const fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack `0xRRGGBBAA`.
    pub const fn from_rgba32_u32(rgba: u32) -> Self {
        Self::rgba8(
            (rgba >> 24) as u8,
            (rgba >> 16) as u8,
            (rgba >> 8) as u8,
            rgba as u8,
        )
    }

    /// Same color with alpha replaced; `alpha` is clamped to `0.0..=1.0`.
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    pub fn alpha(self) -> f64 {
        self.a as f64 / 255.0
    }

    /// `#RRGGBB` when opaque, `rgba(r, g, b, a)` otherwise.
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                round3(self.alpha())
            )
        }
    }
}

fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

// ─── Commands ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    /// Reset the whole surface. `None` clears to transparent.
    Clear { color: Option<Color> },
    FillCircle { circle: Circle, color: Color },
    StrokeCircle { circle: Circle, color: Color, width: f64 },
    StrokeRect { rect: Rect, color: Color, width: f64 },
    StrokePath { path: BezPath, color: Color, width: f64 },
    /// Screen-space text; not affected by the list transform.
    Text { origin: Point, text: String, color: Color, size: f64 },
}

/// Ordered commands for one frame, drawn under a single world transform.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayList {
    transform: Affine,
    cmds: Vec<DrawCmd>,
}

impl Default for DisplayList {
    fn default() -> Self {
        Self::with_transform(Affine::IDENTITY)
    }
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transform(transform: Affine) -> Self {
        Self {
            transform,
            cmds: Vec::new(),
        }
    }

    /// World → surface transform applied to every command except text.
    pub fn transform(&self) -> Affine {
        self.transform
    }

    pub fn push(&mut self, cmd: DrawCmd) {
        self.cmds.push(cmd);
    }

    pub fn commands(&self) -> &[DrawCmd] {
        &self.cmds
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unpacks_rgba32() {
        assert_eq!(
            Color::from_rgba32_u32(0xffff0055),
            Color::rgba8(255, 255, 0, 0x55)
        );
    }

    #[test]
    fn css_uses_hex_only_when_opaque() {
        assert_eq!(Color::RED.to_css(), "#FF0000");
        assert_eq!(Color::RED.with_alpha(0.5).to_css(), "rgba(255, 0, 0, 0.502)");
    }

    #[test]
    fn with_alpha_clamps() {
        assert_eq!(Color::WHITE.with_alpha(3.0).a, 255);
        assert_eq!(Color::WHITE.with_alpha(-1.0).a, 0);
    }
}
