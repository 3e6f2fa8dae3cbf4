//! Canvas2D executor for display lists.
//!
//! World-space commands draw under the list transform; clears and text
//! draw in surface pixels.

use drift_render::{DisplayList, DrawCmd};
use kurbo::{Affine, BezPath, PathEl};
use std::f64::consts::TAU;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

const HUD_FONT: &str = "monospace";

/// Draw `list` onto a `width` × `height` canvas.
pub fn execute(
    ctx: &CanvasRenderingContext2d,
    list: &DisplayList,
    width: f64,
    height: f64,
) -> Result<(), JsValue> {
    let world = list.transform();
    let mut in_world = false;
    apply_transform(ctx, Affine::IDENTITY)?;

    for cmd in list.commands() {
        let wants_world = !matches!(cmd, DrawCmd::Clear { .. } | DrawCmd::Text { .. });
        if wants_world != in_world {
            apply_transform(ctx, if wants_world { world } else { Affine::IDENTITY })?;
            in_world = wants_world;
        }

        match cmd {
            DrawCmd::Clear { color } => {
                ctx.clear_rect(0.0, 0.0, width, height);
                if let Some(color) = color {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.fill_rect(0.0, 0.0, width, height);
                }
            }
            DrawCmd::FillCircle { circle, color } => {
                ctx.begin_path();
                ctx.arc(circle.center.x, circle.center.y, circle.radius, 0.0, TAU)?;
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill();
            }
            DrawCmd::StrokeCircle {
                circle,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.arc(circle.center.x, circle.center.y, circle.radius, 0.0, TAU)?;
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.stroke();
            }
            DrawCmd::StrokeRect { rect, color, width } => {
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.stroke_rect(rect.x0, rect.y0, rect.width(), rect.height());
            }
            DrawCmd::StrokePath { path, color, width } => {
                trace_path(ctx, path);
                ctx.set_stroke_style_str(&color.to_css());
                ctx.set_line_width(*width);
                ctx.stroke();
            }
            DrawCmd::Text {
                origin,
                text,
                color,
                size,
            } => {
                ctx.set_font(&format!("{size}px {HUD_FONT}"));
                ctx.set_text_baseline("top");
                ctx.set_fill_style_str(&color.to_css());
                ctx.fill_text(text, origin.x, origin.y)?;
            }
        }
    }

    apply_transform(ctx, Affine::IDENTITY)
}

fn apply_transform(ctx: &CanvasRenderingContext2d, transform: Affine) -> Result<(), JsValue> {
    let [a, b, c, d, e, f] = transform.as_coeffs();
    ctx.set_transform(a, b, c, d, e, f)
}

fn trace_path(ctx: &CanvasRenderingContext2d, path: &BezPath) {
    ctx.begin_path();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => ctx.move_to(p.x, p.y),
            PathEl::LineTo(p) => ctx.line_to(p.x, p.y),
            PathEl::QuadTo(c, p) => ctx.quadratic_curve_to(c.x, c.y, p.x, p.y),
            PathEl::CurveTo(c1, c2, p) => ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, p.x, p.y),
            PathEl::ClosePath => ctx.close_path(),
        }
    }
}
