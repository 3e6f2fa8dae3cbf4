//! Display list → standalone SVG document.

use crate::scene::{Color, DisplayList, DrawCmd};
use std::fmt::Write;

/// Render `list` as an SVG of `width` × `height` surface pixels.
pub fn to_svg(list: &DisplayList, width: u32, height: u32) -> String {
    let mut svg = String::new();
    let _ = writeln!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    let [a, b, c, d, e, f] = list.transform().as_coeffs();
    let group_open = format!(
        "<g transform=\"matrix({} {} {} {} {} {})\">",
        num(a),
        num(b),
        num(c),
        num(d),
        num(e),
        num(f)
    );

    let mut in_group = false;
    for cmd in list.commands() {
        let world_space = !matches!(cmd, DrawCmd::Text { .. } | DrawCmd::Clear { .. });
        if world_space != in_group {
            svg.push_str(if world_space { group_open.as_str() } else { "</g>" });
            svg.push('\n');
            in_group = world_space;
        }
        write_cmd(&mut svg, cmd, width, height);
    }
    if in_group {
        svg.push_str("</g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}

fn write_cmd(svg: &mut String, cmd: &DrawCmd, width: u32, height: u32) {
    let _ = match cmd {
        DrawCmd::Clear { color: None } => Ok(()),
        DrawCmd::Clear { color: Some(color) } => writeln!(
            svg,
            "<rect x=\"0\" y=\"0\" width=\"{width}\" height=\"{height}\" {}/>",
            fill(*color)
        ),
        DrawCmd::FillCircle { circle, color } => writeln!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" {}/>",
            num(circle.center.x),
            num(circle.center.y),
            num(circle.radius),
            fill(*color)
        ),
        DrawCmd::StrokeCircle {
            circle,
            color,
            width,
        } => writeln!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"none\" {}/>",
            num(circle.center.x),
            num(circle.center.y),
            num(circle.radius),
            stroke(*color, *width)
        ),
        DrawCmd::StrokeRect { rect, color, width } => writeln!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" {}/>",
            num(rect.x0),
            num(rect.y0),
            num(rect.width()),
            num(rect.height()),
            stroke(*color, *width)
        ),
        DrawCmd::StrokePath { path, color, width } => writeln!(
            svg,
            "<path d=\"{}\" fill=\"none\" {}/>",
            path.to_svg(),
            stroke(*color, *width)
        ),
        DrawCmd::Text {
            origin,
            text,
            color,
            size,
        } => writeln!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"{}\" font-family=\"monospace\" dominant-baseline=\"hanging\" {}>{}</text>",
            num(origin.x),
            num(origin.y),
            num(*size),
            fill(*color),
            escape(text)
        ),
    };
}

fn fill(color: Color) -> String {
    paint_attrs("fill", color)
}

fn stroke(color: Color, width: f64) -> String {
    format!("{} stroke-width=\"{}\"", paint_attrs("stroke", color), num(width))
}

fn paint_attrs(kind: &str, color: Color) -> String {
    let hex = Color { a: 255, ..color }.to_css();
    if color.a == 255 {
        format!("{kind}=\"{hex}\"")
    } else {
        format!("{kind}=\"{hex}\" {kind}-opacity=\"{}\"", num(color.alpha()))
    }
}

/// Two decimals are plenty at pixel scale.
fn num(v: f64) -> f64 {
    let r = (v * 100.0).round() / 100.0;
    // Avoid "-0" in output.
    if r == 0.0 { 0.0 } else { r }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Affine, Circle, Point};
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_transparent_frame() {
        let mut list = DisplayList::new();
        list.push(DrawCmd::Clear { color: None });
        assert_eq!(
            to_svg(&list, 4, 3),
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"4\" height=\"3\" viewBox=\"0 0 4 3\">\n</svg>\n"
        );
    }

    #[test]
    fn world_shapes_share_one_group() {
        let mut list = DisplayList::with_transform(Affine::scale(2.0));
        list.push(DrawCmd::Clear {
            color: Some(Color::BLACK),
        });
        for x in [1.0, 2.0] {
            list.push(DrawCmd::FillCircle {
                circle: Circle::new((x, 1.0), 2.0),
                color: Color::WHITE.with_alpha(0.5),
            });
        }
        list.push(DrawCmd::Text {
            origin: Point::new(10.0, 10.0),
            text: "a < b".into(),
            color: Color::WHITE,
            size: 12.0,
        });
        let svg = to_svg(&list, 10, 10);
        assert_eq!(svg.matches("<g ").count(), 1);
        assert!(svg.contains("matrix(2 0 0 2 0 0)"));
        assert!(svg.contains("<circle cx=\"1\" cy=\"1\" r=\"2\" fill=\"#FFFFFF\" fill-opacity=\"0.5\"/>"));
        assert!(svg.contains("a &lt; b"));
        let text_at = svg.find("<text").unwrap();
        let group_end = svg.find("</g>").unwrap();
        assert!(group_end < text_at, "text is drawn in screen space");
    }
}
