//! Hand-tuned sketches for the built-in related-rates scenarios. Geometry is
//! fixed; only the variable colors come from the caller.

use crate::canvas::{Canvas, TextAnchor};
use crate::palette::{ColorMap, Palette};

use super::types::ScenarioKind;
use super::{CANVAS_HEIGHT, CANVAS_WIDTH};

const SCENARIO_FONT_SIZE: f32 = 13.0;

pub fn render_scenario(
    canvas: &mut Canvas,
    kind: ScenarioKind,
    colors: &ColorMap,
    palette: &Palette,
) {
    match kind {
        ScenarioKind::TwoCars => draw_two_cars(canvas, colors, palette),
        ScenarioKind::PlaneRadar => draw_plane_radar(canvas, colors, palette),
        ScenarioKind::Balloon => draw_balloon(canvas, colors, palette),
        ScenarioKind::Cube => draw_cube(canvas, colors, palette),
    }
}

/// Neutral fallback for descriptors nothing else recognizes.
pub fn render_placeholder(canvas: &mut Canvas, palette: &Palette) {
    canvas.text(
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0,
        "Diagram generated based on problem type",
        SCENARIO_FONT_SIZE,
        &palette.placeholder,
        TextAnchor::Middle,
        false,
    );
}

/// Two cars leaving a common start at right angles, with the separation
/// distance as a dashed segment.
fn draw_two_cars(canvas: &mut Canvas, colors: &ColorMap, palette: &Palette) {
    let (cx, cy) = (120.0, 80.0);

    canvas.line(cx, cy, cx - 110.0, cy, &palette.axis, 1.0);
    canvas.line(cx, cy, cx, cy + 280.0, &palette.axis, 1.0);
    label(canvas, cx - 120.0, cy + 5.0, "West", &palette.muted_ink);
    label(canvas, cx + 10.0, cy + 300.0, "South", &palette.muted_ink);

    canvas.circle(cx, cy, 5.0, &palette.accent);
    label(canvas, cx + 10.0, cy - 5.0, "Start", &palette.label_ink);

    let (c1x, c1y) = (cx - 100.0, cy);
    canvas.circle(c1x, c1y, 7.0, colors.get_or("x", &palette.primary));
    label(canvas, c1x - 40.0, c1y - 12.0, "Car 1", &palette.label_ink);
    label(canvas, c1x - 40.0, c1y + 20.0, "x = 50 m", &palette.muted_ink);

    let (c2x, c2y) = (cx, cy + 260.0);
    canvas.circle(c2x, c2y, 7.0, colors.get_or("y", "#8b5cf6"));
    label(canvas, c2x + 15.0, c2y, "Car 2", &palette.label_ink);
    label(canvas, c2x + 15.0, c2y + 15.0, "y = 120 m", &palette.muted_ink);

    let z = colors.get_or("z", &palette.secondary);
    canvas.dashed_line(c1x, c1y, c2x, c2y, z, 2.5, (6.0, 4.0));
    label(
        canvas,
        (c1x + c2x) / 2.0 - 25.0,
        (c1y + c2y) / 2.0,
        "z = 130 m",
        z,
    );
}

/// Radar station watching a plane at fixed altitude: solid legs, dashed
/// hypotenuse for the changing distance.
fn draw_plane_radar(canvas: &mut Canvas, colors: &ColorMap, palette: &Palette) {
    let (rx, ry, scale) = (250.0f32, 320.0f32, 100.0f32);

    canvas.line(0.0, ry, CANVAS_WIDTH, ry, &palette.axis, 2.0);
    label(canvas, 20.0, ry + 20.0, "Ground", &palette.muted_ink);

    canvas.circle(rx, ry, 8.0, &palette.label_ink);
    label(canvas, rx - 45.0, ry + 25.0, "Radar Station", &palette.label_ink);

    let h = colors.get_or("h", &palette.accent);
    canvas.line(rx, ry, rx, ry - scale, h, 2.0);
    label(canvas, rx + 10.0, ry - 50.0, "h = 1 mi", h);

    let px = rx + 3.0f32.sqrt() * scale;
    let py = ry - scale;
    let x_color = colors.get_or("x", &palette.primary);
    canvas.line(rx, py, px, py, x_color, 2.0);
    label(canvas, (rx + px) / 2.0 - 25.0, py - 10.0, "x = √3 mi", x_color);

    canvas.circle(px, py, 7.0, &palette.label_ink);
    label(canvas, px + 12.0, py - 5.0, "Plane", &palette.label_ink);

    let s = colors.get_or("s", &palette.secondary);
    canvas.dashed_line(rx, ry, px, py, s, 2.5, (5.0, 5.0));
    label(
        canvas,
        (rx + px) / 2.0 + 15.0,
        (ry + py) / 2.0,
        "s = 2 mi",
        s,
    );
}

/// Inflating balloon: three size echoes, the middle one opaque with a
/// dashed diameter guide.
fn draw_balloon(canvas: &mut Canvas, colors: &ColorMap, palette: &Palette) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;
    let fill = colors.get_or("V", &palette.secondary);

    for (i, r) in [25.0f32, 40.0, 55.0].into_iter().enumerate() {
        let x = cx + (i as f32 - 1.0) * 140.0;
        let alpha = if i == 1 { 1.0 } else { 0.25 };

        canvas.faded_circle(x, cy, r, fill, alpha);
        canvas.faded_line(x, cy + r, x, cy + r + 40.0, &palette.muted_ink, 1.5, alpha);

        let d = (i + 1) * 2;
        label(
            canvas,
            x - 22.0,
            cy - r - 10.0,
            &format!("d = {} cm", d),
            &palette.label_ink,
        );

        if i == 1 {
            let diameter = colors.get_or("d", &palette.primary);
            canvas.dashed_line(x - r, cy, x + r, cy, diameter, 2.0, (3.0, 3.0));
        }
    }
}

/// Cube with a highlighted bottom edge and the volume rate called out.
fn draw_cube(canvas: &mut Canvas, colors: &ColorMap, palette: &Palette) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;
    let (size, depth) = (120.0, 70.0);

    canvas.outlined_polygon(
        &[
            (cx + depth, cy - depth),
            (cx + depth + size, cy - depth),
            (cx + depth + size, cy - depth + size),
            (cx + depth, cy - depth + size),
        ],
        &palette.face_mid,
        &palette.muted_ink,
        1.5,
    );
    canvas.outlined_polygon(
        &[
            (cx, cy),
            (cx + depth, cy - depth),
            (cx + depth + size, cy - depth),
            (cx + size, cy),
        ],
        &palette.face_dark,
        &palette.muted_ink,
        1.5,
    );
    canvas.outlined_polygon(
        &[
            (cx, cy),
            (cx + size, cy),
            (cx + size, cy + size),
            (cx, cy + size),
        ],
        &palette.face_light,
        &palette.muted_ink,
        1.5,
    );

    let s = colors.get_or("s", &palette.primary);
    canvas.line(cx, cy + size, cx + size, cy + size, s, 3.0);
    label(canvas, cx + size / 2.0 - 30.0, cy + size + 20.0, "s = 20 cm", s);

    label(
        canvas,
        cx - 60.0,
        cy - 90.0,
        "dV/dt = 1200 cm³/min",
        &palette.muted_ink,
    );
}

fn label(canvas: &mut Canvas, x: f32, y: f32, text: &str, color: &str) {
    canvas.text(
        x,
        y,
        text,
        SCENARIO_FONT_SIZE,
        color,
        TextAnchor::Start,
        false,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn render(kind: ScenarioKind, colors: &ColorMap) -> String {
        let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let palette = Palette::default();
        render_scenario(&mut canvas, kind, colors, &palette);
        canvas.into_svg(&palette.background)
    }

    #[test]
    fn test_two_cars_has_dashed_separation() {
        let svg = render(ScenarioKind::TwoCars, &ColorMap::default());
        assert!(svg.contains("z = 130 m"));
        assert!(svg.contains(r#"stroke-dasharray="6,4""#));
        assert!(svg.contains("Car 1"));
        assert!(svg.contains("Car 2"));
        // Default colors apply with an empty map.
        assert!(svg.contains("#8b5cf6"));
    }

    #[test]
    fn test_plane_radar_hypotenuse_is_dashed_and_legs_solid() {
        let svg = render(ScenarioKind::PlaneRadar, &ColorMap::default());
        assert!(svg.contains("s = 2 mi"));
        assert!(svg.contains(r#"stroke-dasharray="5,5""#));
        assert!(svg.contains("x = √3 mi"));
        // The altitude leg is a plain solid line in the accent color.
        assert!(svg.contains(r##"stroke="#10b981" stroke-width="2.0" />"##));
        assert!(svg.contains("Radar Station"));
    }

    #[test]
    fn test_balloon_echoes_fade_and_middle_gets_diameter() {
        let svg = render(ScenarioKind::Balloon, &ColorMap::default());
        assert_eq!(svg.matches(r#"fill-opacity="0.25""#).count(), 2);
        assert_eq!(svg.matches(r#"fill-opacity="1.00""#).count(), 1);
        assert_eq!(svg.matches(r#"stroke-dasharray="3,3""#).count(), 1);
        assert!(svg.contains("d = 2 cm"));
        assert!(svg.contains("d = 4 cm"));
        assert!(svg.contains("d = 6 cm"));
    }

    #[test]
    fn test_cube_labels_bottom_edge_and_rate() {
        let svg = render(ScenarioKind::Cube, &ColorMap::default());
        assert!(svg.contains("s = 20 cm"));
        assert!(svg.contains("dV/dt = 1200 cm³/min"));
        assert_eq!(svg.matches("<polygon").count(), 3);
        assert!(svg.contains(r#"stroke-width="3.0""#));
    }

    #[test]
    fn test_caller_color_overrides_variable() {
        let mut map = HashMap::new();
        map.insert("z".to_string(), "#00ff00".to_string());
        let svg = render(ScenarioKind::TwoCars, &ColorMap::new(map));
        assert!(svg.contains("#00ff00"));
        assert!(!svg.contains("#ef4444"));
    }

    #[test]
    fn test_scenarios_are_deterministic() {
        for kind in [
            ScenarioKind::TwoCars,
            ScenarioKind::PlaneRadar,
            ScenarioKind::Balloon,
            ScenarioKind::Cube,
        ] {
            assert_eq!(
                render(kind, &ColorMap::default()),
                render(kind, &ColorMap::default())
            );
        }
    }

    #[test]
    fn test_placeholder_text_is_centered() {
        let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let palette = Palette::default();
        render_placeholder(&mut canvas, &palette);
        let svg = canvas.into_svg(&palette.background);
        assert!(svg.contains("Diagram generated based on problem type"));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.contains(r#"x="250.00" y="200.00""#));
    }
}
