//! Rendering for AI-described diagrams. The descriptor carries no
//! coordinates, so layout is a deterministic function of each element's shape
//! and ordinal index; any position hints upstream might emit are ignored.

use crate::canvas::{Canvas, TextAnchor};
use crate::fonts::{ellipsize, TextMeasure};
use crate::palette::{ColorMap, Palette};

use super::types::{Element, GenericDiagram, GenericKind, ShapeKind};
use super::{CANVAS_HEIGHT, CANVAS_WIDTH};

const ELEMENT_STROKE_WIDTH: f32 = 2.5;
const ELEMENT_LABEL_FONT_SIZE: f32 = 13.0;
/// Horizontal gap between clustered circles and points.
const CLUSTER_SPACING: f32 = 80.0;
/// Length of radiating line elements, measured from canvas center.
const RADIAL_LENGTH: f32 = 100.0;
const GRAPH_AXIS_HALF: f32 = 150.0;

pub fn render_generic(
    canvas: &mut Canvas,
    diagram: &GenericDiagram,
    colors: &ColorMap,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;

    if diagram.elements.is_empty() {
        let description = if diagram.description.is_empty() {
            "Diagram visualization"
        } else {
            diagram.description.as_str()
        };
        let description = ellipsize(measure, description, 14.0, false, CANVAS_WIDTH - 40.0);
        canvas.text(
            cx,
            cy - 10.0,
            &description,
            14.0,
            &palette.placeholder,
            TextAnchor::Middle,
            false,
        );
        canvas.text(
            cx,
            cy + 10.0,
            "(AI-generated diagram)",
            12.0,
            &palette.faint_ink,
            TextAnchor::Middle,
            false,
        );
        return;
    }

    match diagram.kind {
        GenericKind::Graph => draw_graph_sketch(canvas, diagram, colors, palette),
        GenericKind::ThreeD => draw_isometric_box(canvas, palette),
        GenericKind::Geometry | GenericKind::Generic => {
            draw_geometry_elements(canvas, diagram, colors, palette);
        }
    }

    if !diagram.description.is_empty() {
        let description = ellipsize(measure, &diagram.description, 11.0, false, CANVAS_WIDTH - 20.0);
        canvas.text(
            cx,
            CANVAS_HEIGHT - 15.0,
            &description,
            11.0,
            &palette.muted_ink,
            TextAnchor::Middle,
            false,
        );
    }
}

/// Label lookup wins over the role so callers can pin a specific variable's
/// color; an unknown role falls back to the primary accent.
fn element_color<'a>(element: &Element, colors: &'a ColorMap, palette: &'a Palette) -> &'a str {
    match colors.get(&element.label) {
        Some(color) => color,
        None => palette.role_color(&element.color_role),
    }
}

fn draw_geometry_elements(
    canvas: &mut Canvas,
    diagram: &GenericDiagram,
    colors: &ColorMap,
    palette: &Palette,
) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;
    let count = diagram.elements.len() as f32;

    for (index, element) in diagram.elements.iter().enumerate() {
        let color = element_color(element, colors, palette);
        let i = index as f32;
        match element.shape {
            ShapeKind::Line => {
                let angle = i / count * std::f32::consts::TAU;
                let (ex, ey) = (
                    cx + angle.cos() * RADIAL_LENGTH,
                    cy + angle.sin() * RADIAL_LENGTH,
                );
                canvas.line(cx, cy, ex, ey, color, ELEMENT_STROKE_WIDTH);
                label(
                    canvas,
                    (cx + ex) / 2.0,
                    (cy + ey) / 2.0 - 10.0,
                    &element.label,
                    &palette.label_ink,
                );
            }
            ShapeKind::Circle => {
                let x = cx + cluster_offset(index, diagram.elements.len());
                let r = 50.0;
                canvas.stroke_circle(x, cy, r, color, ELEMENT_STROKE_WIDTH);
                label(canvas, x, cy + r + 20.0, &element.label, &palette.label_ink);
            }
            ShapeKind::Rectangle => {
                let y = cy - 30.0 + i * 30.0;
                canvas.stroke_rect(cx - 40.0, y, 80.0, 60.0, color, ELEMENT_STROKE_WIDTH);
                label(canvas, cx, cy + i * 30.0, &element.label, &palette.label_ink);
            }
            ShapeKind::Arrow => {
                let y = cy + i * 40.0 - 40.0;
                let (start_x, end_x) = (cx - 60.0, cx + 60.0);
                canvas.line(start_x, y, end_x, y, color, ELEMENT_STROKE_WIDTH);
                canvas.polygon(
                    &[
                        (end_x, y),
                        (end_x - 10.0, y - 5.0),
                        (end_x - 10.0, y + 5.0),
                    ],
                    color,
                );
                label(canvas, cx, y - 10.0, &element.label, &palette.label_ink);
            }
            ShapeKind::Point => {
                let x = cx + cluster_offset(index, diagram.elements.len());
                canvas.circle(x, cy, 5.0, color);
                label(canvas, x, cy - 15.0, &element.label, &palette.label_ink);
            }
            ShapeKind::Text => {
                if !element.label.is_empty() {
                    canvas.text(
                        cx,
                        cy + i * 25.0 - 30.0,
                        &element.label,
                        14.0,
                        color,
                        TextAnchor::Middle,
                        false,
                    );
                }
            }
            // No geometric reading for these; the label still lands in the
            // stacked text slot so the information is not lost.
            ShapeKind::Curve | ShapeKind::Other => {
                label(
                    canvas,
                    cx,
                    cy + i * 25.0 - 30.0,
                    &element.label,
                    &palette.muted_ink,
                );
            }
        }
    }
}

/// Unlabeled axes with a parabolic arc per `curve` element. Other shapes
/// carry no meaning on a graph sketch and are skipped.
fn draw_graph_sketch(
    canvas: &mut Canvas,
    diagram: &GenericDiagram,
    colors: &ColorMap,
    palette: &Palette,
) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;

    canvas.line(cx - GRAPH_AXIS_HALF, cy, cx + GRAPH_AXIS_HALF, cy, &palette.axis, 1.5);
    canvas.line(cx, cy - GRAPH_AXIS_HALF, cx, cy + GRAPH_AXIS_HALF, &palette.axis, 1.5);
    canvas.text(
        cx + GRAPH_AXIS_HALF + 10.0,
        cy + 5.0,
        "x",
        12.0,
        &palette.muted_ink,
        TextAnchor::Start,
        false,
    );
    canvas.text(
        cx - 5.0,
        cy - GRAPH_AXIS_HALF - 10.0,
        "y",
        12.0,
        &palette.muted_ink,
        TextAnchor::Start,
        false,
    );

    for element in &diagram.elements {
        if element.shape != ShapeKind::Curve {
            continue;
        }
        let color = element_color(element, colors, palette);
        canvas.quad_curve(
            cx - 100.0,
            cy,
            cx,
            cy - 80.0,
            cx + 100.0,
            cy,
            color,
            ELEMENT_STROKE_WIDTH,
        );
    }
}

/// Fixed three-face isometric box. The element list carries no usable
/// geometry for a solid, so only the palette shades it.
fn draw_isometric_box(canvas: &mut Canvas, palette: &Palette) {
    let cx = CANVAS_WIDTH / 2.0;
    let cy = CANVAS_HEIGHT / 2.0;
    let half = 40.0;
    let depth = 40.0;

    canvas.outlined_rect(
        cx - half,
        cy - half,
        half * 2.0,
        half * 2.0,
        &palette.face_light,
        &palette.label_ink,
        2.0,
    );
    canvas.outlined_polygon(
        &[
            (cx - half, cy - half),
            (cx - half + depth, cy - half - depth),
            (cx + half + depth, cy - half - depth),
            (cx + half, cy - half),
        ],
        &palette.face_mid,
        &palette.label_ink,
        2.0,
    );
    canvas.outlined_polygon(
        &[
            (cx + half, cy - half),
            (cx + half + depth, cy - half - depth),
            (cx + half + depth, cy + half - depth),
            (cx + half, cy + half),
        ],
        &palette.face_dark,
        &palette.label_ink,
        2.0,
    );
}

/// Offset for the n-th of `count` clustered elements, symmetric around zero
/// so a row of circles stays centered on the canvas.
fn cluster_offset(index: usize, count: usize) -> f32 {
    (index as f32 - (count as f32 - 1.0) / 2.0) * CLUSTER_SPACING
}

fn label(canvas: &mut Canvas, x: f32, y: f32, text: &str, fill: &str) {
    if text.is_empty() {
        return;
    }
    canvas.text(
        x,
        y,
        text,
        ELEMENT_LABEL_FONT_SIZE,
        fill,
        TextAnchor::Middle,
        false,
    );
}
