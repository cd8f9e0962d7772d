//! Function-graph rendering: coordinate frame, sampled curve, and the
//! calculus annotations (critical points, inflections, limits, asymptotes).

use crate::canvas::{Canvas, TextAnchor};
use crate::fonts::{TextMeasure, ellipsize};
use crate::palette::{ColorMap, Palette};

use super::sampler;
use super::transform::PlotFrame;
use super::types::{ExtremumKind, FunctionPlot};

const TICK_FONT_SIZE: f32 = 11.0;
const LABEL_FONT_SIZE: f32 = 12.0;
const CAPTION_FONT_SIZE: f32 = 15.0;
const MARKER_RADIUS: f32 = 5.0;

/// Most grid lines drawn across an axis before the grid goes sparse and
/// only labeled integers keep their lines.
const DENSE_GRID_LIMIT: f64 = 400.0;

/// Integer spans beyond this draw no grid at all; nothing would be legible.
const GRID_SPAN_LIMIT: f64 = 1.0e15;

pub fn render_function_plot(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    colors: &ColorMap,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
    samples: usize,
) {
    let frame = PlotFrame::new(plot.window);

    draw_grid(canvas, &frame, palette, measure);
    draw_axes(canvas, &frame, palette);
    draw_vertical_asymptotes(canvas, plot, &frame, colors, palette);
    draw_curve(canvas, plot, &frame, colors, palette, samples);
    draw_limit_point(canvas, plot, &frame, colors, palette);
    draw_critical_points(canvas, plot, &frame, colors, palette);
    draw_inflection_points(canvas, plot, &frame, colors, palette);
    draw_caption(canvas, plot, colors, palette, measure);
}

/// Grid lines and tick labels at integer coordinates, origin label skipped.
/// Labels thin out when integers pack tighter than their rendered width; a
/// sparse window keeps lines only where labels go, so element counts stay
/// bounded for any window.
fn draw_grid(
    canvas: &mut Canvas,
    frame: &PlotFrame,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
) {
    let window = frame.window();

    if let Some((first, last)) = integer_range(window.x_min, window.x_max) {
        let step = x_label_step(first, last, frame.x_scale(), measure);
        let draw = |canvas: &mut Canvas, v: f64, labeled: bool| {
            let px = frame.to_pixel_x(v);
            canvas.line(px, frame.top(), px, frame.bottom(), &palette.grid, 1.0);
            if labeled && v != 0.0 {
                canvas.text(
                    px,
                    frame.bottom() + 16.0,
                    &format!("{}", v as i64),
                    TICK_FONT_SIZE,
                    &palette.muted_ink,
                    TextAnchor::Middle,
                    false,
                );
            }
        };
        if last - first <= DENSE_GRID_LIMIT {
            let mut v = first;
            while v <= last {
                draw(canvas, v, is_step_multiple(v, step));
                v += 1.0;
            }
        } else {
            let mut v = (first / step).ceil() * step;
            while v <= last {
                draw(canvas, v, true);
                v += step;
            }
        }
    }

    if let Some((first, last)) = integer_range(window.y_min, window.y_max) {
        let step = y_label_step(frame.y_scale());
        let draw = |canvas: &mut Canvas, v: f64, labeled: bool| {
            let py = frame.to_pixel_y(v);
            canvas.line(frame.left(), py, frame.right(), py, &palette.grid, 1.0);
            if labeled && v != 0.0 {
                canvas.text(
                    frame.left() - 6.0,
                    py + 4.0,
                    &format!("{}", v as i64),
                    TICK_FONT_SIZE,
                    &palette.muted_ink,
                    TextAnchor::End,
                    false,
                );
            }
        };
        if last - first <= DENSE_GRID_LIMIT {
            let mut v = first;
            while v <= last {
                draw(canvas, v, is_step_multiple(v, step));
                v += 1.0;
            }
        } else {
            let mut v = (first / step).ceil() * step;
            while v <= last {
                draw(canvas, v, true);
                v += step;
            }
        }
    }
}

fn integer_range(min: f64, max: f64) -> Option<(f64, f64)> {
    let first = min.ceil();
    let last = max.floor();
    if first <= last && last - first <= GRID_SPAN_LIMIT {
        Some((first, last))
    } else {
        None
    }
}

/// Label every k-th integer, where k makes the widest endpoint label fit.
fn x_label_step(first: f64, last: f64, px_per_unit: f64, measure: &mut dyn TextMeasure) -> f64 {
    let lo = measure.text_width(&format!("{}", first as i64), TICK_FONT_SIZE, false);
    let hi = measure.text_width(&format!("{}", last as i64), TICK_FONT_SIZE, false);
    let needed = f64::from(lo.max(hi)) + 6.0;
    if px_per_unit >= needed || px_per_unit <= 0.0 {
        1.0
    } else {
        (needed / px_per_unit).ceil()
    }
}

fn y_label_step(px_per_unit: f64) -> f64 {
    let needed = 14.0;
    if px_per_unit >= needed || px_per_unit <= 0.0 {
        1.0
    } else {
        (needed / px_per_unit).ceil()
    }
}

fn is_step_multiple(v: f64, step: f64) -> bool {
    step <= 1.0 || (v / step).fract() == 0.0
}

fn draw_axes(canvas: &mut Canvas, frame: &PlotFrame, palette: &Palette) {
    let window = frame.window();
    if window.spans_y(0.0) {
        let py = frame.to_pixel_y(0.0);
        canvas.line(frame.left(), py, frame.right(), py, &palette.axis, 2.0);
    }
    if window.spans_x(0.0) {
        let px = frame.to_pixel_x(0.0);
        canvas.line(px, frame.top(), px, frame.bottom(), &palette.axis, 2.0);
    }
}

fn draw_vertical_asymptotes(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    frame: &PlotFrame,
    colors: &ColorMap,
    palette: &Palette,
) {
    let color = colors.get_or("asymptote", &palette.asymptote);
    for asymptote in &plot.asymptotes {
        let px = frame.to_pixel_x(asymptote.x);
        canvas.dashed_line(px, frame.top(), px, frame.bottom(), color, 1.5, (4.0, 4.0));
    }
}

fn draw_curve(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    frame: &PlotFrame,
    colors: &ColorMap,
    palette: &Palette,
    samples: usize,
) {
    let Some(source) = plot.function.as_deref() else {
        return;
    };
    let color = colors.get_or("function", &palette.function);
    for polyline in sampler::sample_function(source, frame.window(), samples) {
        let points: Vec<(f32, f32)> = polyline
            .iter()
            .map(|&(x, y)| frame.to_pixel(x, y))
            .collect();
        canvas.polyline(&points, color, 2.0);
    }
}

fn draw_critical_points(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    frame: &PlotFrame,
    colors: &ColorMap,
    palette: &Palette,
) {
    let color = colors.get_or("criticalPoint", &palette.critical_point);
    for point in &plot.critical_points {
        let (px, py) = frame.to_pixel(point.x, point.y);
        canvas.ringed_circle(px, py, MARKER_RADIUS, color, &palette.background, 2.0);

        let label = match point.kind {
            ExtremumKind::Max => format!("({}, {}) max", point.x, point.y),
            ExtremumKind::Min => format!("({}, {}) min", point.x, point.y),
            ExtremumKind::Neither => format!("({}, {})", point.x, point.y),
        };
        canvas.text(
            px + 10.0,
            py - 10.0,
            &label,
            LABEL_FONT_SIZE,
            color,
            TextAnchor::Start,
            false,
        );
    }
}

fn draw_inflection_points(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    frame: &PlotFrame,
    colors: &ColorMap,
    palette: &Palette,
) {
    let color = colors.get_or("inflectionPoint", &palette.inflection_point);
    for point in &plot.inflection_points {
        let (px, py) = frame.to_pixel(point.x, point.y);
        let r = MARKER_RADIUS;
        canvas.outlined_rect(px - r, py - r, 2.0 * r, 2.0 * r, color, &palette.background, 2.0);
        canvas.text(
            px + 10.0,
            py - 10.0,
            &format!("({}, {}) inflection", point.x, point.y),
            LABEL_FONT_SIZE,
            color,
            TextAnchor::Start,
            false,
        );
    }
}

/// Hollow and solid limit markers share geometry; only fill and stroke swap.
fn draw_limit_point(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    frame: &PlotFrame,
    colors: &ColorMap,
    palette: &Palette,
) {
    let Some(limit) = &plot.limit_point else {
        return;
    };
    let color = colors.get_or("limitPoint", &palette.limit_point);
    let (px, py) = frame.to_pixel(limit.x, limit.y);

    if limit.approaching_infinity {
        let level = limit.horizontal_asymptote.unwrap_or(limit.y);
        let line_y = frame.to_pixel_y(level);
        let asymptote_color = colors.get_or("asymptote", &palette.asymptote);
        canvas.dashed_line(
            frame.left(),
            line_y,
            frame.right(),
            line_y,
            asymptote_color,
            1.5,
            (4.0, 4.0),
        );
        canvas.text(
            frame.right() - 5.0,
            line_y - 6.0,
            &format!("y = {}", level),
            TICK_FONT_SIZE,
            asymptote_color,
            TextAnchor::End,
            false,
        );
    }

    if limit.is_hole {
        canvas.ringed_circle(px, py, MARKER_RADIUS, &palette.background, color, 2.0);
    } else {
        canvas.ringed_circle(px, py, MARKER_RADIUS, color, &palette.background, 2.0);
    }

    let label = if limit.approaching_infinity {
        format!("limit = {}", limit.y)
    } else {
        format!("({}, {})", limit.x, limit.y)
    };
    canvas.text(
        px + 10.0,
        py - 10.0,
        &label,
        LABEL_FONT_SIZE,
        color,
        TextAnchor::Start,
        false,
    );
}

/// Italic `f(x) = ...` caption with multiplication stars stripped for
/// readability, shortened to the canvas width.
fn draw_caption(
    canvas: &mut Canvas,
    plot: &FunctionPlot,
    colors: &ColorMap,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
) {
    let Some(source) = plot.function.as_deref() else {
        return;
    };
    let pretty = source.replace("**", "^").replace('*', "");
    let caption = format!("f(x) = {}", pretty.trim());
    let caption = ellipsize(measure, &caption, CAPTION_FONT_SIZE, true, canvas.width() - 40.0);
    canvas.text(
        canvas.width() / 2.0,
        30.0,
        &caption,
        CAPTION_FONT_SIZE,
        colors.get_or("function", &palette.function),
        TextAnchor::Middle,
        true,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::FixedMeasure;
    use crate::diagram::types::{CriticalPoint, DomainWindow, LimitPoint, VerticalAsymptote};
    use crate::diagram::{CANVAS_HEIGHT, CANVAS_WIDTH};

    fn render(plot: &FunctionPlot, colors: &ColorMap) -> String {
        let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
        let palette = Palette::default();
        let mut measure = FixedMeasure;
        render_function_plot(&mut canvas, plot, colors, &palette, &mut measure, 500);
        canvas.into_svg(&palette.background)
    }

    fn parabola_plot() -> FunctionPlot {
        FunctionPlot {
            function: Some("x^2".to_string()),
            window: DomainWindow::new(-5.0, 5.0, -5.0, 30.0),
            critical_points: vec![CriticalPoint {
                x: 0.0,
                y: 0.0,
                kind: ExtremumKind::Min,
            }],
            ..FunctionPlot::default()
        }
    }

    #[test]
    fn test_end_to_end_parabola_with_min() {
        let svg = render(&parabola_plot(), &ColorMap::default());
        assert!(svg.contains("<polyline"));
        assert!(svg.contains("(0, 0) min"));
        assert!(svg.contains("f(x) = x^2"));
    }

    #[test]
    fn test_axes_only_when_zero_in_window() {
        let mut plot = parabola_plot();
        let with_axes = render(&plot, &ColorMap::default());
        assert!(with_axes.contains(r##"stroke="#d4d4d4""##));

        plot.window = DomainWindow::new(1.0, 5.0, 2.0, 8.0);
        plot.critical_points.clear();
        let without_axes = render(&plot, &ColorMap::default());
        assert!(!without_axes.contains(r##"stroke="#d4d4d4""##));
    }

    #[test]
    fn test_origin_tick_label_is_skipped() {
        let svg = render(&parabola_plot(), &ColorMap::default());
        assert!(!svg.contains(">0</text>"));
        assert!(svg.contains(">1</text>"));
    }

    #[test]
    fn test_missing_function_still_draws_annotations() {
        let plot = FunctionPlot {
            function: None,
            window: DomainWindow::new(-5.0, 5.0, -5.0, 30.0),
            critical_points: vec![CriticalPoint {
                x: 2.0,
                y: -3.0,
                kind: ExtremumKind::Max,
            }],
            ..FunctionPlot::default()
        };
        let svg = render(&plot, &ColorMap::default());
        assert!(!svg.contains("<polyline"));
        assert!(svg.contains("(2, -3) max"));
        assert!(!svg.contains("f(x) ="));
    }

    #[test]
    fn test_unparseable_function_degrades_to_no_curve() {
        let plot = FunctionPlot {
            function: Some("x !== 0 ? 1 : 2".to_string()),
            window: DomainWindow::default(),
            ..FunctionPlot::default()
        };
        let svg = render(&plot, &ColorMap::default());
        assert!(!svg.contains("<polyline"));
    }

    #[test]
    fn test_hole_and_solid_markers_share_position() {
        fn limit_plot(is_hole: bool) -> FunctionPlot {
            FunctionPlot {
                window: DomainWindow::new(-5.0, 5.0, -5.0, 5.0),
                limit_point: Some(LimitPoint {
                    x: 2.0,
                    y: 1.0,
                    approaching_infinity: false,
                    is_hole,
                    horizontal_asymptote: None,
                }),
                ..FunctionPlot::default()
            }
        }

        fn marker_position(svg: &str) -> String {
            let start = svg.find(r#"r="5.00""#).expect("marker present");
            let element_start = svg[..start].rfind("<circle").expect("circle element");
            svg[element_start..start].to_string()
        }

        let hollow = render(&limit_plot(true), &ColorMap::default());
        let solid = render(&limit_plot(false), &ColorMap::default());
        assert_eq!(marker_position(&hollow), marker_position(&solid));
        assert!(hollow.contains(r##"fill="#ffffff" stroke="#ef4444""##));
        assert!(solid.contains(r##"fill="#ef4444" stroke="#ffffff""##));
    }

    #[test]
    fn test_infinity_limit_draws_horizontal_asymptote() {
        let plot = FunctionPlot {
            window: DomainWindow::new(-5.0, 5.0, -5.0, 5.0),
            limit_point: Some(LimitPoint {
                x: 0.0,
                y: 2.0,
                approaching_infinity: true,
                is_hole: false,
                horizontal_asymptote: Some(2.0),
            }),
            ..FunctionPlot::default()
        };
        let svg = render(&plot, &ColorMap::default());
        assert!(svg.contains("limit = 2"));
        assert!(svg.contains("y = 2"));
        assert!(svg.contains(r#"stroke-dasharray="4,4""#));
    }

    #[test]
    fn test_vertical_asymptote_is_dashed_full_height() {
        let plot = FunctionPlot {
            window: DomainWindow::new(-2.0, 2.0, -5.0, 5.0),
            asymptotes: vec![VerticalAsymptote { x: 1.0 }],
            ..FunctionPlot::default()
        };
        let svg = render(&plot, &ColorMap::default());
        assert!(svg.contains(
            r##"<line x1="350.00" y1="50.00" x2="350.00" y2="350.00" stroke="#9ca3af" stroke-width="1.5" stroke-dasharray="4,4""##
        ));
    }

    #[test]
    fn test_caller_colors_override_roles() {
        let mut map = std::collections::HashMap::new();
        map.insert("criticalPoint".to_string(), "#123456".to_string());
        let svg = render(&parabola_plot(), &ColorMap::new(map));
        assert!(svg.contains("#123456"));
        assert!(!svg.contains(r##"fill="#ef4444""##));
    }

    #[test]
    fn test_caption_strips_multiplication() {
        let plot = FunctionPlot {
            function: Some("x^2 - 4*x + 1".to_string()),
            window: DomainWindow::new(-1.0, 5.0, -4.0, 6.0),
            ..FunctionPlot::default()
        };
        let svg = render(&plot, &ColorMap::default());
        assert!(svg.contains("f(x) = x^2 - 4x + 1"));
    }

    #[test]
    fn test_wide_window_decimates_labels_but_keeps_grid() {
        let plot = FunctionPlot {
            function: None,
            window: DomainWindow::new(0.0, 100.0, 0.0, 3000.0),
            ..FunctionPlot::default()
        };
        // x packs 4 px per integer; measured "100" forces a label step of 7.
        let svg = render(&plot, &ColorMap::default());
        assert!(!svg.contains(">1</text>"));
        assert!(svg.contains(">98</text>"));
        let grid_lines = svg.matches(r##"stroke="#e5e5e5""##).count();
        assert!(grid_lines > 100, "expected dense x grid, got {}", grid_lines);
    }
}
