//! Diagram rendering core. A validated [`Diagram`] descriptor goes in and a
//! standalone SVG document comes out; malformed or partial input degrades to
//! a simpler drawing rather than an error.

pub mod expr;
pub mod generic;
pub mod plot;
pub mod sampler;
pub mod scenario;
pub mod transform;
pub mod types;

use crate::canvas::Canvas;
use crate::fonts::TextMeasure;
use crate::palette::{ColorMap, Palette};

pub use types::Diagram;

/// Logical canvas size shared by every diagram kind, in CSS pixels.
pub const CANVAS_WIDTH: f32 = 500.0;
pub const CANVAS_HEIGHT: f32 = 400.0;

/// Render a diagram to a complete SVG document.
///
/// `samples` is the curve subdivision count for function plots; other
/// diagram kinds ignore it.
pub fn render_diagram(
    diagram: &Diagram,
    colors: &ColorMap,
    palette: &Palette,
    measure: &mut dyn TextMeasure,
    samples: usize,
) -> String {
    let mut canvas = Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT);
    match diagram {
        Diagram::FunctionPlot(plot) => {
            plot::render_function_plot(&mut canvas, plot, colors, palette, measure, samples);
        }
        Diagram::Scenario(kind) => scenario::render_scenario(&mut canvas, *kind, colors, palette),
        Diagram::Generic(generic) => {
            generic::render_generic(&mut canvas, generic, colors, palette, measure);
        }
        Diagram::Placeholder => scenario::render_placeholder(&mut canvas, palette),
    }
    canvas.into_svg(&palette.background)
}
