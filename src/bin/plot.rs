use clap::Parser;
use resvg::usvg;
use std::path::{Path, PathBuf};
use tiny_skia::{Pixmap, Transform};

use mathwiz::diagram::render_diagram;
use mathwiz::diagram::sampler::DEFAULT_SAMPLES;
use mathwiz::diagram::types::{Diagram, DomainWindow, FunctionPlot};
use mathwiz::fonts::CosmicTextMeasure;
use mathwiz::palette::{ColorMap, Palette};

/// Standalone function plotter (SVG/PNG/PDF)
#[derive(Parser, Debug)]
#[command(name = "mathwiz-plot")]
#[command(version)]
#[command(about = "Plot a single function of x to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Expression in x, e.g. "x^2 - 4*x + 1" or "Math.sin(x)"
    #[arg(value_name = "EXPR")]
    expression: String,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", default_value = "plot.svg")]
    output: PathBuf,

    /// Domain as "min,max"
    #[arg(long, value_name = "A,B", default_value = "-10,10", value_parser = parse_range)]
    x_range: [f64; 2],

    /// Value window as "min,max"
    #[arg(long, value_name = "A,B", default_value = "-10,10", value_parser = parse_range)]
    y_range: [f64; 2],

    /// Built-in palette name or path to a palette file (TOML or YAML)
    #[arg(short, long, value_name = "PALETTE")]
    palette: Option<String>,

    /// Curve subdivision count
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Raster scale multiplier for PNG output
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,
}

fn parse_range(s: &str) -> Result<[f64; 2], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [lo, hi] = parts.as_slice() else {
        return Err(format!("Expected \"min,max\", got \"{}\"", s));
    };
    let lo: f64 = lo
        .parse()
        .map_err(|_| format!("Invalid number: {}", lo))?;
    let hi: f64 = hi
        .parse()
        .map_err(|_| format!("Invalid number: {}", hi))?;
    if !(lo.is_finite() && hi.is_finite() && lo < hi) {
        return Err(format!("Range must be finite with min < max: {}", s));
    }
    Ok([lo, hi])
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    let palette = load_palette(args.palette.as_deref())?;

    let plot = FunctionPlot {
        function: Some(args.expression.clone()),
        window: DomainWindow::new(
            args.x_range[0],
            args.x_range[1],
            args.y_range[0],
            args.y_range[1],
        ),
        ..FunctionPlot::default()
    };

    let mut measure = CosmicTextMeasure::new()?;
    let svg = render_diagram(
        &Diagram::FunctionPlot(plot),
        &ColorMap::default(),
        &palette,
        &mut measure,
        args.samples,
    );

    let output_ext = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(&args.output, &svg)
                .map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", args.output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(&args.output, png_data)
                .map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", args.output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(&args.output, pdf_data)
                .map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", args.output.display());
        }
        _ => {
            return Err(format!(
                "Unsupported output format: .{} (use .svg, .png or .pdf)",
                output_ext
            ));
        }
    }

    Ok(())
}

fn load_palette(choice: Option<&str>) -> Result<Palette, String> {
    let Some(choice) = choice else {
        return Ok(Palette::default());
    };

    let path = Path::new(choice);
    if path.exists() && path.is_file() {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read palette file: {}", e))?;

        if let Ok(palette) = Palette::from_toml(&content) {
            Ok(palette)
        } else if let Ok(palette) = Palette::from_yaml(&content) {
            Ok(palette)
        } else {
            Err("Failed to parse palette file as TOML or YAML".to_string())
        }
    } else {
        Palette::from_builtin(choice)
    }
}

fn svg_to_png(svg: &str, scale: f32) -> Result<Vec<u8>, String> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(format!("Invalid --png-scale value: {}", scale));
    }

    let mut opts = usvg::Options::default();
    {
        let fontdb = opts.fontdb_mut();
        fontdb.load_system_fonts();
        configure_font_fallbacks(fontdb);
    }

    let tree =
        usvg::Tree::from_str(svg, &opts).map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let svg_width = (tree.size().width() * scale).ceil() as u32;
    let svg_height = (tree.size().height() * scale).ceil() as u32;

    let mut pixmap = Pixmap::new(svg_width, svg_height).ok_or("Failed to create pixmap")?;
    let transform = Transform::from_scale(scale, scale);

    resvg::render(&tree, transform, &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| format!("Failed to encode PNG: {}", e))
}

fn svg_to_pdf(svg: &str) -> Result<Vec<u8>, String> {
    use svg2pdf::usvg::fontdb;

    let mut fontdb = fontdb::Database::new();
    fontdb.load_system_fonts();
    configure_font_fallbacks_svg2pdf(&mut fontdb);

    let mut opts = svg2pdf::usvg::Options::default();
    opts.fontdb = std::sync::Arc::new(fontdb);

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opts)
        .map_err(|e| format!("Failed to parse SVG: {}", e))?;

    let mut options = svg2pdf::ConversionOptions::default();
    options.embed_text = false;
    let page_options = svg2pdf::PageOptions::default();

    svg2pdf::to_pdf(&tree, options, page_options)
        .map_err(|e| format!("Failed to convert SVG to PDF: {}", e))
}

fn configure_font_fallbacks(fontdb: &mut usvg::fontdb::Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in fontdb.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
        fontdb.set_sans_serif_family(family);
    }
}

fn configure_font_fallbacks_svg2pdf(fontdb: &mut svg2pdf::usvg::fontdb::Database) {
    let mut sans_family: Option<String> = None;
    let mut first_family: Option<String> = None;

    for face in fontdb.faces() {
        for (family, _) in &face.families {
            if first_family.is_none() {
                first_family = Some(family.clone());
            }
            if sans_family.is_none() && family.to_ascii_lowercase().contains("sans") {
                sans_family = Some(family.clone());
            }
        }
    }

    if let Some(family) = sans_family.as_deref().or(first_family.as_deref()) {
        fontdb.set_sans_serif_family(family);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_parses_min_max() {
        assert_eq!(parse_range("-2, 6").unwrap(), [-2.0, 6.0]);
        assert_eq!(parse_range("0,1.5").unwrap(), [0.0, 1.5]);
    }

    #[test]
    fn test_range_rejects_bad_input() {
        assert!(parse_range("5").is_err());
        assert!(parse_range("1,2,3").is_err());
        assert!(parse_range("6,-2").is_err());
        assert!(parse_range("a,b").is_err());
    }
}
