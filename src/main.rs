use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use resvg::usvg;
use tiny_skia::{Pixmap, Transform};

use mathwiz::diagram::render_diagram;
use mathwiz::diagram::sampler::DEFAULT_SAMPLES;
use mathwiz::fonts::CosmicTextMeasure;
use mathwiz::palette::Palette;
use mathwiz::problem::{self, ProblemDoc};

/// Render calculus-tutor diagram descriptors to SVG, PNG or PDF
#[derive(Parser, Debug)]
#[command(name = "mathwiz")]
#[command(version)]
#[command(about = "Render calculus problem diagrams to SVG, PNG or PDF", long_about = None)]
struct Args {
    /// Input problem JSON file (use "-" for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "completions")]
    input: Option<PathBuf>,

    /// Output file path (extension determines format: .svg, .png or .pdf)
    #[arg(short, long, value_name = "OUTPUT", required_unless_present_any = ["completions", "dump_steps"])]
    output: Option<PathBuf>,

    /// Built-in palette name or path to a palette file (TOML or YAML)
    #[arg(short, long, value_name = "PALETTE")]
    palette: Option<String>,

    /// Curve subdivision count for function plots
    #[arg(long, default_value_t = DEFAULT_SAMPLES)]
    samples: usize,

    /// Raster scale multiplier for PNG output (e.g. 2.0 for sharper output)
    #[arg(long, default_value_t = 1.0)]
    png_scale: f32,

    /// Print the document's solution steps and answer to stdout
    #[arg(long)]
    dump_steps: bool,

    /// Generate shell completions and exit
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,
}

fn main() -> Result<(), String> {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        let mut cmd = Args::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    let palette = load_palette(args.palette.as_deref())?;

    let input = args.input.as_ref().ok_or("No input file given")?;
    let json = if input.to_str() == Some("-") {
        let mut buffer = String::new();
        std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        buffer
    } else {
        std::fs::read_to_string(input).map_err(|e| format!("Failed to read input file: {}", e))?
    };

    let doc = problem::parse_document(&json);

    if args.dump_steps {
        dump_steps(&doc).map_err(|e| format!("Failed to write steps: {}", e))?;
        if args.output.is_none() {
            return Ok(());
        }
    }

    let mut measure = CosmicTextMeasure::new()?;
    let svg = render_diagram(
        &doc.diagram(),
        &doc.colors(),
        &palette,
        &mut measure,
        args.samples,
    );

    let output = args.output.as_ref().ok_or("No output file given")?;
    let output_ext = output
        .extension()
        .and_then(|e| e.to_str())
        .ok_or("Output file has no extension")?
        .to_ascii_lowercase();

    match output_ext.as_str() {
        "svg" => {
            std::fs::write(output, svg).map_err(|e| format!("Failed to write SVG: {}", e))?;
            eprintln!("SVG saved to: {}", output.display());
        }
        "png" => {
            let png_data = svg_to_png(&svg, args.png_scale)?;
            std::fs::write(output, png_data).map_err(|e| format!("Failed to write PNG: {}", e))?;
            eprintln!("PNG saved to: {}", output.display());
        }
        "pdf" => {
            let pdf_data = svg_to_pdf(&svg)?;
            std::fs::write(output, pdf_data).map_err(|e| format!("Failed to write PDF: {}", e))?;
            eprintln!("PDF saved to: {}", output.display());
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

        // Try TOML first, then YAML.
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

fn dump_steps(doc: &ProblemDoc) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if !doc.title.is_empty() {
        writeln!(out, "# {}", doc.title)?;
    }
    if !doc.problem.is_empty() {
        writeln!(out, "{}", doc.problem)?;
        writeln!(out)?;
    }
    for (index, step) in doc.steps.iter().enumerate() {
        writeln!(out, "{}. {}", index + 1, step.title)?;
        if !step.body.is_empty() {
            writeln!(out, "   {}", step.body)?;
        }
        if let Some(equation) = &step.equation {
            writeln!(out, "   {}", equation)?;
        }
        if let Some(concept) = &step.concept {
            writeln!(out, "   Why: {}", concept)?;
        }
        if let Some(mistake) = &step.mistake {
            writeln!(out, "   Watch out: {}", mistake)?;
        }
    }
    if !doc.answer.is_empty() {
        writeln!(out)?;
        writeln!(out, "Answer: {}", doc.answer)?;
    }
    Ok(())
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

    // Keep text as paths for broader viewer/font compatibility.
    // This avoids PDFs with missing text when font embedding fails.
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
