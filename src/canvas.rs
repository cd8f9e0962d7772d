//! Fixed-size 2D drawing surface that accumulates SVG draw calls.
//!
//! Every renderer in this crate draws through [`Canvas`]; the result is a
//! single `<svg>` document that the output layer rasterizes or embeds as-is.

/// Horizontal alignment of a text run relative to its x coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

impl TextAnchor {
    fn attr(self) -> &'static str {
        match self {
            TextAnchor::Start => "",
            TextAnchor::Middle => " text-anchor=\"middle\"",
            TextAnchor::End => " text-anchor=\"end\"",
        }
    }
}

/// Accumulates SVG fragments for a logical-pixel canvas of fixed size.
pub struct Canvas {
    width: f32,
    height: f32,
    body: String,
}

impl Canvas {
    pub fn new(width: f32, height: f32) -> Self {
        Canvas {
            width,
            height,
            body: String::new(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: &str, width: f32) {
        self.body.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.1}" />"#,
            x1,
            y1,
            x2,
            y2,
            escape_text(stroke),
            width
        ));
    }

    /// Dashed line with the given on/off pattern in pixels.
    pub fn dashed_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &str,
        width: f32,
        dash: (f32, f32),
    ) {
        self.body.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.1}" stroke-dasharray="{:.0},{:.0}" />"#,
            x1,
            y1,
            x2,
            y2,
            escape_text(stroke),
            width,
            dash.0,
            dash.1
        ));
    }

    pub fn faded_line(
        &mut self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        stroke: &str,
        width: f32,
        opacity: f32,
    ) {
        self.body.push_str(&format!(
            r#"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}" stroke-width="{:.1}" stroke-opacity="{:.2}" />"#,
            x1,
            y1,
            x2,
            y2,
            escape_text(stroke),
            width,
            opacity
        ));
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32, fill: &str) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" />"#,
            cx,
            cy,
            r,
            escape_text(fill)
        ));
    }

    /// Filled circle with an outline ring. A hollow marker is the same call
    /// with the page background as fill and the accent color as stroke.
    pub fn ringed_circle(
        &mut self,
        cx: f32,
        cy: f32,
        r: f32,
        fill: &str,
        stroke: &str,
        stroke_width: f32,
    ) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
            cx,
            cy,
            r,
            escape_text(fill),
            escape_text(stroke),
            stroke_width
        ));
    }

    pub fn stroke_circle(&mut self, cx: f32, cy: f32, r: f32, stroke: &str, stroke_width: f32) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="none" stroke="{}" stroke-width="{:.1}" />"#,
            cx,
            cy,
            r,
            escape_text(stroke),
            stroke_width
        ));
    }

    pub fn faded_circle(&mut self, cx: f32, cy: f32, r: f32, fill: &str, opacity: f32) {
        self.body.push_str(&format!(
            r#"<circle cx="{:.2}" cy="{:.2}" r="{:.2}" fill="{}" fill-opacity="{:.2}" />"#,
            cx,
            cy,
            r,
            escape_text(fill),
            opacity
        ));
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, fill: &str) {
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" />"#,
            x,
            y,
            w,
            h,
            escape_text(fill)
        ));
    }

    pub fn outlined_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        fill: &str,
        stroke: &str,
        stroke_width: f32,
    ) {
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
            x,
            y,
            w,
            h,
            escape_text(fill),
            escape_text(stroke),
            stroke_width
        ));
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, stroke: &str, stroke_width: f32) {
        self.body.push_str(&format!(
            r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="none" stroke="{}" stroke-width="{:.1}" />"#,
            x,
            y,
            w,
            h,
            escape_text(stroke),
            stroke_width
        ));
    }

    pub fn polygon(&mut self, points: &[(f32, f32)], fill: &str) {
        self.body.push_str(&format!(
            r#"<polygon points="{}" fill="{}" />"#,
            format_points(points),
            escape_text(fill)
        ));
    }

    pub fn outlined_polygon(
        &mut self,
        points: &[(f32, f32)],
        fill: &str,
        stroke: &str,
        stroke_width: f32,
    ) {
        self.body.push_str(&format!(
            r#"<polygon points="{}" fill="{}" stroke="{}" stroke-width="{:.1}" />"#,
            format_points(points),
            escape_text(fill),
            escape_text(stroke),
            stroke_width
        ));
    }

    /// Open stroked path through the given points, with round joins so dense
    /// curve samples read as one smooth stroke.
    pub fn polyline(&mut self, points: &[(f32, f32)], stroke: &str, width: f32) {
        if points.len() < 2 {
            return;
        }
        self.body.push_str(&format!(
            r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.1}" stroke-linecap="round" stroke-linejoin="round" />"#,
            format_points(points),
            escape_text(stroke),
            width
        ));
    }

    /// Quadratic arc from (x1, y1) to (x2, y2) with control point (cx, cy).
    pub fn quad_curve(
        &mut self,
        x1: f32,
        y1: f32,
        cx: f32,
        cy: f32,
        x2: f32,
        y2: f32,
        stroke: &str,
        width: f32,
    ) {
        self.body.push_str(&format!(
            r#"<path d="M {:.2} {:.2} Q {:.2} {:.2} {:.2} {:.2}" fill="none" stroke="{}" stroke-width="{:.1}" />"#,
            x1,
            y1,
            cx,
            cy,
            x2,
            y2,
            escape_text(stroke),
            width
        ));
    }

    pub fn text(
        &mut self,
        x: f32,
        y: f32,
        text: &str,
        size: f32,
        fill: &str,
        anchor: TextAnchor,
        italic: bool,
    ) {
        let style_attr = if italic { " font-style=\"italic\"" } else { "" };
        self.body.push_str(&format!(
            r#"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="{:.1}" fill="{}"{}{}>{}</text>"#,
            x,
            y,
            size,
            escape_text(fill),
            anchor.attr(),
            style_attr,
            escape_text(text),
        ));
    }

    /// Wrap the accumulated body into a standalone SVG document with a solid
    /// background rect.
    pub fn into_svg(self, background: &str) -> String {
        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {} {}" width="{}" height="{}"><rect width="100%" height="100%" fill="{}" />{}</svg>"#,
            self.width,
            self.height,
            self.width,
            self.height,
            escape_text(background),
            self.body
        )
    }

    #[cfg(test)]
    pub(crate) fn body(&self) -> &str {
        &self.body
    }
}

fn format_points(points: &[(f32, f32)]) -> String {
    let mut out = String::with_capacity(points.len() * 14);
    for (i, (x, y)) in points.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{:.2},{:.2}", x, y));
    }
    out
}

/// XML 1.0 forbids most control characters; labels arrive from model output
/// and can contain anything.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Drop invalid chars and escape for SVG in one pass. Used for both text
/// content and attribute values; color strings come from the caller's JSON
/// and can contain anything a label can.
pub fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if !is_valid_xml_char(c) {
            continue;
        }
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
