use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, Shaping, Style};
use lru::LruCache;

const MEASURE_CACHE_CAP: usize = 4096;

#[derive(Hash, PartialEq, Eq, Clone)]
struct MeasureKey {
    text: String,
    font_size_bits: u32,
    is_italic: bool,
}

/// Width of a single-line label as it will render on the canvas. Used to
/// decimate tick labels and to ellipsize captions; layout never depends on
/// it, so a zero-width result (no fonts installed) only means no trimming.
pub trait TextMeasure {
    fn text_width(&mut self, text: &str, font_size: f32, is_italic: bool) -> f32;
}

pub struct CosmicTextMeasure {
    font_system: FontSystem,
    cache: LruCache<MeasureKey, f32>,
}

impl CosmicTextMeasure {
    pub fn new() -> Result<Self, String> {
        let cap = NonZeroUsize::new(MEASURE_CACHE_CAP).ok_or("measure cache capacity is zero")?;
        Ok(Self {
            font_system: FontSystem::new(),
            cache: LruCache::new(cap),
        })
    }
}

impl TextMeasure for CosmicTextMeasure {
    fn text_width(&mut self, text: &str, font_size: f32, is_italic: bool) -> f32 {
        let key = MeasureKey {
            text: text.to_string(),
            font_size_bits: font_size.to_bits(),
            is_italic,
        };

        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let mut buffer = Buffer::new(
            &mut self.font_system,
            Metrics {
                font_size,
                line_height: font_size * 1.2,
            },
        );
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().style(if is_italic {
            Style::Italic
        } else {
            Style::Normal
        });
        buffer.set_text(&mut self.font_system, text, &attrs, Shaping::Advanced, None);

        let mut width: f32 = 0.0;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
        }

        self.cache.put(key, width);
        width
    }
}

impl Default for CosmicTextMeasure {
    fn default() -> Self {
        Self::new().expect("Failed to initialize font system")
    }
}

/// Shorten `text` until it fits `max_width`, appending an ellipsis. Returns
/// the text unchanged when it already fits (including when measurement
/// reports zero widths).
pub fn ellipsize(
    measure: &mut dyn TextMeasure,
    text: &str,
    font_size: f32,
    is_italic: bool,
    max_width: f32,
) -> String {
    if measure.text_width(text, font_size, is_italic) <= max_width {
        return text.to_string();
    }
    let chars: Vec<char> = text.chars().collect();
    for keep in (1..chars.len()).rev() {
        let prefix: String = chars[..keep].iter().collect();
        let candidate = format!("{}…", prefix.trim_end());
        if measure.text_width(&candidate, font_size, is_italic) <= max_width {
            return candidate;
        }
    }
    "…".to_string()
}

/// Deterministic measure for tests: every char advances a fixed fraction of
/// the font size, independent of installed fonts.
#[cfg(test)]
pub struct FixedMeasure;

#[cfg(test)]
impl TextMeasure for FixedMeasure {
    fn text_width(&mut self, text: &str, font_size: f32, _is_italic: bool) -> f32 {
        text.chars().count() as f32 * font_size * 0.6
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ellipsize_keeps_fitting_text() {
        let mut measure = FixedMeasure;
        assert_eq!(ellipsize(&mut measure, "f(x)", 13.0, false, 500.0), "f(x)");
    }

    #[test]
    fn test_ellipsize_trims_to_width() {
        let mut measure = FixedMeasure;
        let out = ellipsize(&mut measure, "a very long caption indeed", 10.0, false, 60.0);
        assert!(out.ends_with('…'));
        assert!(measure.text_width(&out, 10.0, false) <= 60.0);
    }

    #[test]
    fn test_ellipsize_floor_is_single_ellipsis() {
        let mut measure = FixedMeasure;
        assert_eq!(ellipsize(&mut measure, "abcdef", 10.0, false, 0.5), "…");
    }

    #[test]
    fn test_cosmic_measure_is_cached_and_finite() {
        let mut measure = CosmicTextMeasure::default();
        let first = measure.text_width("(0, 0) min", 13.0, false);
        let second = measure.text_width("(0, 0) min", 13.0, false);
        assert_eq!(first, second);
        assert!(first.is_finite());
    }
}
