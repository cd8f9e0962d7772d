use super::types::DomainWindow;
use super::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Blank border around the plot area, in logical pixels.
pub const PLOT_PADDING: f64 = 50.0;

/// Affine map between a domain window and the padded plot area. Total over
/// all real inputs; out-of-window points extrapolate linearly and callers
/// decide whether to cull.
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame {
    width: f64,
    height: f64,
    padding: f64,
    window: DomainWindow,
}

impl PlotFrame {
    pub fn new(window: DomainWindow) -> Self {
        PlotFrame {
            width: f64::from(CANVAS_WIDTH),
            height: f64::from(CANVAS_HEIGHT),
            padding: PLOT_PADDING,
            window,
        }
    }

    pub fn window(&self) -> &DomainWindow {
        &self.window
    }

    pub fn to_pixel_x(&self, x: f64) -> f32 {
        let span = self.window.x_max - self.window.x_min;
        (self.padding + (x - self.window.x_min) / span * (self.width - 2.0 * self.padding)) as f32
    }

    /// Pixel y grows downward while domain y grows upward, hence the flip.
    pub fn to_pixel_y(&self, y: f64) -> f32 {
        let span = self.window.y_max - self.window.y_min;
        (self.height
            - self.padding
            - (y - self.window.y_min) / span * (self.height - 2.0 * self.padding)) as f32
    }

    pub fn to_pixel(&self, x: f64, y: f64) -> (f32, f32) {
        (self.to_pixel_x(x), self.to_pixel_y(y))
    }

    pub fn to_domain_x(&self, px: f64) -> f64 {
        let span = self.window.x_max - self.window.x_min;
        self.window.x_min + (px - self.padding) / (self.width - 2.0 * self.padding) * span
    }

    pub fn to_domain_y(&self, py: f64) -> f64 {
        let span = self.window.y_max - self.window.y_min;
        self.window.y_min + (self.height - self.padding - py) / (self.height - 2.0 * self.padding) * span
    }

    /// Pixels per domain unit along x.
    pub fn x_scale(&self) -> f64 {
        (self.width - 2.0 * self.padding) / (self.window.x_max - self.window.x_min)
    }

    /// Pixels per domain unit along y.
    pub fn y_scale(&self) -> f64 {
        (self.height - 2.0 * self.padding) / (self.window.y_max - self.window.y_min)
    }

    /// Pixel bounds of the plot area.
    pub fn left(&self) -> f32 {
        self.padding as f32
    }

    pub fn right(&self) -> f32 {
        (self.width - self.padding) as f32
    }

    pub fn top(&self) -> f32 {
        self.padding as f32
    }

    pub fn bottom(&self) -> f32 {
        (self.height - self.padding) as f32
    }
}
