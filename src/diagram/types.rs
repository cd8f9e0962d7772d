/// Data model for every diagram family the renderer accepts. These are the
/// validated shapes; the JSON boundary in `crate::problem` produces them.

/// Domain-space window a function plot is viewed through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainWindow {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Default for DomainWindow {
    fn default() -> Self {
        DomainWindow {
            x_min: -10.0,
            x_max: 10.0,
            y_min: -10.0,
            y_max: 10.0,
        }
    }
}

impl DomainWindow {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        DomainWindow {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    /// Build a window from optional `[min, max]` pairs. A missing, reversed,
    /// degenerate, or non-finite pair falls back to the default span for
    /// that axis; a bad range must degrade, not fail.
    pub fn from_ranges(x_range: Option<[f64; 2]>, y_range: Option<[f64; 2]>) -> Self {
        let default = DomainWindow::default();
        let (x_min, x_max) = match x_range {
            Some([lo, hi]) if lo.is_finite() && hi.is_finite() && lo < hi => (lo, hi),
            _ => (default.x_min, default.x_max),
        };
        let (y_min, y_max) = match y_range {
            Some([lo, hi]) if lo.is_finite() && hi.is_finite() && lo < hi => (lo, hi),
            _ => (default.y_min, default.y_max),
        };
        DomainWindow::new(x_min, x_max, y_min, y_max)
    }

    pub fn spans_x(&self, x: f64) -> bool {
        self.x_min <= x && x <= self.x_max
    }

    pub fn spans_y(&self, y: f64) -> bool {
        self.y_min <= y && y <= self.y_max
    }
}

/// Classification of a critical point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtremumKind {
    Max,
    Min,
    Neither,
}

impl ExtremumKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "max" => ExtremumKind::Max,
            "min" => ExtremumKind::Min,
            _ => ExtremumKind::Neither,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalPoint {
    pub x: f64,
    pub y: f64,
    pub kind: ExtremumKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InflectionPoint {
    pub x: f64,
    pub y: f64,
}

/// Point a limit annotation is attached to. `is_hole` renders a hollow
/// marker; `approaching_infinity` switches the label wording and adds a
/// horizontal asymptote line.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitPoint {
    pub x: f64,
    pub y: f64,
    pub approaching_infinity: bool,
    pub is_hole: bool,
    pub horizontal_asymptote: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VerticalAsymptote {
    pub x: f64,
}

/// An annotated function graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionPlot {
    /// Raw function source, evaluated per sample. `None` plots no curve;
    /// annotations still render.
    pub function: Option<String>,
    pub window: DomainWindow,
    pub critical_points: Vec<CriticalPoint>,
    pub inflection_points: Vec<InflectionPoint>,
    pub limit_point: Option<LimitPoint>,
    pub asymptotes: Vec<VerticalAsymptote>,
}

/// Built-in scenario sketches, keyed by problem type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenarioKind {
    TwoCars,
    PlaneRadar,
    Balloon,
    Cube,
}

impl ScenarioKind {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "two-cars" => Some(ScenarioKind::TwoCars),
            "plane-radar" => Some(ScenarioKind::PlaneRadar),
            "balloon" => Some(ScenarioKind::Balloon),
            "cube" => Some(ScenarioKind::Cube),
            _ => None,
        }
    }
}

/// Shapes a generic-diagram element may take. Unknown descriptor strings map
/// to `Other` and get placeholder treatment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Line,
    Circle,
    Rectangle,
    Arrow,
    Point,
    Text,
    Curve,
    Other,
}

impl ShapeKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "line" => ShapeKind::Line,
            "circle" => ShapeKind::Circle,
            "rectangle" => ShapeKind::Rectangle,
            "arrow" => ShapeKind::Arrow,
            "point" => ShapeKind::Point,
            "text" => ShapeKind::Text,
            "curve" => ShapeKind::Curve,
            _ => ShapeKind::Other,
        }
    }
}

/// One element of an AI-generated diagram. Layout is by element index;
/// position hints from the model are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub shape: ShapeKind,
    pub label: String,
    /// Symbolic role name (`primary`, `secondary`, `accent`, `neutral`).
    pub color_role: String,
}

/// Rendering mode for a generic diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenericKind {
    Geometry,
    Graph,
    ThreeD,
    /// Unrecognized kind; rendered with the geometry layout.
    Generic,
}

impl GenericKind {
    pub fn from_key(key: &str) -> Self {
        match key {
            "geometry" => GenericKind::Geometry,
            "graph" => GenericKind::Graph,
            "3d" => GenericKind::ThreeD,
            _ => GenericKind::Generic,
        }
    }
}

/// AI-generated diagram: a kind, a prose description, and coordinate-free
/// elements laid out deterministically.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericDiagram {
    pub kind: GenericKind,
    pub description: String,
    pub elements: Vec<Element>,
}

/// Validated diagram ready to render. Anything malformed upstream lands on
/// `Placeholder`.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagram {
    FunctionPlot(FunctionPlot),
    Scenario(ScenarioKind),
    Generic(GenericDiagram),
    Placeholder,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_from_missing_ranges_uses_defaults() {
        let window = DomainWindow::from_ranges(None, None);
        assert_eq!(window, DomainWindow::default());
    }

    #[test]
    fn test_window_rejects_degenerate_ranges() {
        let window = DomainWindow::from_ranges(Some([3.0, 3.0]), Some([5.0, -5.0]));
        assert_eq!(window, DomainWindow::default());
        let window = DomainWindow::from_ranges(Some([f64::NAN, 1.0]), Some([0.0, f64::INFINITY]));
        assert_eq!(window, DomainWindow::default());
    }

    #[test]
    fn test_window_keeps_valid_ranges() {
        let window = DomainWindow::from_ranges(Some([-1.0, 5.0]), Some([-4.0, 6.0]));
        assert_eq!(window, DomainWindow::new(-1.0, 5.0, -4.0, 6.0));
    }

    #[test]
    fn test_scenario_keys() {
        assert_eq!(ScenarioKind::from_key("two-cars"), Some(ScenarioKind::TwoCars));
        assert_eq!(ScenarioKind::from_key("cube"), Some(ScenarioKind::Cube));
        assert_eq!(ScenarioKind::from_key("ladder"), None);
    }

    #[test]
    fn test_unknown_shape_maps_to_other() {
        assert_eq!(ShapeKind::from_key("circle"), ShapeKind::Circle);
        assert_eq!(ShapeKind::from_key("spiral"), ShapeKind::Other);
    }

    #[test]
    fn test_unknown_generic_kind_maps_to_generic() {
        assert_eq!(GenericKind::from_key("graph"), GenericKind::Graph);
        assert_eq!(GenericKind::from_key("none"), GenericKind::Generic);
        assert_eq!(GenericKind::from_key(""), GenericKind::Generic);
    }
}
