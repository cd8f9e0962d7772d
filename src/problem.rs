//! JSON boundary for problem-bank entries and AI solution documents. The
//! upstream data is duck-typed, so every field here is optional and anything
//! unusable collapses onto [`Diagram::Placeholder`] instead of an error.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::diagram::types::{
    CriticalPoint, Diagram, DomainWindow, Element, ExtremumKind, FunctionPlot, GenericDiagram,
    GenericKind, InflectionPoint, LimitPoint, ScenarioKind, ShapeKind, VerticalAsymptote,
};
use crate::palette::ColorMap;

/// A solved problem as produced by the problem bank or the AI tutor. Both
/// document shapes parse into this one struct: bank entries nest a `visual`
/// block, AI solutions carry a top-level `type` plus an optional `diagram`,
/// and a bare visual block parses via the flattened fields.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDoc {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub problem: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default)]
    pub visual: Option<VisualSpec>,
    #[serde(default)]
    pub diagram: Option<VisualSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<SolutionStep>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub answer: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub colors: HashMap<String, String>,
    #[serde(flatten)]
    inline: VisualSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SolutionStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, alias = "content", deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default)]
    pub equation: Option<String>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub mistake: Option<String>,
}

/// One visual descriptor. Serves both the bank's `visual` block and the AI's
/// `diagram` block; fields the given kind does not use stay at their
/// defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSpec {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub x_range: Option<Vec<f64>>,
    #[serde(default)]
    pub y_range: Option<Vec<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub critical_points: Vec<CriticalPointSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub inflection_points: Vec<InflectionPointSpec>,
    #[serde(default)]
    pub limit_point: Option<LimitPointSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub asymptotes: Vec<AsymptoteSpec>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub elements: Vec<ElementSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CriticalPointSpec {
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InflectionPointSpec {
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitPointSpec {
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
    #[serde(default)]
    pub approaching: Option<Approach>,
    #[serde(default)]
    pub is_hole: bool,
    #[serde(default)]
    pub horizontal_asymptote: Option<f64>,
}

/// The `approaching` field is a number for finite limits and the literal
/// string `"infinity"` for limits at infinity.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Approach {
    Toward(f64),
    Keyword(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct AsymptoteSpec {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default = "nan")]
    pub x: f64,
    #[serde(default = "nan")]
    pub y: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ElementSpec {
    #[serde(default, alias = "type", deserialize_with = "null_as_default")]
    pub shape: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, alias = "colorRole", deserialize_with = "null_as_default")]
    pub color: String,
    /// Free-text placement hint from the model. Accepted so documents parse,
    /// never used for layout.
    #[serde(default, alias = "positionHint")]
    pub position: Option<serde_json::Value>,
}

fn nan() -> f64 {
    f64::NAN
}

/// Model output writes explicit `null` where the bank omits the key; both
/// mean "use the default".
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Parse a problem document, collapsing unreadable input onto an empty doc
/// whose diagram is the placeholder.
pub fn parse_document(json: &str) -> ProblemDoc {
    serde_json::from_str(json).unwrap_or_default()
}

pub fn parse_document_strict(json: &str) -> Result<ProblemDoc, String> {
    serde_json::from_str(json).map_err(|err| format!("Failed to parse problem JSON: {err}"))
}

impl ProblemDoc {
    /// Pick the diagram to render. Precedence mirrors the tutor UI: an AI
    /// diagram block wins unless its kind is `none`, then the bank's visual
    /// block, then the top-level problem type.
    pub fn diagram(&self) -> Diagram {
        if let Some(spec) = &self.diagram {
            if !spec.kind.is_empty() && spec.kind != "none" {
                return Diagram::Generic(spec.to_generic());
            }
        }
        if let Some(visual) = &self.visual {
            return visual.to_diagram();
        }
        if self.kind.is_empty() {
            return Diagram::Placeholder;
        }
        if let Some(kind) = ScenarioKind::from_key(&self.kind) {
            return Diagram::Scenario(kind);
        }
        match self.kind.as_str() {
            // Bare visual document: the descriptor fields sit at top level.
            "function-graph" | "geometry" | "graph" | "3d" | "none" => {
                let mut spec = self.inline.clone();
                spec.kind = self.kind.clone();
                spec.to_diagram()
            }
            _ => Diagram::Placeholder,
        }
    }

    pub fn colors(&self) -> ColorMap {
        ColorMap::new(self.colors.clone())
    }
}

impl VisualSpec {
    fn to_diagram(&self) -> Diagram {
        if let Some(kind) = ScenarioKind::from_key(&self.kind) {
            return Diagram::Scenario(kind);
        }
        match self.kind.as_str() {
            "function-graph" => Diagram::FunctionPlot(self.to_function_plot()),
            // No drawable content by contract; show the description alone.
            "none" => Diagram::Generic(GenericDiagram {
                kind: GenericKind::Generic,
                description: self.description.clone(),
                elements: Vec::new(),
            }),
            _ => Diagram::Generic(self.to_generic()),
        }
    }

    fn to_function_plot(&self) -> FunctionPlot {
        FunctionPlot {
            function: self.function.clone(),
            window: DomainWindow::from_ranges(
                range_pair(self.x_range.as_deref()),
                range_pair(self.y_range.as_deref()),
            ),
            critical_points: self
                .critical_points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .map(|p| CriticalPoint {
                    x: p.x,
                    y: p.y,
                    kind: ExtremumKind::from_key(&p.kind),
                })
                .collect(),
            inflection_points: self
                .inflection_points
                .iter()
                .filter(|p| p.x.is_finite() && p.y.is_finite())
                .map(|p| InflectionPoint { x: p.x, y: p.y })
                .collect(),
            limit_point: self.limit_point.as_ref().and_then(LimitPointSpec::to_limit),
            asymptotes: self
                .asymptotes
                .iter()
                .filter(|a| a.kind == "vertical" && a.x.is_finite())
                .map(|a| VerticalAsymptote { x: a.x })
                .collect(),
        }
    }

    fn to_generic(&self) -> GenericDiagram {
        GenericDiagram {
            kind: GenericKind::from_key(&self.kind),
            description: self.description.clone(),
            elements: self
                .elements
                .iter()
                .map(|e| Element {
                    shape: ShapeKind::from_key(&e.shape),
                    label: e.label.clone(),
                    color_role: e.color.clone(),
                })
                .collect(),
        }
    }
}

impl LimitPointSpec {
    fn to_limit(&self) -> Option<LimitPoint> {
        if !(self.x.is_finite() && self.y.is_finite()) {
            return None;
        }
        let approaching_infinity =
            matches!(&self.approaching, Some(Approach::Keyword(word)) if word == "infinity");
        Some(LimitPoint {
            x: self.x,
            y: self.y,
            approaching_infinity,
            is_hole: self.is_hole,
            horizontal_asymptote: self.horizontal_asymptote.filter(|v| v.is_finite()),
        })
    }
}

fn range_pair(range: Option<&[f64]>) -> Option<[f64; 2]> {
    match range {
        Some([lo, hi, ..]) => Some([*lo, *hi]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_bank_function_graph() {
        let doc = parse_document(
            r#"{
                "id": "rr-med-2",
                "title": "Rising Water in a Cone",
                "visual": {
                    "type": "function-graph",
                    "function": "Math.PI * (x/3)**2 * x",
                    "xRange": [0, 12],
                    "yRange": [0, 70],
                    "description": "Volume of water V as a function of water depth h"
                },
                "colors": {}
            }"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => {
                assert_eq!(plot.function.as_deref(), Some("Math.PI * (x/3)**2 * x"));
                assert_eq!(plot.window, DomainWindow::new(0.0, 12.0, 0.0, 70.0));
            }
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_limit_visual_approaching_infinity() {
        let doc = parse_document(
            r#"{
                "visual": {
                    "type": "function-graph",
                    "function": "(2.5*x*x + 1) / (x*x + 1)",
                    "xRange": [0, 20],
                    "yRange": [0, 4],
                    "limitPoint": {"x": 10, "y": 2.5, "approaching": "infinity", "horizontalAsymptote": 2.5}
                }
            }"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => {
                let limit = plot.limit_point.expect("limit point should survive");
                assert!(limit.approaching_infinity);
                assert!(!limit.is_hole);
                assert_eq!(limit.horizontal_asymptote, Some(2.5));
            }
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_finite_approach_is_not_infinity() {
        let doc = parse_document(
            r#"{"visual": {"type": "function-graph", "limitPoint": {"x": 3, "y": 11, "approaching": 3}}}"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => {
                let limit = plot.limit_point.expect("limit point should survive");
                assert!(!limit.approaching_infinity);
            }
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_ai_diagram_block_wins_over_problem_type() {
        let doc = parse_document(
            r#"{
                "type": "two-cars",
                "diagram": {
                    "type": "geometry",
                    "description": "A circle of radius r",
                    "elements": [{"shape": "circle", "label": "r", "color": "accent"}]
                }
            }"#,
        );
        match doc.diagram() {
            Diagram::Generic(generic) => {
                assert_eq!(generic.kind, GenericKind::Geometry);
                assert_eq!(generic.elements.len(), 1);
                assert_eq!(generic.elements[0].shape, ShapeKind::Circle);
                assert_eq!(generic.elements[0].color_role, "accent");
            }
            other => panic!("expected a generic diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_diagram_kind_none_falls_back_to_problem_type() {
        let doc = parse_document(
            r#"{"type": "balloon", "diagram": {"type": "none", "description": "nothing to draw"}}"#,
        );
        assert_eq!(doc.diagram(), Diagram::Scenario(ScenarioKind::Balloon));
    }

    #[test]
    fn test_visual_kind_none_keeps_description_only() {
        let doc = parse_document(
            r#"{
                "visual": {
                    "type": "none",
                    "description": "Implicit differentiation has no picture",
                    "elements": [{"shape": "circle", "label": "ignored"}]
                }
            }"#,
        );
        match doc.diagram() {
            Diagram::Generic(generic) => {
                assert!(generic.elements.is_empty());
                assert_eq!(generic.description, "Implicit differentiation has no picture");
            }
            other => panic!("expected a generic diagram, got {other:?}"),
        }
    }

    #[test]
    fn test_scenario_key_in_visual_block() {
        let doc = parse_document(r#"{"visual": {"type": "plane-radar"}}"#);
        assert_eq!(doc.diagram(), Diagram::Scenario(ScenarioKind::PlaneRadar));
    }

    #[test]
    fn test_unrecognized_problem_type_is_placeholder() {
        let doc = parse_document(r#"{"type": "generic", "answer": "See solution above"}"#);
        assert_eq!(doc.diagram(), Diagram::Placeholder);
    }

    #[test]
    fn test_unreadable_input_is_placeholder() {
        let doc = parse_document("commentary, not JSON");
        assert_eq!(doc.diagram(), Diagram::Placeholder);
        assert!(doc.colors().get("x").is_none());
    }

    #[test]
    fn test_bare_visual_document() {
        let doc = parse_document(
            r#"{"type": "function-graph", "function": "x^2 - 4*x + 1", "xRange": [-2, 6], "yRange": [-4, 10]}"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => {
                assert_eq!(plot.function.as_deref(), Some("x^2 - 4*x + 1"));
                assert_eq!(plot.window, DomainWindow::new(-2.0, 6.0, -4.0, 10.0));
            }
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_nonfinite_and_partial_annotations_are_dropped() {
        let doc = parse_document(
            r#"{
                "visual": {
                    "type": "function-graph",
                    "criticalPoints": [{"x": 2, "y": -3, "type": "min"}, {"type": "max"}],
                    "asymptotes": [{"type": "horizontal", "y": 2}, {"type": "vertical", "x": 1}]
                }
            }"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => {
                assert_eq!(plot.critical_points.len(), 1);
                assert_eq!(plot.critical_points[0].kind, ExtremumKind::Min);
                assert_eq!(plot.asymptotes.len(), 1);
                assert_eq!(plot.asymptotes[0].x, 1.0);
            }
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_short_ranges_fall_back_to_default_window() {
        let doc = parse_document(
            r#"{"visual": {"type": "function-graph", "xRange": [5], "yRange": null}}"#,
        );
        match doc.diagram() {
            Diagram::FunctionPlot(plot) => assert_eq!(plot.window, DomainWindow::default()),
            other => panic!("expected a function plot, got {other:?}"),
        }
    }

    #[test]
    fn test_null_fields_from_model_output() {
        let doc = parse_document(
            r#"{
                "type": "generic",
                "steps": [{"title": "Solution", "body": "text", "equation": null, "concept": null, "mistake": null}],
                "answer": "See solution above",
                "colors": {}
            }"#,
        );
        assert_eq!(doc.steps.len(), 1);
        assert_eq!(doc.steps[0].title, "Solution");
        assert!(doc.steps[0].equation.is_none());
    }

    #[test]
    fn test_colors_travel_with_the_document() {
        let doc = parse_document(
            r##"{"type": "cube", "colors": {"s": "#3b82f6", "V": "#ef4444"}}"##,
        );
        assert_eq!(doc.diagram(), Diagram::Scenario(ScenarioKind::Cube));
        assert_eq!(doc.colors().get("s"), Some("#3b82f6"));
        assert_eq!(doc.colors().get("V"), Some("#ef4444"));
    }

    #[test]
    fn test_position_hints_are_ignored() {
        let doc = parse_document(
            r#"{
                "diagram": {
                    "type": "geometry",
                    "elements": [
                        {"shape": "point", "label": "P", "position": "top left"},
                        {"shape": "point", "label": "Q", "position": {"x": 900, "y": -4}}
                    ]
                }
            }"#,
        );
        match doc.diagram() {
            Diagram::Generic(generic) => assert_eq!(generic.elements.len(), 2),
            other => panic!("expected a generic diagram, got {other:?}"),
        }
    }
}
