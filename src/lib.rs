//! Diagram renderer for step-by-step calculus tutoring.
//!
//! Takes the JSON visual descriptors produced by the tutor's problem bank
//! and AI backend (function graphs with calculus annotations, fixed
//! related-rates scenario sketches, free-form element lists) and renders
//! them to SVG, PNG or PDF. Rendering is total: malformed input degrades to
//! a placeholder drawing instead of an error.

pub mod canvas;
pub mod diagram;
pub mod fonts;
pub mod palette;
pub mod problem;
