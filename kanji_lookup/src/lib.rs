mod config;
mod constraints;
mod direction;
mod entities;
mod error;
mod match_collector;
mod matcher;
mod pattern_database;
mod pattern_parser;
mod stroke_scorer;

use serde_derive::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub use config::{LookupConfig, DEFAULT_LIMIT};
pub use constraints::MANDATORY_VIOLATION_PENALTY;
pub use direction::{observed_angle, parse_pattern, Direction};
pub use entities::{CandidatePattern, CharCode, Constraint, PatternSet, Selector, StrokeRef};
pub use error::{LookupError, LookupResult};
pub use matcher::{match_cost, Matcher, UNMATCHED_STROKE_COUNT};
pub use pattern_database::{DirSource, PatternDatabase, PatternSource};
pub use pattern_parser::parse_set;
pub use stroke_scorer::{score, score_stroke, ANGLE_SCALE, HUGE_COST, STROKE_BASE_COST};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Stroke {
    pub points: Vec<Point>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub character: char,
    pub cost: i64,
}

/// Cost of a candidate after its constraints are applied; lower is better.
pub fn adjusted_cost(strokes: &[Stroke], candidate: &CandidatePattern) -> i64 {
    constraints::apply(match_cost(strokes, candidate), strokes, &candidate.constraints)
}

pub fn match_typed(db: &PatternDatabase, strokes: &[Stroke], limit: usize) -> LookupResult<Vec<Match>> {
    Matcher::new(db).lookup(strokes, limit)
}

// Strokes as they arrive from JS: arrays of [x, y] pairs, possibly fractional
fn strokes_from_coords(input: &[Vec<Vec<f64>>]) -> Vec<Stroke> {
    let mut strokes: Vec<Stroke> = Vec::with_capacity(input.len());
    for raw_stroke in input {
        let mut stroke = Stroke {
            points: Vec::with_capacity(raw_stroke.len()),
        };
        for raw_point in raw_stroke {
            if raw_point.len() < 2 {
                continue;
            }
            stroke.points.push(Point {
                x: raw_point[0].round() as i32,
                y: raw_point[1].round() as i32,
            });
        }
        strokes.push(stroke);
    }
    strokes
}

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Lookup entry point for the browser; holds its own reference data.
#[wasm_bindgen]
pub struct Recognizer {
    db: PatternDatabase,
}

#[wasm_bindgen]
impl Recognizer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Recognizer {
        Recognizer {
            db: PatternDatabase::new(),
        }
    }

    /// Loads the reference text for one stroke count.
    pub fn add_patterns(&self, stroke_count: usize, text: &str) -> Result<(), JsValue> {
        self.db.insert_text(stroke_count, text).map_err(to_js_error)
    }

    /// Input is an array of strokes, each an array of [x, y] points.
    /// Returns the matches as a JSON array, best first.
    pub fn lookup(&self, input: &JsValue, limit: usize) -> Result<String, JsValue> {
        let input: Vec<Vec<Vec<f64>>> = input.into_serde().map_err(to_js_error)?;
        let strokes = strokes_from_coords(&input);
        let lookup_res = match_typed(&self.db, &strokes, limit).map_err(to_js_error)?;
        serde_json::to_string(&lookup_res).map_err(to_js_error)
    }
}

impl Default for Recognizer {
    fn default() -> Self {
        Recognizer::new()
    }
}
