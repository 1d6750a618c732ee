use serde_derive::{Deserialize, Serialize};

use super::direction::Direction;

// Identity of a reference entry
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCode {
    // The reference database has no glyph for this entry
    Unknown,
    Glyph(char),
}

impl CharCode {
    pub fn to_char(self) -> char {
        match self {
            CharCode::Unknown => '?',
            CharCode::Glyph(c) => c,
        }
    }
}

// Which property of a stroke a constraint reads
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    StartX,
    StartY,
    EndX,
    EndY,
    MidX,
    MidY,
    Length,
}

impl Selector {
    pub fn from_char(c: char) -> Option<Selector> {
        match c {
            'x' => Some(Selector::StartX),
            'y' => Some(Selector::StartY),
            'i' => Some(Selector::EndX),
            'j' => Some(Selector::EndY),
            'a' => Some(Selector::MidX),
            'b' => Some(Selector::MidY),
            'l' => Some(Selector::Length),
            _ => None,
        }
    }
}

// One side of a constraint; stroke index is 0-based
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeRef {
    pub stroke: usize,
    pub selector: Selector,
}

// Positional relation between two strokes of a candidate
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Constraint {
    pub first: StrokeRef,
    pub second: StrokeRef,
    // Violations push the candidate out of any realistic result list
    pub mandatory: bool,
}

// One reference character: a direction pattern per stroke, plus constraints
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CandidatePattern {
    pub code: CharCode,
    pub strokes: Vec<Vec<Direction>>,
    pub constraints: Vec<Constraint>,
}

impl CandidatePattern {
    pub fn stroke_count(&self) -> usize {
        self.strokes.len()
    }
}

// All reference characters sharing one stroke count, in file order
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PatternSet {
    pub stroke_count: usize,
    pub candidates: Vec<CandidatePattern>,
}
