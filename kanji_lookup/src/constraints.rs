use super::entities::*;
use super::Stroke;

// Large enough to outweigh any stroke cost and constraint adjustment combined
pub const MANDATORY_VIOLATION_PENALTY: i64 = 1_000_000_000_000;

/// Reads the selected property of a stroke.
/// Midpoints are halved with integer division, length is the rounded chord length.
pub fn select(stroke: &Stroke, selector: Selector) -> i64 {
    let (first, last) = match (stroke.points.first(), stroke.points.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return 0,
    };
    let (x1, y1) = (first.x as i64, first.y as i64);
    let (x2, y2) = (last.x as i64, last.y as i64);
    match selector {
        Selector::StartX => x1,
        Selector::StartY => y1,
        Selector::EndX => x2,
        Selector::EndY => y2,
        Selector::MidX => (x1 + x2) / 2,
        Selector::MidY => (y1 + y2) / 2,
        Selector::Length => {
            let dx = (x2 - x1) as f64;
            let dy = (y2 - y1) as f64;
            (dx * dx + dy * dy).sqrt().round() as i64
        }
    }
}

/// Net score change the constraints cause for the drawn strokes.
///
/// Each constraint rewards a first value larger than the second, and a
/// mandatory one that is violated adds the violation penalty.
/// The caller guarantees the strokes match the candidate's stroke count.
pub fn adjustment(strokes: &[Stroke], constraints: &[Constraint]) -> i64 {
    let mut res: i64 = 0;
    for constraint in constraints {
        let val1 = select(&strokes[constraint.first.stroke], constraint.first.selector);
        let val2 = select(&strokes[constraint.second.stroke], constraint.second.selector);
        res -= val1 - val2;
        if constraint.mandatory && val1 < val2 {
            res += MANDATORY_VIOLATION_PENALTY;
        }
    }
    res
}

/// Applies the candidate's constraints to an already computed stroke cost.
pub fn apply(score: i64, strokes: &[Stroke], constraints: &[Constraint]) -> i64 {
    score + adjustment(strokes, constraints)
}
