use super::direction::*;
use super::Point;

// Radians are scaled by this before rounding to an integer cost
pub const ANGLE_SCALE: f64 = 1000.0;
// Every matched segment costs at least this much (three degrees' worth)
pub const STROKE_BASE_COST: i64 = 52;
// Cost of a segment that cannot be matched at all
pub const HUGE_COST: i64 = 100_000;

// Long chords are approximated piecewise, up to this many halvings
const SUBDIVIDE_MIN_CHORD_SQUARED: i128 = 20 * 20;
const SUBDIVIDE_MIN_POINTS: usize = 5;
const SUBDIVIDE_MAX_DEPTH: u32 = 4;
// The split point search visits about this many positions per level
const SPLIT_SEARCH_STEPS: usize = 10;

/// Scores the drawn stroke against one reference stroke pattern.
pub fn score_stroke(points: &[Point], pattern: &[Direction]) -> i64 {
    score(points, 0, points.len(), pattern, 0)
}

/// Mismatch cost between `points[begin..end]` and `pattern`; lower is better.
///
/// A single-direction pattern is compared against the chord of the range,
/// long chords being halved recursively so gentle curves still match.
/// Longer patterns are cut in two halves, and the best point to split the
/// range between them is searched for.
pub fn score(points: &[Point], begin: usize, end: usize, pattern: &[Direction], depth: u32) -> i64 {
    if pattern.len() == 1 {
        return score_segment(points, begin, end, pattern[0], depth);
    }
    let huge = HUGE_COST * pattern.len() as i64;
    if begin >= end {
        return huge;
    }

    let (first, second) = pattern.split_at(pattern.len() / 2);
    let step = usize::max(1, (end - begin) / SPLIT_SEARCH_STEPS);
    let from = begin + 1 + first.len();
    // Ranges too short for both halves leave no split point at all
    let to = match end.checked_sub(1 + second.len()) {
        Some(to) => to,
        None => return huge,
    };

    let mut best = huge;
    let mut i = from;
    while i < to {
        // Both halves share the point at the split
        let cost = score(points, begin, i + 1, first, depth) + score(points, i - 1, end, second, depth);
        if cost < best {
            best = cost;
        }
        i += step;
    }
    best
}

fn score_segment(points: &[Point], begin: usize, end: usize, direction: Direction, depth: u32) -> i64 {
    if begin >= end {
        return HUGE_COST;
    }
    let a = points[begin];
    let b = points[end - 1];
    // Opposite extremes of i32 overflow both the difference and its square
    let dx = b.x as i128 - a.x as i128;
    let dy = b.y as i128 - a.y as i128;
    let chord_squared = dx * dx + dy * dy;
    if chord_squared == 0 {
        return HUGE_COST;
    }

    if chord_squared > SUBDIVIDE_MIN_CHORD_SQUARED
        && end - begin > SUBDIVIDE_MIN_POINTS
        && depth < SUBDIVIDE_MAX_DEPTH
    {
        let mid = (begin + end) / 2;
        let left = score_segment(points, begin, mid + 1, direction, depth + 1);
        let right = score_segment(points, mid, end, direction, depth + 1);
        return (left + right) / 2;
    }

    let diff = angle_difference(observed_angle(a, b), direction.angle());
    (diff * ANGLE_SCALE).round() as i64 + STROKE_BASE_COST
}
