use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use super::constraints;
use super::entities::*;
use super::error::*;
use super::match_collector::*;
use super::pattern_database::PatternDatabase;
use super::stroke_scorer::score_stroke;
use super::*;

// Cost of a candidate whose stroke count differs from the drawing's
pub const UNMATCHED_STROKE_COUNT: i64 = i64::MAX / 4;

/// Stroke-matching cost of one candidate, before constraints.
///
/// Per-stroke costs are squared and summed, and the root of the sum is
/// returned, so one badly matched stroke weighs more than several slightly
/// off ones.
pub fn match_cost(strokes: &[Stroke], candidate: &CandidatePattern) -> i64 {
    if strokes.len() != candidate.stroke_count() {
        return UNMATCHED_STROKE_COUNT;
    }
    let mut total: i64 = 0;
    for (stroke, pattern) in strokes.iter().zip(&candidate.strokes) {
        let cost = score_stroke(&stroke.points, pattern);
        total += cost * cost;
    }
    root(total)
}

fn root(total: i64) -> i64 {
    (total as f64).sqrt().round() as i64
}

// Same as match_cost plus constraints, but gives up once the result
// provably cannot get below `cutoff`
fn bounded_cost(strokes: &[Stroke], candidate: &CandidatePattern, cutoff: Option<i64>) -> Option<i64> {
    let adjustment = constraints::adjustment(strokes, &candidate.constraints);
    let mut total: i64 = 0;
    for (stroke, pattern) in strokes.iter().zip(&candidate.strokes) {
        let cost = score_stroke(&stroke.points, pattern);
        total += cost * cost;
        // The root of a partial sum never exceeds the root of the full one
        if let Some(cutoff) = cutoff {
            if root(total) + adjustment >= cutoff {
                return None;
            }
        }
    }
    Some(root(total) + adjustment)
}

/// Ranks the reference characters of a database against drawn strokes.
pub struct Matcher<'a> {
    db: &'a PatternDatabase,
}

impl<'a> Matcher<'a> {
    pub fn new(db: &'a PatternDatabase) -> Matcher<'a> {
        Matcher { db: db }
    }

    /// The `limit` best matching characters, cheapest first.
    pub fn lookup(&self, strokes: &[Stroke], limit: usize) -> LookupResult<Vec<Match>> {
        let never = AtomicBool::new(false);
        self.lookup_cancellable(strokes, limit, &never)
    }

    /// Like `lookup`, but checks `cancel` before every candidate.
    pub fn lookup_cancellable(&self, strokes: &[Stroke], limit: usize, cancel: &AtomicBool) -> LookupResult<Vec<Match>> {
        if strokes.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let set = self.db.get(strokes.len())?;
        // The limit may be far larger than anything the set can fill
        let mut res: Vec<Match> = Vec::with_capacity(limit.min(set.candidates.len()));
        let mut collector = MatchCollector::new(&mut res, limit);
        let mut pruned = 0;
        for candidate in &set.candidates {
            if cancel.load(Ordering::Relaxed) {
                return Err(LookupError::Cancelled);
            }
            if candidate.stroke_count() != strokes.len() {
                continue;
            }
            match bounded_cost(strokes, candidate, collector.worst_kept()) {
                Some(cost) => collector.file_match(Match {
                    character: candidate.code.to_char(),
                    cost: cost,
                }),
                None => pruned += 1,
            }
        }
        debug!(
            stroke_count = strokes.len(),
            candidates = set.candidates.len(),
            pruned,
            "ranked reference patterns"
        );
        Ok(res)
    }
}
