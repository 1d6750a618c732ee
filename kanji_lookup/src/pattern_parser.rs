use tracing::debug;

use super::direction::parse_pattern;
use super::entities::*;
use super::error::*;

/// Parses the reference text for one stroke count.
///
/// Each data line reads `CODE|TOKENS|FILTERS`, the filter part being optional.
/// Blank lines and `#` comments are skipped, and so are lines whose token
/// count differs from `stroke_count`. Any other malformed line fails the
/// whole set, naming the offending line.
pub fn parse_set(stroke_count: usize, text: &str) -> LookupResult<PatternSet> {
    let mut candidates: Vec<CandidatePattern> = Vec::new();
    let mut skipped = 0;
    for (ix, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_line(stroke_count, ix + 1, trimmed)? {
            Some(candidate) => candidates.push(candidate),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        debug!(stroke_count, skipped, "skipped reference lines with a different stroke count");
    }
    Ok(PatternSet {
        stroke_count: stroke_count,
        candidates: candidates,
    })
}

// None if the line describes a character with another stroke count
fn parse_line(stroke_count: usize, line: usize, text: &str) -> LookupResult<Option<CandidatePattern>> {
    let mut fields = text.splitn(3, '|');
    let code_field = fields.next().unwrap_or("");
    let tokens_field = fields.next().unwrap_or("");
    let filters_field = fields.next().unwrap_or("");

    let tokens: Vec<&str> = tokens_field.split_whitespace().collect();
    if tokens.len() != stroke_count {
        return Ok(None);
    }

    let code = parse_code(code_field).ok_or_else(|| LookupError::MalformedCode {
        line: line,
        code: code_field.to_string(),
        text: text.to_string(),
    })?;

    let mut strokes = Vec::with_capacity(stroke_count);
    for token in tokens {
        let pattern = parse_pattern(token).map_err(|bad| LookupError::InvalidDirectionToken {
            line: line,
            token: bad,
            text: text.to_string(),
        })?;
        strokes.push(pattern);
    }

    let mut constraints = Vec::new();
    for expr in filters_field.split_whitespace() {
        let constraint = parse_filter(expr, stroke_count).ok_or_else(|| LookupError::MalformedFilterExpression {
            line: line,
            expr: expr.to_string(),
            text: text.to_string(),
        })?;
        constraints.push(constraint);
    }

    Ok(Some(CandidatePattern {
        code: code,
        strokes: strokes,
        constraints: constraints,
    }))
}

// "0", a single literal character, or a hex code point; anything after a space is description
fn parse_code(field: &str) -> Option<CharCode> {
    let code = field.split(' ').next().unwrap_or("");
    if code == "0" {
        return Some(CharCode::Unknown);
    }
    let mut chars = code.chars();
    match (chars.next(), chars.next()) {
        (None, _) => None,
        (Some(c), None) => Some(CharCode::Glyph(c)),
        _ => u32::from_str_radix(code, 16)
            .ok()
            .and_then(char::from_u32)
            .map(CharCode::Glyph),
    }
}

// <sel1><stroke1>-<sel2><stroke2>[!] with 1-based stroke numbers
fn parse_filter(expr: &str, stroke_count: usize) -> Option<Constraint> {
    let (body, mandatory) = match expr.strip_suffix('!') {
        Some(body) => (body, true),
        None => (expr, false),
    };
    let (lhs, rhs) = body.split_once('-')?;
    Some(Constraint {
        first: parse_stroke_ref(lhs, stroke_count)?,
        second: parse_stroke_ref(rhs, stroke_count)?,
        mandatory: mandatory,
    })
}

fn parse_stroke_ref(operand: &str, stroke_count: usize) -> Option<StrokeRef> {
    let mut chars = operand.chars();
    let selector = Selector::from_char(chars.next()?)?;
    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let stroke: usize = digits.parse().ok()?;
    if stroke == 0 || stroke > stroke_count {
        return None;
    }
    Some(StrokeRef {
        stroke: stroke - 1,
        selector: selector,
    })
}
