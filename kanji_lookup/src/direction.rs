use serde_derive::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::Point;

/// One of the eight compass directions a reference stroke segment can take.
/// Token characters follow the numeric keypad: `6` is right, `8` is up, etc.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    DownLeft,
    Down,
    DownRight,
    Left,
    Right,
    UpLeft,
    Up,
    UpRight,
}

impl Direction {
    pub fn from_token(token: char) -> Option<Direction> {
        match token {
            '1' => Some(Direction::DownLeft),
            '2' => Some(Direction::Down),
            '3' => Some(Direction::DownRight),
            '4' => Some(Direction::Left),
            '6' => Some(Direction::Right),
            '7' => Some(Direction::UpLeft),
            '8' => Some(Direction::Up),
            '9' => Some(Direction::UpRight),
            _ => None,
        }
    }

    pub fn token(self) -> char {
        match self {
            Direction::DownLeft => '1',
            Direction::Down => '2',
            Direction::DownRight => '3',
            Direction::Left => '4',
            Direction::Right => '6',
            Direction::UpLeft => '7',
            Direction::Up => '8',
            Direction::UpRight => '9',
        }
    }

    /// Reference angle in radians, counter-clockwise from the positive x axis.
    pub fn angle(self) -> f64 {
        match self {
            Direction::Right => 0.0,
            Direction::UpRight => PI / 4.0,
            Direction::Up => PI / 2.0,
            Direction::UpLeft => 3.0 * PI / 4.0,
            Direction::Left => PI,
            Direction::DownRight => -PI / 4.0,
            Direction::Down => -PI / 2.0,
            Direction::DownLeft => -3.0 * PI / 4.0,
        }
    }
}

// Composite aliases stand for a bent stroke drawn as two half-strokes
fn expand_alias(token: char) -> Option<[char; 2]> {
    match token {
        'b' => Some(['6', '2']),
        'c' => Some(['2', '6']),
        'x' => Some(['2', '1']),
        'y' => Some(['2', '3']),
        _ => None,
    }
}

/// Parses one stroke's token string, expanding composite aliases.
/// On failure, returns the first character that is neither a direction nor an alias.
pub fn parse_pattern(tokens: &str) -> Result<Vec<Direction>, char> {
    let mut res: Vec<Direction> = Vec::with_capacity(tokens.len());
    for token in tokens.chars() {
        if let Some(pair) = expand_alias(token) {
            for t in pair {
                // Alias expansions only ever contain valid direction tokens
                res.push(Direction::from_token(t).ok_or(t)?);
            }
            continue;
        }
        res.push(Direction::from_token(token).ok_or(token)?);
    }
    Ok(res)
}

/// Observed angle of the segment from a to b.
/// Y is inverted because drawing coordinates grow downward.
pub fn observed_angle(a: Point, b: Point) -> f64 {
    let dx = b.x as f64 - a.x as f64;
    let dy = b.y as f64 - a.y as f64;
    (-dy).atan2(dx)
}

/// Absolute difference between two angles, folded into 0..=PI
pub fn angle_difference(a: f64, b: f64) -> f64 {
    let mut diff = (a - b).abs();
    while diff >= 2.0 * PI {
        diff -= 2.0 * PI;
    }
    if diff > PI {
        diff = 2.0 * PI - diff;
    }
    diff
}
