//! Local pattern matching over a cell's six-neighbour ring.
//!
//! Adapted from the 3x3 `pat3_match`/`PAT3SET` idiom: a small set of
//! hand-written templates, each expanded by rotation/reflection/colour-swap
//! into every symmetric variant, then compiled once (behind a `OnceLock`)
//! into a flat catalogue that every lookup scans. ICE consults this
//! catalogue to classify an empty cell as dead or captured without
//! re-deriving the rule from scratch at every call site.

use crate::cell::{self, Cell, Color};
use crate::error::{BenzeneError, Result};
use crate::position::Position;
use std::path::Path;
use std::sync::OnceLock;

/// Ring-order neighbour directions, indexed 0..6, consistent between
/// pattern authoring and matching. Not the same order as
/// [`crate::constants::HEX_NEIGHBOR_OFFSETS`] — this one walks the ring so
/// rotation is a simple cyclic shift.
const RING: [(isize, isize); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// What a ring slot must be for a pattern to match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Symbol {
    /// `X` — a friendly stone, strictly (not an edge).
    FriendStone,
    /// `x` — friendly stone or a friendly-owned edge.
    Friend,
    /// `O` — an enemy stone, strictly.
    FoeStone,
    /// `o` — enemy stone or an enemy-owned edge.
    Foe,
    /// `.` — empty interior cell.
    Empty,
    /// `?` — anything at all.
    Any,
}

/// What the centre cell actually is, relative to the colour being matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RelState {
    FriendStone,
    FriendEdge,
    FoeStone,
    FoeEdge,
    Empty,
}

impl Symbol {
    fn matches(self, state: RelState) -> bool {
        match self {
            Symbol::Any => true,
            Symbol::Empty => state == RelState::Empty,
            Symbol::FriendStone => state == RelState::FriendStone,
            Symbol::Friend => matches!(state, RelState::FriendStone | RelState::FriendEdge),
            Symbol::FoeStone => state == RelState::FoeStone,
            Symbol::Foe => matches!(state, RelState::FoeStone | RelState::FoeEdge),
        }
    }
}

/// What a matched pattern tells the caller about the centre cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Neither player benefits from ever playing here; fill with either
    /// colour without affecting the outcome.
    Dead,
    /// Effectively already a stone of this colour for connectivity
    /// purposes, though still nominally empty.
    Captured(Color),
}

#[derive(Clone, Debug)]
struct Template {
    ring: [Symbol; 6],
    verdict: Verdict,
}

/// Source patterns, written from Black's point of view. Each is expanded
/// by the 6 rotations, a reflection, and (where the verdict is symmetric)
/// colour-swap into the White-to-move equivalent.
fn base_templates() -> Vec<Template> {
    use Symbol::*;
    vec![
        // Ringed entirely by one colour's stones or edges: whoever plays
        // here gains nothing, since the point was already reachable only
        // through that colour.
        Template {
            ring: [Friend, Friend, Friend, Friend, Friend, Friend],
            verdict: Verdict::Captured(Color::Black),
        },
        // Two opposite arcs both friendly: the two empty gaps left on the
        // far side are each individually capturable, so the centre can't
        // help the opponent connect around it either.
        Template {
            ring: [Friend, Friend, Any, Friend, Friend, Any],
            verdict: Verdict::Dead,
        },
    ]
}

fn rotate(ring: &[Symbol; 6], by: usize) -> [Symbol; 6] {
    let mut out = *ring;
    for i in 0..6 {
        out[i] = ring[(i + by) % 6];
    }
    out
}

fn reflect(ring: &[Symbol; 6]) -> [Symbol; 6] {
    let mut out = *ring;
    out.reverse();
    out
}

fn swap_colors(ring: &[Symbol; 6]) -> [Symbol; 6] {
    ring.map(|s| match s {
        Symbol::FriendStone => Symbol::FoeStone,
        Symbol::Friend => Symbol::Foe,
        Symbol::FoeStone => Symbol::FriendStone,
        Symbol::Foe => Symbol::Friend,
        other => other,
    })
}

fn swap_verdict_color(v: Verdict) -> Verdict {
    match v {
        Verdict::Dead => Verdict::Dead,
        Verdict::Captured(c) => Verdict::Captured(c.opponent()),
    }
}

fn expand(template: &Template) -> Vec<Template> {
    let mut out = Vec::new();
    for reflected in [false, true] {
        let base = if reflected { reflect(&template.ring) } else { template.ring };
        for rot in 0..6 {
            let ring = rotate(&base, rot);
            out.push(Template { ring, verdict: template.verdict });
            out.push(Template {
                ring: swap_colors(&ring),
                verdict: swap_verdict_color(template.verdict),
            });
        }
    }
    out.sort_by_key(|t| t.ring);
    out.dedup_by_key(|t| t.ring);
    out
}

fn catalogue() -> &'static Vec<Template> {
    static CATALOGUE: OnceLock<Vec<Template>> = OnceLock::new();
    CATALOGUE.get_or_init(|| base_templates().iter().flat_map(expand).collect())
}

/// The ring of a cell's neighbours, in [`RING`] order, relative to `color`.
/// Off-board directions (non-edge boundary cells have none in this
/// geometry, since every boundary cell borders an edge atom) fall back to
/// the cell it actually touches, per [`cell::neighbors`].
fn ring_states(pos: &Position, color: Color, c: Cell) -> [RelState; 6] {
    let (col, row) = cell::coords_of(c);
    let mut states = [RelState::Empty; 6];
    for (i, (dc, dr)) in RING.iter().enumerate() {
        let nc = col as isize + dc;
        let nr = row as isize + dr;
        let neighbor = if nc >= 0
            && nr >= 0
            && (nc as usize) < crate::constants::WIDTH
            && (nr as usize) < crate::constants::HEIGHT
        {
            cell::cell_at(nc as usize, nr as usize)
        } else if nr < 0 {
            cell::NORTH
        } else if nr as usize >= crate::constants::HEIGHT {
            cell::SOUTH
        } else if nc < 0 {
            cell::WEST
        } else {
            cell::EAST
        };
        states[i] = if cell::is_edge(neighbor) {
            if cell::edge_owner(neighbor) == color {
                RelState::FriendEdge
            } else {
                RelState::FoeEdge
            }
        } else {
            match pos.color_at(neighbor) {
                stone if stone == color => RelState::FriendStone,
                Color::Empty => RelState::Empty,
                _ => RelState::FoeStone,
            }
        };
    }
    states
}

/// Classifies an empty interior cell against the catalogue, from `color`'s
/// perspective. Returns `None` if no pattern matches (the common case).
pub fn classify(pos: &Position, color: Color, c: Cell) -> Option<Verdict> {
    if !cell::is_interior(c) || pos.color_at(c) != Color::Empty {
        return None;
    }
    let states = ring_states(pos, color, c);
    catalogue()
        .iter()
        .find(|t| t.ring.iter().zip(states.iter()).all(|(s, st)| s.matches(*st)))
        .map(|t| t.verdict)
}

/// Which record-type tag introduced a parsed pattern-file entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RecordKind {
    /// `v:` — a single variation.
    Variation,
    /// `m:` — a miai (two mutually substitutable replies).
    Miai,
}

/// One parsed block from an on-disk pattern file: an optional name line,
/// the record's type tag, its 30 ring offsets (six groups of five), and
/// an optional trailing weight/version integer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternRecord {
    pub name: Option<String>,
    pub kind: RecordKind,
    pub rings: [i32; 30],
    pub weight: Option<i64>,
}

/// Hard cap on records accepted from a single pattern file, so a
/// malformed or hostile file can't force an unbounded parse.
const MAX_PATTERN_RECORDS: usize = 4096;

fn is_name_line(line: &str) -> bool {
    let starts_with_letter = line.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    starts_with_letter && line.ends_with(':') && !line.starts_with("v:") && !line.starts_with("m:")
}

fn parse_record_line(path: &str, line: &str) -> Result<(RecordKind, [i32; 30], Option<i64>)> {
    let (kind, rest) = if let Some(rest) = line.strip_prefix("v:") {
        (RecordKind::Variation, rest)
    } else if let Some(rest) = line.strip_prefix("m:") {
        (RecordKind::Miai, rest)
    } else {
        return Err(BenzeneError::file_format(path, format!("unknown record type tag in line {line:?}")));
    };

    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 6 {
        return Err(BenzeneError::file_format(
            path,
            format!("expected six offset groups, found {}", tokens.len()),
        ));
    }

    let mut rings = [0i32; 30];
    for (i, group) in tokens[..6].iter().enumerate() {
        let values: Vec<&str> = group.split(',').collect();
        if values.len() != 5 {
            return Err(BenzeneError::file_format(
                path,
                format!("offset group {i} has {} value(s), expected 5", values.len()),
            ));
        }
        for (j, v) in values.iter().enumerate() {
            let parsed: i32 = v
                .trim()
                .parse()
                .map_err(|_| BenzeneError::file_format(path, format!("invalid integer {v:?} in offset group {i}")))?;
            rings[i * 5 + j] = parsed;
        }
    }

    let weight = match tokens.get(6) {
        Some(w) => Some(
            w.trim()
                .parse::<i64>()
                .map_err(|_| BenzeneError::file_format(path, format!("invalid trailing weight {w:?}")))?,
        ),
        None => None,
    };

    Ok((kind, rings, weight))
}

/// Parses the on-disk pattern grammar (spec.md §6 / the generic pattern
/// file format): a sequence of blocks, each an optional name line
/// followed by exactly one `v:`/`m:` record line. Any other type tag is
/// rejected outright rather than skipped, since a silently-dropped
/// record would make the catalogue quietly incomplete.
pub fn parse_pattern_text(path: &str, text: &str) -> Result<Vec<PatternRecord>> {
    let mut out = Vec::new();
    let mut pending_name: Option<String> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if is_name_line(line) {
            pending_name = Some(line.trim_end_matches(':').to_string());
            continue;
        }
        let (kind, rings, weight) = parse_record_line(path, line)?;
        out.push(PatternRecord { name: pending_name.take(), kind, rings, weight });
        if out.len() > MAX_PATTERN_RECORDS {
            return Err(BenzeneError::resource_limit(format!(
                "pattern file {path} exceeds the {MAX_PATTERN_RECORDS}-record limit"
            )));
        }
    }

    Ok(out)
}

/// Reads and parses a pattern file from disk.
pub fn load_pattern_file(path: &Path) -> Result<Vec<PatternRecord>> {
    let display = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| BenzeneError::file_format(display.clone(), e.to_string()))?;
    parse_pattern_text(&display, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::cell_at;

    #[test]
    fn catalogue_is_nonempty_and_deduped() {
        let cat = catalogue();
        assert!(!cat.is_empty());
        let mut rings: Vec<_> = cat.iter().map(|t| t.ring).collect();
        rings.sort();
        let before = rings.len();
        rings.dedup();
        assert_eq!(before, rings.len());
    }

    #[test]
    fn cell_surrounded_by_one_color_is_captured() {
        let mut pos = Position::new_board();
        let center = cell_at(5, 5);
        for n in cell::neighbors(center) {
            if cell::is_interior(n) {
                pos.play(Color::Black, n).unwrap();
            }
        }
        let verdict = classify(&pos, Color::Black, center);
        assert_eq!(verdict, Some(Verdict::Captured(Color::Black)));
    }

    #[test]
    fn empty_board_center_has_no_verdict() {
        let pos = Position::new_board();
        let center = cell_at(5, 5);
        assert_eq!(classify(&pos, Color::Black, center), None);
    }

    #[test]
    fn parses_a_named_variation_record() {
        let text = "my_pattern:\nv:1,1,1,1,1 0,0,0,0,0 -1,-1,-1,-1,-1 1,0,1,0,1 0,1,0,1,0 1,1,0,0,1 7\n";
        let records = parse_pattern_text("test.txt", text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name.as_deref(), Some("my_pattern"));
        assert_eq!(records[0].kind, RecordKind::Variation);
        assert_eq!(records[0].weight, Some(7));
        assert_eq!(records[0].rings[0], 1);
    }

    #[test]
    fn parses_an_unnamed_miai_record_with_no_weight() {
        let text = "m:0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0\n";
        let records = parse_pattern_text("test.txt", text).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, None);
        assert_eq!(records[0].kind, RecordKind::Miai);
        assert_eq!(records[0].weight, None);
    }

    #[test]
    fn unknown_type_tag_is_rejected_not_skipped() {
        let text = "x:0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0\n";
        let err = parse_pattern_text("test.txt", text).unwrap_err();
        assert!(matches!(err, BenzeneError::FileFormat { .. }));
    }

    #[test]
    fn too_many_records_hits_the_resource_limit() {
        let line = "v:0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0 0,0,0,0,0\n";
        let text = line.repeat(MAX_PATTERN_RECORDS + 1);
        let err = parse_pattern_text("test.txt", &text).unwrap_err();
        assert!(matches!(err, BenzeneError::ResourceLimit(_)));
    }
}
