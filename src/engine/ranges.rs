//! Engine-side range table and text-flow movement.
//!
//! Ranges are spans of character offsets into the editable root's text flow.
//! They are keyed by opaque handles in an engine-side map (nodes can carry an
//! identity attribute, ranges cannot) and live until explicitly disposed.
//! Word and sentence movement is a boundary-scanning approximation over the
//! flattened text flow, not a reimplementation of legacy unit rules.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::DomTree;
use crate::protocol::MoveUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditRange {
    pub start: usize,
    pub end: usize,
}

impl EditRange {
    pub fn collapsed(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn clamped(mut self, len: usize) -> Self {
        self.start = self.start.min(len);
        self.end = self.end.min(len).max(self.start);
        self
    }
}

#[derive(Default)]
pub struct RangeTable {
    ranges: HashMap<String, EditRange>,
}

impl RangeTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, range: EditRange) -> String {
        let handle = format!("r-{}", Uuid::new_v4().simple());
        self.ranges.insert(handle.clone(), range);
        handle
    }

    pub fn get(&self, handle: &str) -> Option<EditRange> {
        self.ranges.get(handle).copied()
    }

    pub fn set(&mut self, handle: &str, range: EditRange) -> bool {
        match self.ranges.get_mut(handle) {
            Some(slot) => {
                *slot = range;
                true
            }
            None => false,
        }
    }

    pub fn dispose(&mut self, handle: &str) -> bool {
        self.ranges.remove(handle).is_some()
    }

    pub fn clear(&mut self) {
        self.ranges.clear();
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Persistable position: child-index chain from the document root plus a
/// character offset inside the addressed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionBookmark {
    pub path: Vec<usize>,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBookmark {
    pub start: PositionBookmark,
    pub end: PositionBookmark,
}

pub fn bookmark_position(tree: &DomTree, body: usize, pos: usize) -> PositionBookmark {
    match tree.pos_to_text_node(body, pos) {
        Some((node, local)) => PositionBookmark {
            path: tree.path_from_root(node).unwrap_or_default(),
            offset: local,
        },
        None => PositionBookmark {
            path: tree.path_from_root(body).unwrap_or_default(),
            offset: 0,
        },
    }
}

pub fn resolve_bookmark_position(
    tree: &DomTree,
    body: usize,
    bookmark: &PositionBookmark,
) -> Option<usize> {
    let node = tree.resolve_path(&bookmark.path)?;
    let flow_start = tree.node_flow_start(body, node)?;
    Some(flow_start + bookmark.offset)
}

// ----- unit movement over flattened text ---------------------------------

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

const SENTENCE_TERMINATORS: &[char] = &['.', '!', '?'];

/// Bounds of the word at `pos`, scanning forward (then backward) to the
/// nearest word when `pos` sits on a non-word character.
pub fn word_bounds(text: &str, pos: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return None;
    }
    let mut anchor = pos.min(chars.len().saturating_sub(1));
    if !is_word_char(chars[anchor]) {
        let forward = (anchor..chars.len()).find(|&i| is_word_char(chars[i]));
        anchor = match forward {
            Some(i) => i,
            None => (0..anchor).rev().find(|&i| is_word_char(chars[i]))?,
        };
    }
    let mut start = anchor;
    while start > 0 && is_word_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = anchor + 1;
    while end < chars.len() && is_word_char(chars[end]) {
        end += 1;
    }
    Some((start, end))
}

pub fn next_word_start(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut p = pos.min(chars.len());
    while p < chars.len() && is_word_char(chars[p]) {
        p += 1;
    }
    while p < chars.len() && !is_word_char(chars[p]) {
        p += 1;
    }
    p
}

pub fn prev_word_start(text: &str, pos: usize) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut p = pos.min(chars.len());
    while p > 0 && !is_word_char(chars[p - 1]) {
        p -= 1;
    }
    while p > 0 && is_word_char(chars[p - 1]) {
        p -= 1;
    }
    p
}

fn sentence_starts(text: &str) -> Vec<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut starts = vec![0];
    let mut i = 0;
    while i < chars.len() {
        if SENTENCE_TERMINATORS.contains(&chars[i]) {
            let mut j = i + 1;
            while j < chars.len()
                && (SENTENCE_TERMINATORS.contains(&chars[j]) || chars[j].is_whitespace())
            {
                j += 1;
            }
            if j < chars.len() && !starts.contains(&j) {
                starts.push(j);
            }
            i = j;
        } else {
            i += 1;
        }
    }
    starts
}

pub fn next_sentence_start(text: &str, pos: usize) -> usize {
    sentence_starts(text)
        .into_iter()
        .find(|&s| s > pos)
        .unwrap_or_else(|| text.chars().count())
}

pub fn prev_sentence_start(text: &str, pos: usize) -> usize {
    sentence_starts(text)
        .into_iter()
        .filter(|&s| s < pos)
        .last()
        .unwrap_or(0)
}

fn sentence_bounds(text: &str, pos: usize) -> (usize, usize) {
    let len = text.chars().count();
    let pos = pos.min(len);
    let start = sentence_starts(text)
        .into_iter()
        .filter(|&s| s <= pos)
        .last()
        .unwrap_or(0);
    let end = next_sentence_start(text, start);
    (start, end.min(len))
}

/// Move a position by `count` units. Returns the new position and the signed
/// number of units actually moved (clamping eats the remainder).
pub fn move_position(text: &str, pos: usize, unit: MoveUnit, count: i64) -> (usize, i64) {
    let len = text.chars().count();
    let pos = pos.min(len);
    match unit {
        MoveUnit::Character => {
            let target = if count >= 0 {
                pos.saturating_add(count as usize).min(len)
            } else {
                pos.saturating_sub(count.unsigned_abs() as usize)
            };
            (target, target as i64 - pos as i64)
        }
        MoveUnit::Word => step_position(pos, count, |p, forward| {
            if forward {
                next_word_start(text, p)
            } else {
                prev_word_start(text, p)
            }
        }),
        MoveUnit::Sentence => step_position(pos, count, |p, forward| {
            if forward {
                next_sentence_start(text, p)
            } else {
                prev_sentence_start(text, p)
            }
        }),
    }
}

fn step_position(pos: usize, count: i64, step: impl Fn(usize, bool) -> usize) -> (usize, i64) {
    let forward = count >= 0;
    let mut current = pos;
    let mut moved = 0i64;
    for _ in 0..count.unsigned_abs() {
        let next = step(current, forward);
        if next == current {
            break;
        }
        current = next;
        moved += if forward { 1 } else { -1 };
    }
    (current, moved)
}

/// Grow a range to the enclosing unit. Returns `None` when there is nothing
/// to expand to (empty flow, no word in reach).
pub fn expand_range(text: &str, range: EditRange, unit: MoveUnit) -> Option<EditRange> {
    let len = text.chars().count();
    match unit {
        MoveUnit::Character => {
            if range.is_collapsed() && range.start < len {
                Some(EditRange {
                    start: range.start,
                    end: range.start + 1,
                })
            } else {
                Some(range)
            }
        }
        MoveUnit::Word => {
            let (start, first_end) = word_bounds(text, range.start)?;
            let end_probe = if range.end > range.start {
                range.end - 1
            } else {
                range.start
            };
            let end = word_bounds(text, end_probe)
                .map(|(_, e)| e)
                .unwrap_or(first_end)
                .max(first_end);
            Some(EditRange { start, end })
        }
        MoveUnit::Sentence => {
            let (start, first_end) = sentence_bounds(text, range.start);
            let end_probe = if range.end > range.start {
                range.end - 1
            } else {
                range.start
            };
            let (_, end) = sentence_bounds(text, end_probe);
            Some(EditRange {
                start,
                end: end.max(first_end),
            })
        }
    }
}
