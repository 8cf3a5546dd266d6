//! Line-level text diff used on the review step.
//!
//! [`diff`] aligns two texts line by line with `similar`'s Myers
//! implementation and returns a [`TextDiff`]: the ordered edit script plus
//! helpers to group it into context-bounded [`Hunk`]s and render those in
//! unified style.
//!
//! Splitting is loss-free: `lines(a).join("\n") == a` for every `a`, so the
//! `Equal`+`Delete` edits rebuild `before` and the `Equal`+`Insert` edits
//! rebuild `after` exactly, trailing newline included.

use std::ops::Range;

use serde::Serialize;
use similar::{capture_diff_slices, group_diff_ops, Algorithm, DiffOp, DiffTag};

/// Unchanged lines shown around each change when no width is configured.
pub const DEFAULT_CONTEXT: usize = 3;

// ──────────────────────────────────────────────
// Edit script
// ──────────────────────────────────────────────

/// Classification of one line in the edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditKind {
    Equal,
    Delete,
    Insert,
}

impl EditKind {
    /// Prefix used when rendering a line of this kind.
    pub fn marker(self) -> char {
        match self {
            EditKind::Equal => ' ',
            EditKind::Delete => '-',
            EditKind::Insert => '+',
        }
    }
}

/// One line of the edit script.
///
/// `old_index` / `new_index` are 0-based line numbers in `before` / `after`;
/// each is `None` on the side the line does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Edit<'a> {
    pub kind: EditKind,
    pub text: &'a str,
    pub old_index: Option<usize>,
    pub new_index: Option<usize>,
}

impl<'a> Edit<'a> {
    fn equal(text: &'a str, old: usize, new: usize) -> Self {
        Edit {
            kind: EditKind::Equal,
            text,
            old_index: Some(old),
            new_index: Some(new),
        }
    }

    fn delete(text: &'a str, old: usize) -> Self {
        Edit {
            kind: EditKind::Delete,
            text,
            old_index: Some(old),
            new_index: None,
        }
    }

    fn insert(text: &'a str, new: usize) -> Self {
        Edit {
            kind: EditKind::Insert,
            text,
            old_index: None,
            new_index: Some(new),
        }
    }

    pub fn is_change(&self) -> bool {
        self.kind != EditKind::Equal
    }
}

/// Split `text` into lines on `'\n'`.
///
/// Empty text has no lines. A trailing newline yields a trailing empty
/// line, which keeps the split reversible with `join("\n")`.
pub fn lines(text: &str) -> Vec<&str> {
    if text.is_empty() {
        Vec::new()
    } else {
        text.split('\n').collect()
    }
}

// ──────────────────────────────────────────────
// TextDiff
// ──────────────────────────────────────────────

/// Insert/delete counts of an edit script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DiffStats {
    pub insertions: usize,
    pub deletions: usize,
}

/// JSON shape of a diff rendered at one context width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReport<'a> {
    pub identical: bool,
    pub stats: DiffStats,
    pub hunks: Vec<Hunk<'a>>,
}

/// The result of diffing two texts.
///
/// Holds the line-level ops alongside the expanded edit script. Every run
/// of changes is a single op, so deletes always come before inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff<'a> {
    old: Vec<&'a str>,
    new: Vec<&'a str>,
    ops: Vec<DiffOp>,
    edits: Vec<Edit<'a>>,
}

impl<'a> TextDiff<'a> {
    pub fn edits(&self) -> &[Edit<'a>] {
        &self.edits
    }

    /// True when the edit script holds no inserts or deletes.
    pub fn is_identical(&self) -> bool {
        !self.edits.iter().any(Edit::is_change)
    }

    pub fn stats(&self) -> DiffStats {
        self.edits
            .iter()
            .fold(DiffStats::default(), |mut stats, edit| {
                match edit.kind {
                    EditKind::Insert => stats.insertions += 1,
                    EditKind::Delete => stats.deletions += 1,
                    EditKind::Equal => {}
                }
                stats
            })
    }

    /// Group changes into hunks with up to `context` unchanged lines on
    /// each side. Changes separated by more than `2 * context` unchanged
    /// lines land in different hunks.
    pub fn hunks(&self, context: usize) -> Vec<Hunk<'a>> {
        if self.is_identical() {
            return Vec::new();
        }
        // A width past the longer text shows the same lines.
        let context = context.min(self.old.len().max(self.new.len()));
        group_diff_ops(self.ops.clone(), context)
            .iter()
            .map(|group| self.hunk(group))
            .collect()
    }

    fn hunk(&self, group: &[DiffOp]) -> Hunk<'a> {
        let mut lines = Vec::new();
        for op in group {
            expand(op, &self.old, &self.new, &mut lines);
        }
        let (old_before, new_before) = group
            .first()
            .map_or((0, 0), |op| (op.old_range().start, op.new_range().start));
        let old_len = lines.iter().filter(|e| e.kind != EditKind::Insert).count();
        let new_len = lines.iter().filter(|e| e.kind != EditKind::Delete).count();

        Hunk {
            old_start: range_start(old_before, old_len),
            old_len,
            new_start: range_start(new_before, new_len),
            new_len,
            lines,
        }
    }

    /// Unified-style listing of [`hunks`](Self::hunks). Empty when the
    /// texts are identical.
    pub fn render(&self, context: usize) -> String {
        let mut out = String::new();
        for hunk in self.hunks(context) {
            out.push_str(&hunk.header());
            out.push('\n');
            for edit in &hunk.lines {
                out.push(edit.kind.marker());
                out.push_str(edit.text);
                out.push('\n');
            }
        }
        out
    }

    pub fn report(&self, context: usize) -> DiffReport<'a> {
        DiffReport {
            identical: self.is_identical(),
            stats: self.stats(),
            hunks: self.hunks(context),
        }
    }

    /// Serialize the diff (stats plus hunks) to a JSON value.
    pub fn to_json(&self, context: usize) -> serde_json::Value {
        serde_json::to_value(self.report(context)).unwrap_or(serde_json::Value::Null)
    }
}

/// Unified-diff start line: 1-based, or the preceding line for an empty side.
fn range_start(lines_before: usize, len: usize) -> usize {
    if len == 0 {
        lines_before
    } else {
        lines_before + 1
    }
}

/// A contiguous run of changes plus surrounding context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Hunk<'a> {
    pub old_start: usize,
    pub old_len: usize,
    pub new_start: usize,
    pub new_len: usize,
    pub lines: Vec<Edit<'a>>,
}

impl Hunk<'_> {
    /// `@@ -old_start,old_len +new_start,new_len @@`
    pub fn header(&self) -> String {
        format!(
            "@@ -{},{} +{},{} @@",
            self.old_start, self.old_len, self.new_start, self.new_len
        )
    }
}

// ──────────────────────────────────────────────
// Alignment
// ──────────────────────────────────────────────

/// Compute the line edit script turning `before` into `after`.
///
/// Myers alignment in linear space. Never fails. Output is deterministic:
/// within each run of changes every deleted line precedes every inserted
/// line.
pub fn diff<'a>(before: &'a str, after: &'a str) -> TextDiff<'a> {
    let old = lines(before);
    let new = lines(after);
    let ops = merge_runs(capture_diff_slices(Algorithm::Myers, &old[..], &new[..]));

    let mut edits = Vec::with_capacity(old.len().max(new.len()));
    for op in &ops {
        expand(op, &old, &new, &mut edits);
    }
    TextDiff {
        old,
        new,
        ops,
        edits,
    }
}

/// Collapse adjacent equal ops, and adjacent change ops, into one op each.
fn merge_runs(ops: Vec<DiffOp>) -> Vec<DiffOp> {
    let mut merged: Vec<DiffOp> = Vec::with_capacity(ops.len());
    for op in ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let is_equal = tag == DiffTag::Equal;
        let joined = merged.last().and_then(|prev| {
            let (prev_tag, prev_old, prev_new) = prev.as_tag_tuple();
            ((prev_tag == DiffTag::Equal) == is_equal).then(|| {
                span(prev_old.start..old_range.end, prev_new.start..new_range.end, is_equal)
            })
        });
        match joined {
            Some(op) => {
                merged.pop();
                merged.push(op);
            }
            None => merged.push(op),
        }
    }
    merged
}

fn span(old: Range<usize>, new: Range<usize>, equal: bool) -> DiffOp {
    match (equal, old.len(), new.len()) {
        (true, len, _) => DiffOp::Equal {
            old_index: old.start,
            new_index: new.start,
            len,
        },
        (false, old_len, 0) => DiffOp::Delete {
            old_index: old.start,
            old_len,
            new_index: new.start,
        },
        (false, 0, new_len) => DiffOp::Insert {
            old_index: old.start,
            new_index: new.start,
            new_len,
        },
        (false, old_len, new_len) => DiffOp::Replace {
            old_index: old.start,
            old_len,
            new_index: new.start,
            new_len,
        },
    }
}

/// Append the per-line edits of one op.
fn expand<'a>(op: &DiffOp, old: &[&'a str], new: &[&'a str], out: &mut Vec<Edit<'a>>) {
    let (tag, old_range, new_range) = op.as_tag_tuple();
    if tag == DiffTag::Equal {
        out.extend(
            old_range
                .zip(new_range)
                .map(|(i, j)| Edit::equal(old[i], i, j)),
        );
        return;
    }
    out.extend(old_range.map(|i| Edit::delete(old[i], i)));
    out.extend(new_range.map(|j| Edit::insert(new[j], j)));
}

// ──────────────────────────────────────────────
// DiffEngine
// ──────────────────────────────────────────────

/// [`diff`] bound to a context width, for callers that render repeatedly
/// with a configured setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffEngine {
    context: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        DiffEngine::new(DEFAULT_CONTEXT)
    }
}

impl DiffEngine {
    pub fn new(context: usize) -> Self {
        DiffEngine { context }
    }

    pub fn context(&self) -> usize {
        self.context
    }

    pub fn lines<'a>(&self, text: &'a str) -> Vec<&'a str> {
        lines(text)
    }

    pub fn diff<'a>(&self, before: &'a str, after: &'a str) -> TextDiff<'a> {
        diff(before, after)
    }

    pub fn hunks<'a>(&self, before: &'a str, after: &'a str) -> Vec<Hunk<'a>> {
        diff(before, after).hunks(self.context)
    }

    pub fn render(&self, before: &str, after: &str) -> String {
        diff(before, after).render(self.context)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
