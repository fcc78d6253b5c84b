//! Structural diff rendering.
//!
//! Both sides are serialized with [`ConfigValue::canonical_text`] and aligned
//! line by line with an LCS edit script. Within a `replace` block, line pairs
//! that are similar enough are aligned again character by character so only
//! the differing spans are highlighted; dissimilar pairs are marked as whole
//! removed/added lines.
//!
//! Lines carrying an obfuscated digest never take the character path: a
//! partial match between two digests would say something about the values
//! behind them.

use pd_common::ConfigValue;
use pd_redact::is_obfuscated_placeholder;
use serde::{Deserialize, Serialize};
use similar::{capture_diff_slices, get_diff_ratio, Algorithm, DiffTag};

/// Default similarity above which a replaced line pair is diffed inline.
pub const DEFAULT_INLINE_THRESHOLD: f32 = 0.5;

/// Which side of a comparison a [`Markup`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkupSide {
    Baseline,
    Candidate,
}

/// How one rendered line relates to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineChange {
    Unchanged,
    /// Only on the candidate side.
    Added,
    /// Only on the baseline side.
    Removed,
    /// Present on both sides with inline differences.
    Modified,
}

/// A run of text, highlighted when it differs from the other side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: false,
        }
    }

    fn marked(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            highlighted: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupLine {
    pub change: LineChange,
    pub segments: Vec<Segment>,
}

impl MarkupLine {
    fn unchanged(text: &str) -> Self {
        Self {
            change: LineChange::Unchanged,
            segments: vec![Segment::plain(text)],
        }
    }

    fn whole(change: LineChange, text: &str) -> Self {
        Self {
            change,
            segments: vec![Segment::marked(text)],
        }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// Highlighted rendering of one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markup {
    pub side: MarkupSide,
    pub lines: Vec<MarkupLine>,
}

impl Markup {
    pub fn empty(side: MarkupSide) -> Self {
        Self {
            side,
            lines: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn has_highlights(&self) -> bool {
        self.lines
            .iter()
            .any(|l| l.segments.iter().any(|s| s.highlighted))
    }

    /// The rendered text without any markers.
    pub fn plain_text(&self) -> String {
        self.lines
            .iter()
            .map(MarkupLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text with highlighted spans wrapped in `[- -]` (baseline) or `[+ +]`
    /// (candidate), for plain-text renderers.
    pub fn to_marked_text(&self) -> String {
        let (open, close) = match self.side {
            MarkupSide::Baseline => ("[-", "-]"),
            MarkupSide::Candidate => ("[+", "+]"),
        };
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            for segment in &line.segments {
                if segment.highlighted {
                    out.push_str(open);
                    out.push_str(&segment.text);
                    out.push_str(close);
                } else {
                    out.push_str(&segment.text);
                }
            }
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Replaced line pairs with a similarity ratio strictly above this are
    /// highlighted inline.
    pub inline_threshold: f32,
    /// When false, replaced lines are always marked whole.
    pub char_level: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_threshold: DEFAULT_INLINE_THRESHOLD,
            char_level: true,
        }
    }
}

/// Render `baseline` against `candidate` with default options.
///
/// `None` means the value does not exist on that side: every line of the
/// other side is then marked wholesale.
pub fn render(baseline: Option<&ConfigValue>, candidate: Option<&ConfigValue>) -> (Markup, Markup) {
    render_with(&RenderOptions::default(), baseline, candidate)
}

pub fn render_with(
    options: &RenderOptions,
    baseline: Option<&ConfigValue>,
    candidate: Option<&ConfigValue>,
) -> (Markup, Markup) {
    let mut left = Markup::empty(MarkupSide::Baseline);
    let mut right = Markup::empty(MarkupSide::Candidate);

    let old_text = baseline.map(ConfigValue::canonical_text);
    let new_text = candidate.map(ConfigValue::canonical_text);

    match (&old_text, &new_text) {
        (None, None) => {}
        (Some(old), None) => {
            left.lines = old
                .lines()
                .map(|l| MarkupLine::whole(LineChange::Removed, l))
                .collect();
        }
        (None, Some(new)) => {
            right.lines = new
                .lines()
                .map(|l| MarkupLine::whole(LineChange::Added, l))
                .collect();
        }
        (Some(old), Some(new)) => {
            let old_lines: Vec<&str> = old.lines().collect();
            let new_lines: Vec<&str> = new.lines().collect();
            align_lines(options, &old_lines, &new_lines, &mut left, &mut right);
        }
    }

    (left, right)
}

fn align_lines(
    options: &RenderOptions,
    old_lines: &[&str],
    new_lines: &[&str],
    left: &mut Markup,
    right: &mut Markup,
) {
    let ops = capture_diff_slices(Algorithm::Lcs, old_lines, new_lines);
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match tag {
            DiffTag::Equal => {
                for l in &old_lines[old_range] {
                    left.lines.push(MarkupLine::unchanged(l));
                }
                for l in &new_lines[new_range] {
                    right.lines.push(MarkupLine::unchanged(l));
                }
            }
            DiffTag::Delete => {
                for l in &old_lines[old_range] {
                    left.lines.push(MarkupLine::whole(LineChange::Removed, l));
                }
            }
            DiffTag::Insert => {
                for l in &new_lines[new_range] {
                    right.lines.push(MarkupLine::whole(LineChange::Added, l));
                }
            }
            DiffTag::Replace => {
                let olds = &old_lines[old_range];
                let news = &new_lines[new_range];
                let paired = olds.len().min(news.len());
                for (o, n) in olds.iter().zip(news.iter()) {
                    let (l, r) = render_line_pair(options, o, n);
                    left.lines.push(l);
                    right.lines.push(r);
                }
                for l in &olds[paired..] {
                    left.lines.push(MarkupLine::whole(LineChange::Removed, l));
                }
                for l in &news[paired..] {
                    right.lines.push(MarkupLine::whole(LineChange::Added, l));
                }
            }
        }
    }
}

fn render_line_pair(options: &RenderOptions, old: &str, new: &str) -> (MarkupLine, MarkupLine) {
    let whole = || {
        (
            MarkupLine::whole(LineChange::Removed, old),
            MarkupLine::whole(LineChange::Added, new),
        )
    };

    if !options.char_level || is_obfuscated_placeholder(old) || is_obfuscated_placeholder(new) {
        return whole();
    }

    let old_chars: Vec<char> = old.chars().collect();
    let new_chars: Vec<char> = new.chars().collect();
    let ops = capture_diff_slices(Algorithm::Lcs, &old_chars, &new_chars);
    let ratio = get_diff_ratio(&ops, old_chars.len(), new_chars.len());
    if ratio <= options.inline_threshold {
        return whole();
    }

    let mut left = SegmentBuilder::default();
    let mut right = SegmentBuilder::default();
    for op in &ops {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        let old_span: String = old_chars[old_range].iter().collect();
        let new_span: String = new_chars[new_range].iter().collect();
        match tag {
            DiffTag::Equal => {
                left.push(&old_span, false);
                right.push(&new_span, false);
            }
            DiffTag::Delete => left.push(&old_span, true),
            DiffTag::Insert => right.push(&new_span, true),
            DiffTag::Replace => {
                left.push(&old_span, true);
                right.push(&new_span, true);
            }
        }
    }

    (left.finish(), right.finish())
}

/// Accumulates segments, merging neighbours with the same highlight flag.
#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<Segment>,
}

impl SegmentBuilder {
    fn push(&mut self, text: &str, highlighted: bool) {
        if text.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(last) if last.highlighted == highlighted => last.text.push_str(text),
            _ => self.segments.push(Segment {
                text: text.to_string(),
                highlighted,
            }),
        }
    }

    fn finish(self) -> MarkupLine {
        let change = if self.segments.iter().any(|s| s.highlighted) {
            LineChange::Modified
        } else {
            LineChange::Unchanged
        };
        MarkupLine {
            change,
            segments: self.segments,
        }
    }
}
