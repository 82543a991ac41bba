//! Word-level text diffing.
//!
//! Text runs are tokenized into words, whitespace runs and single
//! punctuation characters, then aligned with a longest-common-subsequence
//! table. Adjacent delete/insert runs collapse into a single replacement so
//! the pipeline can later group them as one changed pair.

/// One segment of a word-level diff, already coalesced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordSegment {
    /// Text present in both versions.
    Unchanged(String),
    /// Text only in the new version.
    Inserted(String),
    /// Text only in the old version.
    Deleted(String),
    /// Old text replaced by new text at the same position.
    Replaced { old: String, new: String },
}

/// Diff two text runs at word granularity.
pub fn diff_words(old: &str, new: &str) -> Vec<WordSegment> {
    if old == new {
        if old.is_empty() {
            return Vec::new();
        }
        return vec![WordSegment::Unchanged(old.to_string())];
    }

    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);
    let ops = lcs_ops(&old_tokens, &new_tokens);
    coalesce(&old_tokens, &new_tokens, &ops)
}

/// One step of an LCS alignment. Shared with the structural differ, which
/// aligns child-node keys with the same table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Op {
    Keep,
    Delete,
    Insert,
}

/// Split text into words, whitespace runs and punctuation singles.
///
/// Punctuation becomes its own token so trailing periods do not glue to the
/// preceding word and inflate the changed region.
fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut kind: Option<CharKind> = None;

    for (idx, ch) in text.char_indices() {
        let current = CharKind::of(ch);
        let split = match (kind, current) {
            (None, _) => false,
            (Some(CharKind::Punct), _) => true,
            (Some(prev), current) => prev != current,
        };
        if split {
            tokens.push(&text[start..idx]);
            start = idx;
        }
        kind = Some(current);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharKind {
    Word,
    Space,
    Punct,
}

impl CharKind {
    fn of(ch: char) -> Self {
        if ch.is_whitespace() {
            Self::Space
        } else if ch.is_alphanumeric() {
            Self::Word
        } else {
            Self::Punct
        }
    }
}

/// Standard LCS table walk producing keep/delete/insert ops in order.
pub(crate) fn lcs_ops<T: PartialEq>(old: &[T], new: &[T]) -> Vec<Op> {
    let n = old.len();
    let m = new.len();
    let mut table = vec![0u32; (n + 1) * (m + 1)];
    let at = |i: usize, j: usize| i * (m + 1) + j;

    for i in (0..n).rev() {
        for j in (0..m).rev() {
            table[at(i, j)] = if old[i] == new[j] {
                table[at(i + 1, j + 1)] + 1
            } else {
                table[at(i + 1, j)].max(table[at(i, j + 1)])
            };
        }
    }

    let mut ops = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            ops.push(Op::Keep);
            i += 1;
            j += 1;
        } else if table[at(i + 1, j)] >= table[at(i, j + 1)] {
            ops.push(Op::Delete);
            i += 1;
        } else {
            ops.push(Op::Insert);
            j += 1;
        }
    }
    ops.extend(std::iter::repeat(Op::Delete).take(n - i));
    ops.extend(std::iter::repeat(Op::Insert).take(m - j));
    ops
}

/// Collapse op runs into segments, merging delete+insert runs at the same
/// position into replacements.
fn coalesce(old: &[&str], new: &[&str], ops: &[Op]) -> Vec<WordSegment> {
    let mut segments = Vec::new();
    let (mut i, mut j) = (0, 0);
    let mut cursor = 0;

    while cursor < ops.len() {
        match ops[cursor] {
            Op::Keep => {
                let mut text = String::new();
                while cursor < ops.len() && ops[cursor] == Op::Keep {
                    text.push_str(old[i]);
                    i += 1;
                    j += 1;
                    cursor += 1;
                }
                segments.push(WordSegment::Unchanged(text));
            }
            Op::Delete | Op::Insert => {
                let mut deleted = String::new();
                let mut inserted = String::new();
                while cursor < ops.len() && ops[cursor] != Op::Keep {
                    match ops[cursor] {
                        Op::Delete => {
                            deleted.push_str(old[i]);
                            i += 1;
                        }
                        Op::Insert => {
                            inserted.push_str(new[j]);
                            j += 1;
                        }
                        Op::Keep => unreachable!(),
                    }
                    cursor += 1;
                }
                match (deleted.is_empty(), inserted.is_empty()) {
                    (false, false) => segments.push(WordSegment::Replaced {
                        old: deleted,
                        new: inserted,
                    }),
                    (false, true) => segments.push(WordSegment::Deleted(deleted)),
                    (true, false) => segments.push(WordSegment::Inserted(inserted)),
                    (true, true) => {}
                }
            }
        }
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text() {
        let segments = diff_words("same text", "same text");
        assert_eq!(segments, vec![WordSegment::Unchanged("same text".into())]);
    }

    #[test]
    fn test_pure_insertion() {
        let segments = diff_words("The sky is blue.", "The sky is very blue today.");
        assert_eq!(
            segments,
            vec![
                WordSegment::Unchanged("The sky is ".into()),
                WordSegment::Inserted("very ".into()),
                WordSegment::Unchanged("blue".into()),
                WordSegment::Inserted(" today".into()),
                WordSegment::Unchanged(".".into()),
            ]
        );
    }

    #[test]
    fn test_pure_deletion() {
        let segments = diff_words("a very blue sky", "a blue sky");
        assert_eq!(
            segments,
            vec![
                WordSegment::Unchanged("a ".into()),
                WordSegment::Deleted("very ".into()),
                WordSegment::Unchanged("blue sky".into()),
            ]
        );
    }

    #[test]
    fn test_replacement() {
        let segments = diff_words("the red sky", "the green sky");
        assert_eq!(
            segments,
            vec![
                WordSegment::Unchanged("the ".into()),
                WordSegment::Replaced {
                    old: "red".into(),
                    new: "green".into(),
                },
                WordSegment::Unchanged(" sky".into()),
            ]
        );
    }

    #[test]
    fn test_empty_inputs() {
        assert!(diff_words("", "").is_empty());
        assert_eq!(
            diff_words("", "new"),
            vec![WordSegment::Inserted("new".into())]
        );
        assert_eq!(
            diff_words("old", ""),
            vec![WordSegment::Deleted("old".into())]
        );
    }

    #[test]
    fn test_tokenize_separates_punctuation() {
        assert_eq!(tokenize("blue."), vec!["blue", "."]);
        assert_eq!(tokenize("a b"), vec!["a", " ", "b"]);
        assert_eq!(tokenize("x, y"), vec!["x", ",", " ", "y"]);
    }

    #[test]
    fn test_tokenize_multibyte() {
        assert_eq!(tokenize("café au lait"), vec!["café", " ", "au", " ", "lait"]);
    }
}
