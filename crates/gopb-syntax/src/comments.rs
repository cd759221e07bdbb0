//! Association of comments with declarations.
//!
//! Comments on consecutive lines form a group. The group ending on the line
//! directly above a declaration is its doc comment; a comment that starts
//! after a token on the same line is that line's trailing comment.

use crate::token::Comment;

#[derive(Debug)]
struct CommentGroup {
    end_line: usize,
    comments: Vec<Comment>,
}

#[derive(Debug, Default)]
pub(crate) struct CommentMap {
    groups: Vec<CommentGroup>,
    trailing: Vec<Comment>,
}

impl CommentMap {
    pub(crate) fn new(comments: Vec<Comment>) -> Self {
        let mut map = Self::default();
        for comment in comments {
            if comment.trailing {
                map.trailing.push(comment);
                continue;
            }
            match map.groups.last_mut() {
                Some(group) if group.end_line + 1 >= comment.line => {
                    group.end_line = comment.end_line;
                    group.comments.push(comment);
                }
                _ => map.groups.push(CommentGroup {
                    end_line: comment.end_line,
                    comments: vec![comment],
                }),
            }
        }
        map
    }

    /// Text of the comment group ending directly above `line`.
    pub(crate) fn doc_before(&self, line: usize) -> String {
        self.groups
            .iter()
            .find(|group| group.end_line + 1 == line)
            .map(|group| comment_text(&group.comments))
            .unwrap_or_default()
    }

    /// Text of the trailing comment on `line`.
    pub(crate) fn trailing_on(&self, line: usize) -> String {
        self.trailing
            .iter()
            .find(|comment| comment.line == line)
            .map(|comment| comment_text(std::slice::from_ref(comment)))
            .unwrap_or_default()
    }
}

/// Renders comments the way Go's `CommentGroup.Text` does.
///
/// Markers and the first space of line comments are removed, as are
/// directive lines (`//go:generate`, `//line ...`). Trailing spaces are
/// trimmed, leading and trailing blank lines dropped and runs of blank lines
/// collapsed. Non-empty results end with a newline.
pub(crate) fn comment_text(comments: &[Comment]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for comment in comments {
        if let Some(body) = comment.text.strip_prefix("//") {
            if is_directive(body) {
                continue;
            }
            let body = body.strip_prefix(' ').unwrap_or(body);
            lines.push(body.trim_end().to_owned());
        } else {
            let body = comment
                .text
                .strip_prefix("/*")
                .and_then(|b| b.strip_suffix("*/"))
                .unwrap_or(&comment.text);
            lines.extend(body.lines().map(|l| l.trim_end().to_owned()));
        }
    }

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    for line in &lines {
        let blank = line.is_empty();
        if blank && out.last().is_none_or(|prev| prev.is_empty()) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(|line| line.is_empty()) {
        out.pop();
    }

    if out.is_empty() {
        return String::new();
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// `//line` and `//tool:directive` comments are not documentation.
fn is_directive(body: &str) -> bool {
    if body.starts_with("line ") {
        return true;
    }
    let Some((tool, rest)) = body.split_once(':') else {
        return false;
    };
    !tool.is_empty()
        && tool
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        && rest
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}
