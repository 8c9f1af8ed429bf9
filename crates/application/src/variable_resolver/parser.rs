//! Expression scanner for `~{...}` and `${...}` syntax
//!
//! Locates prefixed bracketed expressions inside strings, one at a time.

use std::ops::Range;

/// The two expression languages found in descriptor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExpressionKind {
    /// `~{provider/name}` - a property of a related provider.
    Variable,
    /// `${name}` - a parameter from the scope chain.
    Placeholder,
}

impl ExpressionKind {
    /// Returns the prefix character introducing the expression.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Variable => '~',
            Self::Placeholder => '$',
        }
    }

    /// Renders `name` back into expression syntax, e.g. `~{name}`.
    #[must_use]
    pub fn literal(self, name: &str) -> String {
        format!("{}{{{name}}}", self.prefix())
    }
}

/// An expression found by [`find_expression`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionMatch {
    /// The text between the delimiters.
    pub name: String,

    /// Byte range of the whole expression, delimiters included.
    pub span: Range<usize>,

    /// Whether the expression is the entire subject string.
    pub whole: bool,
}

/// Finds the next `prefix{...}` expression at or after byte offset `start`.
///
/// When the opening is doubled (`~{{` or `${{`) the terminator is `}}`, so
/// the name may contain a single `}`: `~{{a}b}}` yields the name `a}b`.
/// Returns `None` when no complete expression follows `start`.
///
/// # Examples
///
/// ```
/// use mta_application::variable_resolver::parser::find_expression;
///
/// let found = find_expression("url: ${host}/api", 0, '$').unwrap();
/// assert_eq!(found.name, "host");
/// assert_eq!(found.span, 5..12);
/// assert!(!found.whole);
/// ```
#[must_use]
pub fn find_expression(subject: &str, start: usize, prefix: char) -> Option<ExpressionMatch> {
    let tail = subject.get(start..)?;
    let opening = format!("{prefix}{{");
    let begin = start + tail.find(&opening)?;
    let mut inner_start = begin + opening.len();

    let terminator = if subject[inner_start..].starts_with('{') {
        inner_start += 1;
        "}}"
    } else {
        "}"
    };

    let inner_end = inner_start + subject[inner_start..].find(terminator)?;
    let end = inner_end + terminator.len();

    Some(ExpressionMatch {
        name: subject[inner_start..inner_end].to_string(),
        span: begin..end,
        whole: begin == 0 && end == subject.len(),
    })
}
