//! Recursive-descent parser for select expressions.
//!
//! ```text
//! expr     := field (',' field)*
//! field    := name modifier? ('(' expr? ')')?
//! modifier := '!inner' | '!left'
//! ```
//!
//! The same `expr` rule is used at every depth, so commas inside an embed's
//! column list never split the enclosing field.

use super::error::ParseError;
use super::node::{FieldNode, JoinType};
use super::span::Span;

/// Deepest embed nesting accepted before the parser gives up.
pub const MAX_NESTING_DEPTH: usize = 32;

/// Parses a select expression into its field tree.
///
/// An empty or all-whitespace expression selects every column of the root
/// table, exactly like an absent `select` parameter.
///
/// # Errors
///
/// Returns a [`ParseError`] for unbalanced parentheses, empty identifiers,
/// unknown `!modifier`s, or nesting deeper than [`MAX_NESTING_DEPTH`].
pub fn parse_select(input: &str) -> Result<Vec<FieldNode>, ParseError> {
    if input.trim().is_empty() {
        return Ok(vec![FieldNode::wildcard()]);
    }
    let mut parser = SelectParser::new(input);
    let fields = parser.parse_list()?;
    match parser.peek() {
        None => Ok(fields),
        Some(')') => Err(ParseError::unmatched_close(parser.char_span())),
        Some(c) => Err(ParseError::unexpected(c, parser.char_span())),
    }
}

struct SelectParser<'a> {
    input: &'a str,
    pos: usize,
    depth: usize,
}

impl<'a> SelectParser<'a> {
    const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn char_span(&self) -> Span {
        let width = self.peek().map_or(0, char::len_utf8);
        Span::new(self.pos, self.pos + width)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Consumes a run of characters matching `accept` and returns it with
    /// its span.
    fn take_while(&mut self, accept: impl Fn(char) -> bool) -> (&'a str, Span) {
        let start = self.pos;
        while self.peek().is_some_and(&accept) {
            self.advance();
        }
        (&self.input[start..self.pos], Span::new(start, self.pos))
    }

    /// Parses `field (',' field)*`, stopping before a `)` or end of input.
    fn parse_list(&mut self) -> Result<Vec<FieldNode>, ParseError> {
        let mut fields = Vec::new();
        loop {
            fields.push(self.parse_field()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                None | Some(')') => return Ok(fields),
                Some(c) => return Err(ParseError::unexpected(c, self.char_span())),
            }
        }
    }

    fn parse_field(&mut self) -> Result<FieldNode, ParseError> {
        self.skip_whitespace();
        let (name, name_span) = self.take_while(is_name_char);
        if name.is_empty() {
            return Err(ParseError::empty_identifier(name_span));
        }
        self.skip_whitespace();

        // The modifier is stripped before looking for '(' so that
        // `posts!inner(...)` is still recognised as an embed.
        let mut join = None;
        if self.peek() == Some('!') {
            let bang = self.pos;
            self.advance();
            self.skip_whitespace();
            let (modifier, span) = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
            let span = Span::new(bang, span.end);
            join = Some(
                JoinType::from_modifier(modifier)
                    .ok_or_else(|| ParseError::unknown_modifier(modifier, span))?,
            );
            self.skip_whitespace();
        }

        if self.peek() == Some('(') {
            let children = self.parse_children()?;
            return Ok(FieldNode::embed(name, join.unwrap_or_default(), children));
        }
        match join {
            Some(join) => Ok(FieldNode::embed(name, join, Vec::new())),
            None => Ok(FieldNode::column(name)),
        }
    }

    /// Parses `'(' expr? ')'`; the cursor sits on the `(`.
    fn parse_children(&mut self) -> Result<Vec<FieldNode>, ParseError> {
        let open = self.char_span();
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                format!("select nested deeper than {MAX_NESTING_DEPTH} levels"),
                open,
            ));
        }
        self.advance();
        self.skip_whitespace();

        let children = if self.peek() == Some(')') {
            Vec::new()
        } else {
            self.parse_list()?
        };
        if self.peek() != Some(')') {
            return Err(ParseError::unclosed(open));
        }
        self.advance();
        self.depth -= 1;
        Ok(children)
    }
}

fn is_name_char(c: char) -> bool {
    !c.is_whitespace() && !matches!(c, ',' | '(' | ')' | '!')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::node::DisplayFields;

    fn col(name: &str) -> FieldNode {
        FieldNode::column(name)
    }

    #[test]
    fn test_flat_columns() {
        let fields = parse_select("id,name,email").unwrap();
        assert_eq!(fields, vec![col("id"), col("name"), col("email")]);
    }

    #[test]
    fn test_empty_is_wildcard() {
        assert_eq!(parse_select("").unwrap(), vec![FieldNode::wildcard()]);
        assert_eq!(parse_select("   ").unwrap(), vec![FieldNode::wildcard()]);
    }

    #[test]
    fn test_inner_commas_do_not_split_outer_field() {
        let fields = parse_select("id,content,stats(id,views)").unwrap();
        assert_eq!(fields.len(), 3);
        assert_eq!(
            fields[2],
            FieldNode::embed("stats", JoinType::Left, vec![col("id"), col("views")])
        );

        let fields = parse_select("posts(id,content,stats(id,views))").unwrap();
        assert_eq!(fields.len(), 1);
        let posts = fields[0].as_embed().unwrap();
        assert_eq!(posts.children.len(), 3);
        let stats = posts.children[2].as_embed().unwrap();
        assert_eq!(stats.table, "stats");
        assert_eq!(stats.children, vec![col("id"), col("views")]);
    }

    #[test]
    fn test_inner_modifier_at_each_depth() {
        let fields = parse_select("id,posts!inner(id,content,stats(id,views))").unwrap();
        let posts = fields[1].as_embed().unwrap();
        assert_eq!(posts.table, "posts");
        assert_eq!(posts.join, JoinType::Inner);
        assert_eq!(posts.children[2].as_embed().unwrap().join, JoinType::Left);

        let fields = parse_select("id,posts(id,content,stats!inner(id,views))").unwrap();
        let posts = fields[1].as_embed().unwrap();
        assert_eq!(posts.join, JoinType::Left);
        let stats = posts.children[2].as_embed().unwrap();
        assert_eq!(stats.table, "stats");
        assert_eq!(stats.join, JoinType::Inner);
    }

    #[test]
    fn test_modifier_without_list_embeds_all_columns() {
        let fields = parse_select("title,directors!inner").unwrap();
        assert_eq!(
            fields[1],
            FieldNode::embed("directors", JoinType::Inner, vec![])
        );
        let fields = parse_select("title,directors!left,year").unwrap();
        assert_eq!(fields[1], FieldNode::embed("directors", JoinType::Left, vec![]));
        assert_eq!(fields[2], col("year"));
    }

    #[test]
    fn test_whitespace_is_ignored() {
        let spaced = parse_select(" id , posts !inner ( id , stats ( views ) ) ").unwrap();
        let tight = parse_select("id,posts!inner(id,stats(views))").unwrap();
        assert_eq!(spaced, tight);
    }

    #[test]
    fn test_empty_child_list() {
        let fields = parse_select("directors()").unwrap();
        assert_eq!(fields, vec![FieldNode::embed("directors", JoinType::Left, vec![])]);
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_select("posts(id,stats(views)").unwrap_err();
        assert_eq!(err.span, Span::new(5, 6));
        assert!(err.message.contains("unclosed"));

        let err = parse_select("id,name)").unwrap_err();
        assert_eq!(err.span, Span::new(7, 8));
        assert!(err.message.contains("unmatched"));

        let err = parse_select("posts(id))").unwrap_err();
        assert!(err.message.contains("unmatched"));
    }

    #[test]
    fn test_empty_identifiers() {
        for input in ["id,,name", "id,", "(id)", ",id", "posts(id,)", "posts(,id)"] {
            let err = parse_select(input).unwrap_err();
            assert_eq!(err.message, "empty identifier", "{input:?}");
        }
    }

    #[test]
    fn test_unknown_modifier() {
        let err = parse_select("posts!outer(id)").unwrap_err();
        assert_eq!(err.span, Span::new(5, 11));
        assert!(err.message.contains("!outer"));

        let err = parse_select("posts!(id)").unwrap_err();
        assert!(err.message.contains("unknown join modifier"));
    }

    #[test]
    fn test_garbage_after_field() {
        let err = parse_select("first name").unwrap_err();
        assert_eq!(err.span, Span::new(6, 7));
        let err = parse_select("posts(id)x").unwrap_err();
        assert_eq!(err.span, Span::new(9, 10));
    }

    #[test]
    fn test_nesting_limit() {
        let ok = format!("{}id{}", "a(".repeat(MAX_NESTING_DEPTH), ")".repeat(MAX_NESTING_DEPTH));
        assert!(parse_select(&ok).is_ok());

        let depth = MAX_NESTING_DEPTH + 1;
        let too_deep = format!("{}id{}", "a(".repeat(depth), ")".repeat(depth));
        let err = parse_select(&too_deep).unwrap_err();
        assert!(err.message.contains("nested deeper"));
    }

    #[test]
    fn test_reparse_of_pretty_form_is_identical() {
        for input in [
            "id,name",
            "*",
            "id,posts!inner(id,content,stats(id,views))",
            " title , directors ! inner , categories ( ) ",
            "a(b(c(d!inner(e,f),g)),h!left(i))",
        ] {
            let tree = parse_select(input).unwrap();
            let pretty = DisplayFields(&tree).to_string();
            assert_eq!(parse_select(&pretty).unwrap(), tree, "{input:?} -> {pretty:?}");
        }
    }
}
