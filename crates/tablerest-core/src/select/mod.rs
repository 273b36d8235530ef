//! The `select` grammar: a comma-separated list of columns and embeds.
//!
//! ```text
//! id,name,posts!inner(id,content,stats(id,views))
//! ```

mod error;
mod node;
mod parser;
mod span;

pub use error::ParseError;
pub use node::{DisplayFields, EmbedNode, FieldNode, JoinType};
pub use parser::{parse_select, MAX_NESTING_DEPTH};
pub use span::Span;
