//! `limit` / `offset` pagination.

use crate::error::{CompileError, Result};

/// Pagination window; both bounds are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageSpec {
    /// Maximum number of root rows.
    pub limit: Option<u64>,
    /// Number of root rows to skip.
    pub offset: Option<u64>,
}

impl PageSpec {
    /// Parses the raw `limit` and `offset` values.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::InvalidPagination`] for anything that is not a
    /// non-negative decimal integer, including an empty value.
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Result<Self> {
        Ok(Self {
            limit: limit.map(|v| parse_bound("limit", v)).transpose()?,
            offset: offset.map(|v| parse_bound("offset", v)).transpose()?,
        })
    }
}

fn parse_bound(param: &'static str, value: &str) -> Result<u64> {
    // u64::from_str accepts a leading '+'; pagination does not.
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CompileError::InvalidPagination {
            param,
            value: value.to_string(),
        });
    }
    value.parse().map_err(|_| CompileError::InvalidPagination {
        param,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid() {
        let page = PageSpec::parse(Some("10"), Some("0")).unwrap();
        assert_eq!(page.limit, Some(10));
        assert_eq!(page.offset, Some(0));
        assert_eq!(PageSpec::parse(None, None).unwrap(), PageSpec::default());
    }

    #[test]
    fn test_invalid() {
        for (limit, offset, param) in [
            (Some("-1"), None, "limit"),
            (None, Some("abc"), "offset"),
            (Some(""), None, "limit"),
            (Some("+5"), None, "limit"),
            (Some("1.5"), None, "limit"),
            (None, Some("99999999999999999999999"), "offset"),
        ] {
            match PageSpec::parse(limit, offset) {
                Err(CompileError::InvalidPagination { param: p, .. }) => assert_eq!(p, param),
                other => panic!("expected InvalidPagination, got {other:?}"),
            }
        }
    }
}
