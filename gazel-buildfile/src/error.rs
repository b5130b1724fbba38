use thiserror::Error;

/// Syntax error in a BUILD file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{file}:{line}:{column}: {message}")]
pub struct ParseError {
    pub file: String,
    /// 1-based.
    pub line: usize,
    /// 1-based, in bytes.
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at_offset(
        file: &str,
        src: &[u8],
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        let offset = offset.min(src.len());
        let before = &src[..offset];
        let line = before.iter().filter(|b| **b == b'\n').count() + 1;
        let line_start = before
            .iter()
            .rposition(|b| *b == b'\n')
            .map(|i| i + 1)
            .unwrap_or(0);
        Self {
            file: file.to_string(),
            line,
            column: offset - line_start + 1,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_maps_to_line_and_column() {
        let src = b"a()\nbb(\n  ?";
        let err = ParseError::at_offset("BUILD", src, 10, "unexpected character");
        assert_eq!((err.line, err.column), (3, 3));
        assert_eq!(err.to_string(), "BUILD:3:3: unexpected character");
    }

    #[test]
    fn offset_past_end_is_clamped() {
        let err = ParseError::at_offset("BUILD", b"x", 99, "unexpected end of file");
        assert_eq!((err.line, err.column), (1, 2));
    }
}
