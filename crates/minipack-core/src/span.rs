/// A region of source text, tracked for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// 1-based line of the start offset
    pub line: usize,
    /// 1-based column of the start offset
    pub column: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, column: usize) -> Self {
        Span {
            start,
            end,
            line,
            column,
        }
    }

    /// A span covering no source, for synthesized nodes
    pub fn dummy() -> Self {
        Span::new(0, 0, 1, 1)
    }

    /// Combine two spans into one covering both; the combined span
    /// starts at whichever position comes first by line then column
    pub fn combine(&self, other: &Span) -> Span {
        let (line, column) = if (other.line, other.column) < (self.line, self.column) {
            (other.line, other.column)
        } else {
            (self.line, self.column)
        };
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line,
            column,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combine_spans() {
        let a = Span::new(0, 5, 1, 1);
        let b = Span::new(10, 20, 2, 3);
        let combined = a.combine(&b);
        assert_eq!(combined.start, 0);
        assert_eq!(combined.end, 20);
        assert_eq!(combined.line, 1);
    }

    #[test]
    fn test_combine_takes_earlier_column_on_same_line() {
        let later = Span::new(8, 12, 1, 9);
        let earlier = Span::new(0, 5, 1, 1);
        let combined = later.combine(&earlier);
        assert_eq!(combined.line, 1);
        assert_eq!(combined.column, 1);
    }

    #[test]
    fn test_display() {
        let span = Span::new(4, 9, 3, 7);
        assert_eq!(span.to_string(), "3:7");
    }
}
