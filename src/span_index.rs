use crate::model::Token;

#[derive(Debug, Clone)]
pub struct SpanIndex<'a> {
    tokens: Vec<&'a Token>,
}

impl<'a> SpanIndex<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token]) -> Self {
        let mut tokens = tokens.iter().collect::<Vec<_>>();
        tokens.sort_by_key(|token| (token.doc_offsets.start, token.doc_offsets.end));
        Self { tokens }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Every token whose `[start, end)` range intersects
    /// `[query_start, query_end)`, ordered by token offset.
    #[must_use]
    pub fn find_overlaps(&self, query_start: usize, query_end: usize) -> Vec<&'a Token> {
        let upper = self
            .tokens
            .partition_point(|token| token.doc_offsets.start < query_end);

        self.tokens[..upper]
            .iter()
            .copied()
            .filter(|token| token.doc_offsets.end > query_start)
            .collect()
    }
}
