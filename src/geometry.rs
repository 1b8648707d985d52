use crate::error::StructureError;
use crate::model::{BoundingBox, Token};

impl BoundingBox {
    /// Smallest box containing every token. The page is taken from the
    /// first token.
    pub fn enclosing(tokens: &[&Token]) -> Result<Self, StructureError> {
        let (first, rest) = tokens.split_first().ok_or(StructureError::EmptyInput)?;

        let seed = Self {
            top: first.position.top,
            left: first.position.left,
            right: first.position.right,
            bottom: first.position.bottom,
            page: first.page_num,
        };

        Ok(rest.iter().fold(seed, |merged, token| Self {
            top: merged.top.min(token.position.top),
            left: merged.left.min(token.position.left),
            right: merged.right.max(token.position.right),
            bottom: merged.bottom.max(token.position.bottom),
            page: merged.page,
        }))
    }
}
