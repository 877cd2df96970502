// ============================================================
// Layer 3 - Encoded Context Batch
// ============================================================
// The fixed-shape handoff between the context encoder and a
// predictor: `rows` windows of exactly `context_length` indices,
// stored row-major in one flat Vec so it can be turned into a
// [rows, context_length] tensor without copying row by row.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBatch {
    ids:            Vec<u32>,
    rows:           usize,
    context_length: usize,
}

impl EncodedBatch {
    pub fn new(context_length: usize) -> Self {
        Self { ids: Vec::new(), rows: 0, context_length }
    }

    pub fn with_capacity(rows: usize, context_length: usize) -> Self {
        Self {
            ids: Vec::with_capacity(rows * context_length),
            rows: 0,
            context_length,
        }
    }

    /// Append one window. Callers guarantee `row.len() == context_length`.
    pub fn push_row(&mut self, row: &[u32]) {
        debug_assert_eq!(row.len(), self.context_length);
        self.ids.extend_from_slice(row);
        self.rows += 1;
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn context_length(&self) -> usize {
        self.context_length
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn row(&self, i: usize) -> &[u32] {
        let start = i * self.context_length;
        &self.ids[start..start + self.context_length]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        // chunks_exact panics on 0; a zero-width context yields no rows
        self.ids.chunks_exact(self.context_length.max(1)).take(self.rows)
    }

    /// Flat row-major view.
    pub fn as_flat(&self) -> &[u32] {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_addressable() {
        let mut batch = EncodedBatch::with_capacity(2, 3);
        batch.push_row(&[1, 2, 3]);
        batch.push_row(&[4, 5, 6]);
        assert_eq!(batch.rows(), 2);
        assert_eq!(batch.row(1), &[4, 5, 6]);
        assert_eq!(batch.iter_rows().count(), 2);
        assert_eq!(batch.as_flat().len(), 6);
    }
}
