//! Limit executor implementation.
//!
//! Applies a statement's `TOP` limit after sorting: a positive limit keeps
//! that many rows, `0` keeps none and a negative limit keeps all of them.

/// Executor that limits the number of rows returned
#[derive(Debug, Clone, Copy)]
pub struct LimitExecutor {
    limit: i32,
}

impl LimitExecutor {
    pub fn new(limit: i32) -> Self {
        Self { limit }
    }

    pub fn execute(&self, rows: &mut Vec<usize>) {
        if let Ok(limit) = usize::try_from(self.limit) {
            rows.truncate(limit);
        }
    }
}
