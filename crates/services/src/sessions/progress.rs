/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionProgress {
    /// Zero-based position in the working list.
    pub index: usize,
    pub total: usize,
    /// Working-list questions currently marked answered.
    pub answered: usize,
    pub is_complete: bool,
}
