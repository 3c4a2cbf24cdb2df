//! View state errors

/// Errors from view state operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UiError {
    /// Theme name is neither `day` nor `night`
    #[error("unknown theme '{0}'")]
    UnknownTheme(String),

    /// Tree path does not lead to a node
    #[error("no tree node at path {0:?}")]
    NoSuchNode(Vec<usize>),

    /// Suggestion index out of range
    #[error("no suggestion at index {0}")]
    NoSuchSuggestion(usize),
}
