use std::path::PathBuf;

use kilnbook_core::CoreError;
use kilnbook_query::QueryError;

/// Coarse classification of a [`StudioError`] for presentation layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    Validation,
    DanglingReference,
    IndexCorruption,
    Persistence,
    Conflict,
    AmbiguousId,
    NotInitialized,
    InvalidInput,
    Io,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Validation => "validation",
            ErrorKind::DanglingReference => "dangling_reference",
            ErrorKind::IndexCorruption => "index_corruption",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Conflict => "conflict",
            ErrorKind::AmbiguousId => "ambiguous_id",
            ErrorKind::NotInitialized => "not_initialized",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Io => "io",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StudioError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StudioError::Core(e) => core_kind(e),
            StudioError::Query(QueryError::Core(e)) => core_kind(e),
            StudioError::Query(QueryError::IndexCorruption(_)) => ErrorKind::IndexCorruption,
            StudioError::Query(_) => ErrorKind::InvalidInput,
            StudioError::File { .. } => ErrorKind::Io,
        }
    }
}

fn core_kind(error: &CoreError) -> ErrorKind {
    match error {
        CoreError::NotFound { .. } => ErrorKind::NotFound,
        CoreError::Validation { .. } => ErrorKind::Validation,
        CoreError::DanglingReference { .. } => ErrorKind::DanglingReference,
        CoreError::Conflict { .. } => ErrorKind::Conflict,
        CoreError::AmbiguousId { .. } => ErrorKind::AmbiguousId,
        CoreError::Persistence { .. } => ErrorKind::Persistence,
        CoreError::NotInitialized => ErrorKind::NotInitialized,
        CoreError::Io(_) => ErrorKind::Io,
        CoreError::Config(_)
        | CoreError::Json(_)
        | CoreError::Parse(_)
        | CoreError::InvalidId(_) => ErrorKind::InvalidInput,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kilnbook_core::model::EntityKind;

    #[test]
    fn test_kind_sees_through_query_errors() {
        let err = StudioError::from(QueryError::Core(CoreError::NotFound {
            kind: EntityKind::Goal,
            id: "abc".into(),
        }));
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(
            StudioError::from(QueryError::IndexCorruption("x".into())).kind(),
            ErrorKind::IndexCorruption
        );
    }
}
