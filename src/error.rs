//! Error types for dependency injection

use thiserror::Error;

/// Errors that can occur during dependency injection operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiError {
    /// A token re-entered the resolution chain of the container resolving it
    #[error("Circular dependency '{dependency}' found while resolving {}", .chain.join(" => "))]
    CircularDependency {
        dependency: String,
        /// Names in resolution order, ending with the repeated name
        chain: Vec<String>,
    },

    /// Neither the container nor any ancestor registers the token
    #[error(
        "Unresolved dependency '{dependency}', did you register this token in this container or in a parent container?"
    )]
    UnregisteredToken { dependency: String },

    /// The resolved instance is not of the requested type
    #[error("Token '{name}' does not hold an instance of {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    /// A constructor or factory refused to build its instance
    #[error("Failed to create '{name}': {reason}")]
    CreationFailed { name: String, reason: String },
}

impl DiError {
    /// Create a CircularDependency error from the active chain
    pub fn circular(dependency: impl Into<String>, active: &[String]) -> Self {
        let dependency = dependency.into();
        let mut chain = active.to_vec();
        chain.push(dependency.clone());
        Self::CircularDependency { dependency, chain }
    }

    /// Create an UnregisteredToken error
    #[inline]
    pub fn unregistered(dependency: impl Into<String>) -> Self {
        Self::UnregisteredToken {
            dependency: dependency.into(),
        }
    }

    /// Create a TypeMismatch error for a type
    #[inline]
    pub fn type_mismatch<T: 'static>(name: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: std::any::type_name::<T>(),
        }
    }

    /// Create a CreationFailed error
    #[inline]
    pub fn creation_failed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is an unregistered-token error for `name` itself
    /// (as opposed to one of its transitive dependencies).
    pub fn is_unregistered(&self, name: &str) -> bool {
        matches!(self, Self::UnregisteredToken { dependency } if dependency == name)
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_message_lists_chain() {
        let err = DiError::circular("a", &["a".to_string(), "b".to_string()]);
        assert_eq!(
            err.to_string(),
            "Circular dependency 'a' found while resolving a => b => a"
        );
        match err {
            DiError::CircularDependency { chain, .. } => assert_eq!(chain, ["a", "b", "a"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unregistered_message_names_dependency() {
        let err = DiError::unregistered("db");
        assert!(err.to_string().starts_with("Unresolved dependency 'db'"));
        assert!(err.is_unregistered("db"));
        assert!(!err.is_unregistered("cache"));
    }

    #[test]
    fn test_type_mismatch_names_type() {
        let err = DiError::type_mismatch::<u32>("count");
        assert_eq!(err.to_string(), "Token 'count' does not hold an instance of u32");
    }
}
