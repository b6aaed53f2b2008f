//! Error types for dependency resolution

use crate::ServiceIdentity;
use thiserror::Error;

/// Errors that can occur while registering or resolving services
#[derive(Error, Debug, Clone)]
pub enum DiError {
    /// No registration exists for the requested service
    #[error("Service not registered: {type_name}")]
    NotRegistered { type_name: &'static str },

    /// The service is already under construction higher in the same resolution chain
    #[error("Circular dependency detected while resolving {type_name}: {}", .chain.join(" -> "))]
    CircularDependency {
        type_name: &'static str,
        /// Identities from the first occurrence of `type_name` up to its repetition
        chain: Vec<&'static str>,
    },

    /// An eager singleton could not be built at registration time
    #[error("Failed to construct eager singleton {type_name}: {source}")]
    EagerConstructionFailed {
        type_name: &'static str,
        #[source]
        source: Box<DiError>,
    },

    /// A producer rejected the dependencies it was given
    #[error("Failed to create service {type_name}: {reason}")]
    CreationFailed {
        type_name: &'static str,
        reason: String,
    },

    /// Internal error
    #[error("Internal DI error: {0}")]
    Internal(String),
}

impl DiError {
    /// Create a NotRegistered error for an identity
    #[inline]
    pub fn not_registered(identity: ServiceIdentity) -> Self {
        Self::NotRegistered {
            type_name: identity.type_name(),
        }
    }

    /// Create a CircularDependency error
    #[inline]
    pub fn circular(identity: ServiceIdentity, chain: Vec<&'static str>) -> Self {
        Self::CircularDependency {
            type_name: identity.type_name(),
            chain,
        }
    }

    /// Create a CreationFailed error for a type
    #[inline]
    pub fn creation_failed<T: ?Sized + 'static>(reason: impl Into<String>) -> Self {
        Self::CreationFailed {
            type_name: std::any::type_name::<T>(),
            reason: reason.into(),
        }
    }

    /// Wrap a construction failure of an eager singleton
    #[inline]
    pub fn eager_construction_failed(identity: ServiceIdentity, source: DiError) -> Self {
        Self::EagerConstructionFailed {
            type_name: identity.type_name(),
            source: Box::new(source),
        }
    }

    /// True for errors caused by a dependency cycle, including wrapped ones
    pub fn is_circular(&self) -> bool {
        match self {
            Self::CircularDependency { .. } => true,
            Self::EagerConstructionFailed { source, .. } => source.is_circular(),
            _ => false,
        }
    }
}

/// Result type alias for DI operations
pub type Result<T> = std::result::Result<T, DiError>;

#[cfg(test)]
mod tests {
    use super::*;

    trait Repository {}

    #[test]
    fn test_circular_message_lists_chain() {
        let err = DiError::circular(
            ServiceIdentity::of::<dyn Repository>(),
            vec!["A", "B", "A"],
        );
        assert!(err.to_string().ends_with("A -> B -> A"));
        assert!(err.is_circular());
    }

    #[test]
    fn test_eager_failure_keeps_source() {
        let inner = DiError::not_registered(ServiceIdentity::of::<u8>());
        let err = DiError::eager_construction_failed(ServiceIdentity::of::<u16>(), inner);

        assert!(!err.is_circular());
        let source = std::error::Error::source(&err).map(|e| e.to_string());
        assert_eq!(source.as_deref(), Some("Service not registered: u8"));
    }
}
