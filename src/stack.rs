//! Per-resolution construction tracking
//!
//! A [`ConstructionStack`] lives for exactly one top-level resolve call and
//! records which identities are currently being built. Entering an identity
//! that is already on the stack means the graph is cyclic.

use crate::{DiError, Result, ServiceIdentity};

/// Ordered set of identities under construction in the current call chain
#[derive(Debug, Default)]
pub struct ConstructionStack {
    frames: Vec<ServiceIdentity>,
}

impl ConstructionStack {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `identity` is currently under construction
    #[inline]
    pub fn contains(&self, identity: &ServiceIdentity) -> bool {
        self.frames.contains(identity)
    }

    /// Mark `identity` as under construction.
    ///
    /// Fails with [`DiError::CircularDependency`] if it already is; the stack
    /// is left untouched in that case.
    pub fn push(&mut self, identity: ServiceIdentity) -> Result<()> {
        if let Some(start) = self.frames.iter().position(|frame| *frame == identity) {
            let chain = self.frames[start..]
                .iter()
                .chain(std::iter::once(&identity))
                .map(ServiceIdentity::type_name)
                .collect();
            return Err(DiError::circular(identity, chain));
        }
        self.frames.push(identity);
        Ok(())
    }

    /// Unmark the innermost identity
    #[inline]
    pub fn pop(&mut self, identity: ServiceIdentity) {
        let popped = self.frames.pop();
        debug_assert_eq!(popped, Some(identity), "construction stack popped out of order");
    }

    /// Number of identities under construction
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Type names from outermost to innermost
    pub fn chain(&self) -> Vec<&'static str> {
        self.frames.iter().map(ServiceIdentity::type_name).collect()
    }
}
