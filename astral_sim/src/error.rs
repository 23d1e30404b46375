//! Errors surfaced by the simulation core

use thiserror::Error;

use crate::EntityId;

/// Identity conflicts are the only failures the core reports; everything else
/// (missing ids, coincident bodies, massless tracers) is resolved locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    #[error("physics body {0} is already registered")]
    DuplicateBody(EntityId),

    #[error("entity {0} already exists")]
    DuplicateEntity(EntityId),
}
