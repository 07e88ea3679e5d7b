// src/domain/identity.rs
use crate::domain::bookmark::OwnerId;
use std::fmt::Debug;

/// Supplies the currently signed-in user, if any
pub trait IdentityProvider: Send + Sync + Debug {
    fn current_user(&self) -> Option<OwnerId>;
}
