// src/infrastructure/identity.rs
use crate::domain::bookmark::OwnerId;
use crate::domain::identity::IdentityProvider;

/// Identity taken from configuration (`--user`, `LINKSTASH_USER`, config file)
#[derive(Debug, Clone, Default)]
pub struct ConfiguredIdentity {
    user: Option<OwnerId>,
}

impl ConfiguredIdentity {
    pub fn new(user: Option<OwnerId>) -> Self {
        // blank names count as signed out
        let user = user.filter(|u| !u.as_str().trim().is_empty());
        Self { user }
    }
}

impl IdentityProvider for ConfiguredIdentity {
    fn current_user(&self) -> Option<OwnerId> {
        self.user.clone()
    }
}
