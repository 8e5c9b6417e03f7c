use uuid::Uuid;

use crate::models::user::Role;

/// An authenticated actor, derived fresh from a credential on every request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn new(id: Uuid, role: Role) -> Self {
        Principal { id, role }
    }

    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }

    pub fn is_seeker(&self) -> bool {
        self.role == Role::Seeker
    }
}
