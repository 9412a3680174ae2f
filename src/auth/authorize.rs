//! Authorization checks shared by web handlers and services.

use uuid::Uuid;

use super::session::SessionUser;
use crate::db::models::{Greenhouse, Role};

/// Entities with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Greenhouse {
    fn owner_id(&self) -> Uuid {
        self.owner_id
    }
}

pub fn is_authenticated(session: Option<&SessionUser>) -> bool {
    session.is_some()
}

pub fn has_role(session: Option<&SessionUser>, role: Role) -> bool {
    session.is_some_and(|s| s.role == role)
}

pub fn is_owner<E: Owned + ?Sized>(entity: &E, user: &SessionUser) -> bool {
    entity.owner_id() == user.user_id
}

/// Owner of `entity`, or anyone holding `role`.
pub fn is_owner_or_role<E: Owned + ?Sized>(entity: &E, user: &SessionUser, role: Role) -> bool {
    is_owner(entity, user) || user.role == role
}
