//! Role views over the users table.
//!
//! `Organizer`, `Guide` and `Attendee` add no table of their own. Each one only
//! carries a base role, and its manager filters on that role and assigns it to
//! every user created through the view.

use super::Role;
use super::manager::UserManager;

pub trait RoleProxy {
    const BASE_ROLE: Role;

    fn objects() -> UserManager {
        UserManager::scoped(Self::BASE_ROLE)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Organizer;

impl RoleProxy for Organizer {
    const BASE_ROLE: Role = Role::Organizer;
}

#[derive(Debug, Clone, Copy)]
pub struct Guide;

impl RoleProxy for Guide {
    const BASE_ROLE: Role = Role::Guide;
}

#[derive(Debug, Clone, Copy)]
pub struct Attendee;

impl RoleProxy for Attendee {
    const BASE_ROLE: Role = Role::Attendee;
}

/// Manager of the view matching a role known only at runtime.
pub fn proxy_for(role: Role) -> UserManager {
    match role {
        Role::Organizer => Organizer::objects(),
        Role::Guide => Guide::objects(),
        Role::Attendee => Attendee::objects(),
    }
}
