//! This file serves as the root for all SeaORM entity modules.
//! The identity schema lives in `user`, together with its manager and role views.

pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::user::Entity as User;
    pub use super::user::proxy::{Attendee, Guide, Organizer, RoleProxy};
}
