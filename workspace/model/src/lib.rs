pub mod entities;
pub mod error;
pub mod password;

// Re-export tracing for use in this crate
pub use tracing;

pub use entities::user::Role;
pub use entities::user::manager::{UserFields, UserManager};
pub use entities::user::proxy::{Attendee, Guide, Organizer, RoleProxy, proxy_for};
pub use error::UserError;
