//! User module.
//!
//! This module contains the mail identities found in address headers
//! (senders and recipients).

mod user;
pub use user::*;

mod users;
pub use users::*;
