pub mod user;
pub use user::*;

pub mod email;
pub use email::*;
