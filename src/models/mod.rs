pub mod admin;
pub mod campaign;
pub mod common;
pub mod email_template;
pub mod pagination;
pub mod waitlist;

pub use admin::*;
pub use campaign::*;
pub use common::*;
pub use email_template::*;
pub use pagination::*;
pub use waitlist::*;
