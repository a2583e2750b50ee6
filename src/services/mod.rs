pub mod auth_service;
pub mod campaign_service;
pub mod template_service;
pub mod waitlist_service;

pub use auth_service::*;
pub use campaign_service::*;
pub use template_service::*;
pub use waitlist_service::*;
