pub mod auth;
pub mod email_template;
pub mod waitlist;

pub use auth::auth_config;
pub use email_template::email_template_config;
pub use waitlist::waitlist_config;
