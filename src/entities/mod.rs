pub mod admin_users;
pub mod email_segments;
pub mod email_templates;
pub mod verification_tokens;
pub mod waitlist_entries;

pub use admin_users as admin_user_entity;
pub use email_segments as email_segment_entity;
pub use email_templates as email_template_entity;
pub use verification_tokens as verification_token_entity;
pub use waitlist_entries as waitlist_entry_entity;

pub use email_templates::RecipientType;
