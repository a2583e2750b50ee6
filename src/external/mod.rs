pub mod mailer;
pub mod resend;

pub use mailer::*;
pub use resend::*;
