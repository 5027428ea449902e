pub mod mailer;
pub mod proposal;

pub use mailer::{Mailer, OutgoingMail, SmtpMailer};
pub use proposal::{ProposalEntry, ProposalWriter};
