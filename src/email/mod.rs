//! Outbound mail for the contact relay
//!
//! Messages are assembled as RFC-2822 documents with lettre, encoded as
//! unpadded base64url, and handed to the Gmail API by a [`MailTransport`].

mod mime;
mod service;
mod types;

pub use mime::{build_mime_message, encode_base64url, parse_mailbox, MimeError};
pub use service::{GmailTransport, MailSendError, MailTransport};
pub use types::{GmailConfig, GmailCredentials, OutboundMessage};
