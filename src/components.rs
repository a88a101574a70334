//! Reusable HTML components for message pages
//!
//! Maud component functions for the message item and the page that hosts
//! it. The message body itself comes from the markdown renderer as
//! [`TrustedHtml`](crate::markdown::TrustedHtml).

pub mod layout;
pub mod message;
