//! # mailweave-mime
//!
//! MIME message construction for email delivery.
//!
//! This crate builds well-formed RFC 5322 messages from content parts:
//! plaintext and HTML alternatives, inline images cross-linked through
//! content identifiers, and file attachments. It deliberately does not
//! parse MIME; construction is the only supported direction.
//!
//! ## Quick start
//!
//! ```ignore
//! use mailweave_mime::{ComposedMessage, Envelope, HtmlBody, Part};
//!
//! let envelope = Envelope::new("sender@example.com", "Hello")
//!     .to("recipient@example.com");
//!
//! let message = ComposedMessage::build(envelope)
//!     .text("Plain text version")
//!     .html(HtmlBody::new(Part::html("<p>HTML version</p>")))
//!     .finish()?;
//!
//! let bytes = message.to_bytes();
//! ```
//!
//! The part tree nests the way mail clients expect: a `multipart/mixed`
//! root when attachments are present, a `multipart/alternative` container
//! with the plaintext part first, and a `multipart/related` container
//! holding the HTML part and its inline images.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_id;
mod content_type;
mod error;
mod header;
mod message;

pub mod encoding;

pub use content_id::ContentId;
pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::Headers;
pub use message::{
    ComposedMessage, Envelope, HtmlBody, InlinePart, MessageBuilder, Part, TransferEncoding,
};
