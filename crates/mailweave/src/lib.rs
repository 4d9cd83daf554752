//! # mailweave
//!
//! Mail-merge email library. Turns heterogeneous content (plain text,
//! markdown, HTML) plus file and inline-image references into a single
//! well-formed multipart message, guards against accidental reuse of
//! strings across runs, and delivers the result over SMTP or files it
//! as an IMAP draft.
//!
//! This crate provides:
//! - Content model and markdown rendering ([`content`], [`render`])
//! - Embedded-image resolution to `cid:` references ([`resolver`])
//! - Message composition with fail-fast validation ([`composer`])
//! - A persistent uniqueness guard backed by `SQLite` ([`guard`])
//! - Contact records parsed from delimited text ([`contacts`])
//! - A delivery session over the protocol crates ([`session`])
//!
//! ```ignore
//! use mailweave::{ComposeRequest, ContentSet, DeliverySession, SessionConfig, compose};
//! use mailweave::render::CommonMarkRenderer;
//!
//! # async fn run() -> mailweave::Result<()> {
//! let request = ComposeRequest::new("me@gmail.com", "Hello")
//!     .to("you@example.com")
//!     .content(ContentSet::new().markdown("# Hi\n\nSee ![logo](logo.png)"));
//! let message = compose(&request, &CommonMarkRenderer::new()).await?;
//!
//! let config = SessionConfig::new("me@gmail.com", "app-password");
//! let mut session = DeliverySession::open(config).await?;
//! session.send(&message).await?;
//! session.close().await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod attachment;
pub mod composer;
pub mod contacts;
pub mod content;
pub mod endpoint;
mod error;
pub mod guard;
pub mod render;
pub mod resolver;
pub mod sentlog;
pub mod session;

pub use attachment::{FileReference, FileRole};
pub use composer::{ComposeRequest, compose};
pub use contacts::{Contact, ContactList};
pub use content::ContentSet;
pub use endpoint::{ImapEndpoint, Security, SmtpEndpoint};
pub use error::{Error, Result};
pub use guard::UniquenessStore;
pub use render::{CommonMarkRenderer, MarkdownRenderer};
pub use sentlog::SentLog;
pub use session::{DeliverySession, SessionConfig};

pub use mailweave_mime::ComposedMessage;
