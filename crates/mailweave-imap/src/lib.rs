//! # mailweave-imap
//!
//! Minimal IMAP client used by mailweave to store drafts, speaking the
//! RFC 3501 subset it needs: LOGIN, LIST, APPEND and LOGOUT over
//! implicit TLS.
//!
//! The connection moves through two compile-time states:
//! [`NotAuthenticated`] after the greeting, [`Authenticated`] after
//! LOGIN. An authenticated client lists mailboxes to find where the
//! server keeps drafts and appends complete messages there.
//!
//! ```ignore
//! use mailweave_imap::Client;
//!
//! # async fn run() -> mailweave_imap::Result<()> {
//! let client = Client::connect("imap.example.com", 993).await?;
//! let mut client = client.login("user@example.com", "password").await?;
//!
//! let mailboxes = client.list("", "*").await?;
//! client.append("Drafts", b"Subject: Draft\r\n\r\nBody\r\n").await?;
//! client.logout().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod stream;
mod tag;

pub use client::{Authenticated, Client, MailboxInfo, NotAuthenticated};
pub use error::{Error, Result};
pub use stream::ImapStream;
