//! # mailweave-smtp
//!
//! SMTP submission client for mailweave, implementing the client side of
//! RFC 5321.
//!
//! The connection moves through two compile-time states: [`Connected`]
//! right after the greeting, and [`Ready`] once the session is set up
//! (EHLO, optional STARTTLS, AUTH). A [`Ready`] client sends any number
//! of messages over one connection and recovers the session with RSET
//! when the server rejects a transaction mid-way.
//!
//! ```ignore
//! use mailweave_smtp::{Address, Client, connection};
//!
//! # async fn run() -> mailweave_smtp::Result<()> {
//! let stream = connection::connect_tls("smtp.example.com", 465).await?;
//! let client = Client::from_stream(stream).await?;
//! let mut client = client.ehlo("localhost").await?.auth_plain("user", "pass").await?;
//!
//! let from = Address::new("sender@example.com")?;
//! let to = [Address::new("recipient@example.com")?];
//! client.send_mail(&from, &to, b"Subject: Hi\r\n\r\nHello\r\n").await?;
//! client.quit().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod command;
pub mod connection;
mod error;
pub mod types;

pub use connection::{Client, Connected, Ready, ServerInfo, SmtpStream};
pub use error::{Error, Result};
pub use types::{Address, AuthMechanism, Extension, Reply, ReplyCode};
