//! TLS stream plumbing for the IMAP connection.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    rustls::{ClientConfig, RootCertStore},
};

/// Line-oriented IMAP stream over implicit TLS.
///
/// Draft storage only ever talks to the standard TLS port (993), so no
/// plaintext variant exists.
#[derive(Debug)]
pub struct ImapStream {
    inner: BufReader<tokio_rustls::client::TlsStream<TcpStream>>,
}

impl ImapStream {
    /// Connects to an IMAP server over TLS.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or handshake fails.
    pub async fn connect(hostname: &str, port: u16) -> Result<Self> {
        let tcp_stream = TcpStream::connect((hostname, port)).await?;

        let root_store = RootCertStore {
            roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
        };
        let config = ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();
        let connector = TlsConnector::from(Arc::new(config));

        let server_name = ServerName::try_from(hostname.to_string())
            .map_err(|_| Error::Protocol(format!("invalid hostname: {hostname}")))?;
        let tls_stream = connector.connect(server_name, tcp_stream).await?;

        Ok(Self {
            inner: BufReader::new(tls_stream),
        })
    }

    /// Reads one line, trimming the CRLF terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        self.inner.read_line(&mut line).await?;
        Ok(line.trim_end().to_string())
    }

    /// Writes data to the stream and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.inner.get_mut().write_all(data).await?;
        self.inner.get_mut().flush().await?;
        Ok(())
    }
}
