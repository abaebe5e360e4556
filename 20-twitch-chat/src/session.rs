//! The TLS stream to the chat server and line framing over it.

use std::{io, sync::Arc};

use rustls::{ClientConfig, RootCertStore, pki_types::ServerName};
use thiserror::Error;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader},
    net::TcpStream,
};
use tokio_rustls::{TlsConnector, client::TlsStream};
use tracing::{debug, info};

use crate::protocol::LINE_ENDING;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {addr}")]
    Connect {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to write to the server")]
    Write(#[source] io::Error),
    #[error("failed to read from the server")]
    Read(#[source] io::Error),
    #[error("refusing to send a line with an embedded line break")]
    EmbeddedLineBreak,
}

/// Whether a single send is copied to the diagnostic mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Echo {
    Mirror,
    Silent,
}

/// Copies raw protocol traffic to a diagnostic sink: sends as `< line`,
/// receives as `> line`.
pub struct Mirror {
    sink: Option<Box<dyn AsyncWrite + Send + Unpin>>,
}

impl Mirror {
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    pub fn to_writer(sink: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        Self {
            sink: Some(Box::new(sink)),
        }
    }

    /// Mirrors to stderr when `verbose` is set.
    pub fn stderr(verbose: bool) -> Self {
        if verbose {
            Self::to_writer(tokio::io::stderr())
        } else {
            Self::disabled()
        }
    }

    // The mirror is best effort: a failing stderr must not take the
    // connection down with it.
    async fn write(&mut self, prefix: &[u8], data: &[u8]) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let result = async {
            sink.write_all(prefix).await?;
            sink.write_all(data).await?;
            sink.flush().await
        }
        .await;
        if let Err(error) = result {
            debug!(?error, "failed to write protocol mirror");
        }
    }
}

/// A line-framed connection to the chat server.
pub struct Session<S> {
    stream: BufReader<S>,
    mirror: Mirror,
}

impl Session<TlsStream<TcpStream>> {
    /// Opens a TCP connection to `host:port` and negotiates TLS, verifying the
    /// server certificate against the bundled web PKI roots.
    pub async fn connect(host: &str, port: u16, mirror: Mirror) -> Result<Self, SessionError> {
        let addr = format!("{host}:{port}");
        let connect_error = |source: io::Error| SessionError::Connect {
            addr: addr.clone(),
            source,
        };

        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|err| connect_error(io::Error::new(io::ErrorKind::InvalidInput, err)))?;

        info!("connecting to {addr}");
        let tcp = TcpStream::connect((host, port))
            .await
            .map_err(connect_error)?;
        let tls = tls_connector()
            .map_err(connect_error)?
            .connect(server_name, tcp)
            .await
            .map_err(connect_error)?;
        info!("connected to {addr}");

        Ok(Self::new(tls, mirror))
    }
}

fn tls_connector() -> io::Result<TlsConnector> {
    let roots = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(io::Error::other)?
    .with_root_certificates(roots)
    .with_no_client_auth();
    Ok(TlsConnector::from(Arc::new(config)))
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, mirror: Mirror) -> Self {
        Self {
            stream: BufReader::new(stream),
            mirror,
        }
    }

    /// Writes `text` followed by CRLF and waits for the write to flush.
    ///
    /// Any trailing CR/LF in `text` is replaced by a single CRLF. A line break
    /// anywhere else would smuggle a second command onto the wire, so such
    /// text is refused before anything is written.
    pub async fn send_line(&mut self, text: &str, echo: Echo) -> Result<(), SessionError> {
        let text = text.trim_end_matches(['\r', '\n']);
        if text.contains(['\r', '\n']) {
            return Err(SessionError::EmbeddedLineBreak);
        }

        let mut line = String::with_capacity(text.len() + LINE_ENDING.len());
        line.push_str(text);
        line.push_str(LINE_ENDING);

        self.stream
            .write_all(line.as_bytes())
            .await
            .map_err(SessionError::Write)?;
        self.stream.flush().await.map_err(SessionError::Write)?;

        if echo == Echo::Mirror {
            self.mirror.write(b"< ", line.as_bytes()).await;
        }
        Ok(())
    }

    /// Reads the next frame, terminator included. An empty frame means the
    /// server closed the connection.
    pub async fn recv_line(&mut self) -> Result<Vec<u8>, SessionError> {
        let mut frame = Vec::new();
        self.stream
            .read_until(b'\n', &mut frame)
            .await
            .map_err(SessionError::Read)?;
        if !frame.is_empty() {
            self.mirror.write(b"> ", &frame).await;
        }
        Ok(frame)
    }
}
