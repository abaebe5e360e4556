use chrono::{Local, NaiveTime};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    protocol::{Command, OutputMode, decode_line},
    session::{Echo, Mirror, Session, SessionError},
};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to write chat output")]
    Output(#[source] std::io::Error),
}

/// Connection and output settings for a single chat session.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub host: String,
    pub port: u16,
    pub verbose: bool,
    pub mode: OutputMode,
}

/// Turns decoded lines into output lines, stamping chat events with the
/// clock's current time.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    mode: OutputMode,
    clock: fn() -> NaiveTime,
}

impl Printer {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            clock: local_time,
        }
    }

    pub fn with_clock(mode: OutputMode, clock: fn() -> NaiveTime) -> Self {
        Self { mode, clock }
    }

    pub fn render(&self, line: &str) -> Option<String> {
        self.mode.render(line, (self.clock)())
    }
}

fn local_time() -> NaiveTime {
    Local::now().time()
}

/// Connects, joins the configured channel and prints chat until the server
/// closes the connection.
pub async fn run(config: &Config, options: &ClientOptions) -> Result<(), ClientError> {
    let mut session =
        Session::connect(&options.host, options.port, Mirror::stderr(options.verbose)).await?;
    handshake(&mut session, config).await?;

    let printer = Printer::new(options.mode);
    let mut stdout = tokio::io::stdout();
    receive_loop(&mut session, &printer, &mut stdout).await?;

    warn!("server closed the connection");
    Ok(())
}

/// Authenticates, identifies and joins, in that order. The PASS line is never
/// mirrored.
pub async fn handshake<S>(session: &mut Session<S>, config: &Config) -> Result<(), SessionError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let pass = Command::Pass {
        token: &config.oauth_token,
    };
    session.send_line(&pass.to_string(), Echo::Silent).await?;

    let nick = Command::Nick {
        username: &config.username,
    };
    session.send_line(&nick.to_string(), Echo::Mirror).await?;

    let join = Command::Join {
        channel: &config.channel,
    };
    session.send_line(&join.to_string(), Echo::Mirror).await?;

    info!(username = %config.username, channel = %config.channel, "joined channel");
    Ok(())
}

/// Reads frames in arrival order and writes whatever the printer renders for
/// each one. Returns once the server closes the stream.
pub async fn receive_loop<S, W>(
    session: &mut Session<S>,
    printer: &Printer,
    out: &mut W,
) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let frame = session.recv_line().await?;
        if frame.is_empty() {
            debug!("end of stream");
            return Ok(());
        }

        let line = decode_line(&frame);
        let Some(rendered) = printer.render(&line) else {
            continue;
        };
        write_line(out, &rendered)
            .await
            .map_err(ClientError::Output)?;
    }
}

async fn write_line<W>(out: &mut W, line: &str) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await
}
