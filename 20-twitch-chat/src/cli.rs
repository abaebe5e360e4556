use std::path::PathBuf;

use clap::Parser;

use crate::protocol::{HOST, OutputMode, PORT};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON file with `username`, `channel`, `oauth_token` and `client_id`.
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Mirror raw protocol traffic to stderr (the PASS line is never shown).
    #[arg(long)]
    pub verbose: bool,

    /// `chat` prints timestamped chat messages, `raw` prints every line.
    #[arg(long, value_enum, default_value_t = OutputMode::Chat)]
    pub mode: OutputMode,

    /// Chat server host name, also used for TLS verification.
    #[arg(long, default_value = HOST, hide = true)]
    pub host: String,

    #[arg(long, default_value_t = PORT, hide = true)]
    pub port: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_twitch_in_chat_mode() {
        let cli = Cli::try_parse_from(["twitch_chat"]).expect("parse defaults");
        assert_eq!(cli.config, PathBuf::from("config.json"));
        assert!(!cli.verbose);
        assert_eq!(cli.mode, OutputMode::Chat);
        assert_eq!(cli.host, HOST);
        assert_eq!(cli.port, PORT);
    }

    #[test]
    fn parses_mode_and_verbosity() {
        let cli = Cli::try_parse_from([
            "twitch_chat",
            "--config",
            "creds.json",
            "--verbose",
            "--mode",
            "raw",
        ])
        .expect("parse flags");
        assert_eq!(cli.config, PathBuf::from("creds.json"));
        assert!(cli.verbose);
        assert_eq!(cli.mode, OutputMode::Raw);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["twitch_chat", "--mode", "json"]).is_err());
    }
}
