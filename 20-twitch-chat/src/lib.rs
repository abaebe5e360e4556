//! Read-only Twitch chat client.
//!
//! Connects to Twitch IRC over TLS, authenticates, joins one channel and
//! prints the chat as it arrives. Each module focuses on a concrete
//! responsibility:
//!
//! - [`cli`] parses the command-line interface.
//! - [`config`] loads credentials from a JSON file and keeps them out of
//!   `Debug` output.
//! - [`session`] owns the TLS stream and frames lines over it, optionally
//!   mirroring raw traffic to stderr.
//! - [`protocol`] holds the IRC vocabulary: outbound commands, lossless
//!   decoding of inbound frames and chat message extraction.
//! - [`client`] drives the handshake and the receive loop.
//!
//! The session is generic over its stream, so integration tests drive the
//! handshake and loop against in-memory peers.

pub mod cli;
pub mod client;
pub mod config;
pub mod protocol;
pub mod session;
