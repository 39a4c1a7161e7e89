//! # Transports
//!
//! Ways of feeding command text into sessions: an interactive console loop for a
//! single game and a JSON-lines TCP server over the session registry.

pub mod console;
pub mod tcp;

pub use console::run_console;
pub use tcp::{handle_line, handle_request, serve, Request, RequestOp, Response};

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the binary talks to players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// One game on standard input and output
    Console,
    /// Many games over TCP
    Serve,
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "console" => Ok(TransportMode::Console),
            "serve" | "web" => Ok(TransportMode::Serve),
            other => Err(format!("unknown mode '{}', expected console or serve", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_aliases() {
        assert_eq!("console".parse::<TransportMode>(), Ok(TransportMode::Console));
        assert_eq!("WEB".parse::<TransportMode>(), Ok(TransportMode::Serve));
        assert_eq!("serve".parse::<TransportMode>(), Ok(TransportMode::Serve));
        assert!("telnet".parse::<TransportMode>().is_err());
    }
}
