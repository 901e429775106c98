use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

/// gist-gateway: bearer-token gateway for GitHub gists
#[derive(Parser)]
#[command(name = "gistd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gateway server
    Serve {
        /// Port to bind (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Issue signed bearer tokens
    Token {
        #[command(subcommand)]
        command: TokenCommands,
    },
}

#[derive(Subcommand)]
pub enum TokenCommands {
    /// Create a signed token embedding a GitHub credential
    Create {
        /// GitHub personal access token to embed
        #[arg(long)]
        github_token: String,
        /// Gist the token is scoped to (omit to supply one per request in the URL)
        #[arg(long)]
        gist_id: Option<String>,
        /// Signing secret (a random 32-byte hex secret is generated if omitted)
        #[arg(long)]
        secret: Option<String>,
        /// Token lifetime, e.g. 45s, 30m, 24h, 7d
        #[arg(long, default_value = "24h")]
        expires: String,
        /// Save the token and secret to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Parse a duration string with an optional s/m/h/d suffix. A bare integer
/// is read as seconds.
pub fn parse_duration(s: &str) -> anyhow::Result<chrono::Duration> {
    let s = s.trim();
    if s.is_empty() {
        anyhow::bail!("empty duration");
    }
    let (value, unit) = match s.char_indices().last() {
        Some((idx, c)) if c.is_ascii_alphabetic() => (&s[..idx], Some(c)),
        _ => (s, None),
    };
    let n: i64 = value
        .parse()
        .with_context(|| format!("invalid duration '{s}'"))?;
    if n <= 0 {
        anyhow::bail!("duration must be positive: '{s}'");
    }
    let secs = match unit {
        None | Some('s') => n,
        Some('m') => n * 60,
        Some('h') => n * 3600,
        Some('d') => n * 86400,
        Some(u) => anyhow::bail!("unsupported duration unit '{u}' in '{s}'"),
    };
    Ok(chrono::Duration::seconds(secs))
}
