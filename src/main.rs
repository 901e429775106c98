use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::RngCore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gist_gateway::{api, auth, cli, config, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "gist_gateway=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Token { command }) => handle_token_command(command),
        None => run_server(cfg, None).await,
    }
}

async fn run_server(cfg: config::Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(cfg.port);
    let state = Arc::new(AppState::new(cfg));
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("gist gateway listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

fn handle_token_command(command: cli::TokenCommands) -> anyhow::Result<()> {
    match command {
        cli::TokenCommands::Create {
            github_token,
            gist_id,
            secret,
            expires,
            output,
        } => {
            let ttl = cli::parse_duration(&expires)?;
            let secret = secret.unwrap_or_else(|| {
                let mut bytes = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut bytes);
                hex::encode(bytes)
            });

            let token = auth::token::issue(&github_token, gist_id.as_deref(), &secret, ttl)
                .context("token signing failed")?;

            println!("Token created:");
            println!("  Token:   {token}");
            println!("  Secret:  {secret}");
            println!("  Expires: {expires}");
            if let Some(ref id) = gist_id {
                println!("  Gist ID: {id}");
            }
            println!();
            println!("Set JWT_SECRET={secret} on the gateway, then call:");
            println!("  curl -H \"Authorization: Bearer {token}\" http://localhost:8787/api/gist");
            if gist_id.is_none() {
                println!("No gist id was embedded; include one in the URL:");
                println!("  /api/gist/{{gist_id}}/file/{{filename}}");
            }

            if let Some(path) = output {
                let record = serde_json::json!({
                    "token": token,
                    "secret": secret,
                    "expiresIn": expires,
                    "gistId": gist_id,
                    "createdAt": chrono::Utc::now().to_rfc3339(),
                });
                std::fs::write(&path, serde_json::to_string_pretty(&record)?)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Token saved to: {}", path.display());
            }
            Ok(())
        }
    }
}
