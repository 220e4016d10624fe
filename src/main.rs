mod auth;
mod cli;
mod config;
mod sink;
mod util;
mod youtube;

use std::io::{self, Write};
use std::process;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::broadcast;

use crate::auth::{OAuthManager, TokenStore};
use crate::cli::Args;
use crate::config::Config;
use crate::sink::tui::Tui;
use crate::youtube::client::YouTubeClient;
use crate::youtube::pump::ChatPump;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // TUI表示中のstderrログは画面を乱すので、既定では警告以上に抑える。
    // RUST_LOGを指定すれば上書きできる。
    let default_filter = if args.json { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = run(args).await {
        eprintln!("{}", e);
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let config = Config::new()?;
    let store = TokenStore::new(config);

    let client_id = std::env::var("GOOGLE_CLIENT_ID").unwrap_or_default();
    let client_secret = std::env::var("GOOGLE_CLIENT_SECRET").unwrap_or_default();
    let auth = Arc::new(OAuthManager::new(client_id, client_secret, store)?);

    // 起動時に一度トークンを確保する（未認可ならここで対話フロー）
    auth.ensure_token().await?;

    let live_id = match args.live_id {
        Some(id) if !id.is_empty() => id,
        _ => prompt_live_id()?,
    };
    if live_id.is_empty() {
        anyhow::bail!("live id is required");
    }

    let client = Arc::new(YouTubeClient::new(auth)?);

    // 配信の解決に失敗したらそのまま終了する
    let live_chat_id = client.get_live_chat_id(&live_id).await?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let pump = ChatPump::new(client, live_chat_id);
    let (batches, mut errors, pump_handle) = pump.spawn(&shutdown_tx);

    // Ctrl-Cでパイプライン全体を止める
    {
        let shutdown_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = shutdown_tx.send(());
            }
        });
    }

    let sink_handle = if args.json {
        tokio::spawn(async move {
            sink::jsonl::run(batches, io::stdout()).await;
        })
    } else {
        let shutdown_tx = shutdown_tx.clone();
        let shutdown_rx = shutdown_tx.subscribe();
        tokio::spawn(async move {
            let result = Tui::new().run(batches, shutdown_rx).await;
            // 終了キーで抜けた場合もパイプライン全体を止める
            let _ = shutdown_tx.send(());
            if let Err(e) = result {
                log::error!("TUI error: {}", e);
            }
        })
    };

    // エラーチャネルとシャットダウン信号を待ち合わせる
    let mut shutdown_rx = shutdown_tx.subscribe();
    let mut pump_error = None;
    tokio::select! {
        _ = shutdown_rx.recv() => {}
        error = errors.recv() => {
            if let Some(error) = error {
                log::error!("Chat polling failed: {}", error);
                pump_error = Some(error);
            }
            let _ = shutdown_tx.send(());
        }
    }

    let _ = pump_handle.await;
    let _ = sink_handle.await;

    // 端末を復元してからエラーを表示する
    if let Some(error) = pump_error {
        return Err(error.into());
    }
    Ok(())
}

/// 動画IDを標準入力から受け取る
fn prompt_live_id() -> io::Result<String> {
    print!("Input live id: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
