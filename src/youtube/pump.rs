//! ポーリングポンプ
//!
//! ライブチャットのページ取得を延々と駆動するイベントループ。
//! ループ自身はブロッキング処理を一切行わず、HTTP取得とページ間の
//! 待機をそれぞれ独立したタスクへ切り出し、結果だけをチャネルで
//! 受け取る。これでキャンセル信号は常に即座に観測できる。
//!
//! 同時に発行される取得要求は常に1件だけ（single-flight）。
//! 次の要求は前の結果を処理し、サーバー指定の間隔を待ってから
//! 発行される。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use super::client::PageFetcher;
use super::errors::YouTubeError;
use super::normalizer::normalize_batch;
use super::types::{LiveChatMessagesResponse, MessageBatch};

/// サーバー指定間隔に適用するポーリング間隔の下限（ミリ秒）
const MIN_POLL_INTERVAL_MS: u64 = 5000;

/// 次ページ取得要求
///
/// page_tokenは直前のレスポンスのnextPageTokenをそのまま引き継ぐ。
/// Noneは先頭ページを意味する。
#[derive(Debug, Default)]
struct PageRequest {
    page_token: Option<String>,
}

/// サーバー指定の間隔に下限を適用した待機時間を返す
///
/// 上限は設けない。サーバーが長い間隔を指示した場合はそのまま従う。
fn poll_delay(suggested_ms: u64) -> Duration {
    Duration::from_millis(suggested_ms.max(MIN_POLL_INTERVAL_MS))
}

/// チャットポーリングポンプ
pub struct ChatPump {
    fetcher: Arc<dyn PageFetcher>,
    live_chat_id: String,
}

impl ChatPump {
    pub fn new(fetcher: Arc<dyn PageFetcher>, live_chat_id: String) -> Self {
        Self {
            fetcher,
            live_chat_id,
        }
    }

    /// ポンプを起動し、メッセージとエラーの受信端を返す
    ///
    /// 両チャネルはポンプ停止後に閉じる。停止するのはシャットダウン
    /// 信号を受けたときと、ページ取得がエラーになったときだけ。
    /// エラーはエラーチャネルに1件だけ届く。
    pub fn spawn(
        self,
        shutdown: &broadcast::Sender<()>,
    ) -> (
        mpsc::Receiver<MessageBatch>,
        mpsc::Receiver<YouTubeError>,
        JoinHandle<()>,
    ) {
        let (batch_tx, batch_rx) = mpsc::channel(1);
        let (error_tx, error_rx) = mpsc::channel(1);
        let shutdown_rx = shutdown.subscribe();

        let handle = tokio::spawn(run(
            self.fetcher,
            self.live_chat_id,
            batch_tx,
            error_tx,
            shutdown_rx,
        ));

        (batch_rx, error_rx, handle)
    }
}

async fn run(
    fetcher: Arc<dyn PageFetcher>,
    live_chat_id: String,
    batch_tx: mpsc::Sender<MessageBatch>,
    error_tx: mpsc::Sender<YouTubeError>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    // 「要求の準備ができた」「結果が届いた」の2種類のイベントを運ぶ内部チャネル
    let (request_tx, mut request_rx) = mpsc::channel::<PageRequest>(1);
    let (result_tx, mut result_rx) =
        mpsc::channel::<Result<LiveChatMessagesResponse, YouTubeError>>(1);

    // 先頭ページの要求を投入してループを始動する
    if request_tx.send(PageRequest::default()).await.is_err() {
        return;
    }

    log::info!("Chat pump started (chat ID: {})", live_chat_id);

    loop {
        tokio::select! {
            biased;

            _ = shutdown_rx.recv() => {
                log::info!("Chat pump cancelled");
                break;
            }

            Some(request) = request_rx.recv() => {
                // 取得は独立タスクで実行し、ループはすぐ待ち受けに戻る
                let fetcher = Arc::clone(&fetcher);
                let live_chat_id = live_chat_id.clone();
                let result_tx = result_tx.clone();
                let mut fetch_shutdown = shutdown_rx.resubscribe();
                tokio::spawn(async move {
                    tokio::select! {
                        result = fetcher
                            .fetch_page(&live_chat_id, request.page_token.as_deref()) => {
                            // ループ停止後に届いた結果は捨てる
                            let _ = result_tx.send(result).await;
                        }
                        // キャンセル時は取得を中断し、結果を残さない
                        _ = fetch_shutdown.recv() => {}
                    }
                });
            }

            Some(result) = result_rx.recv() => {
                match result {
                    Ok(page) => {
                        let next_token = page.next_page_token.clone();
                        let delay = poll_delay(page.polling_interval_millis);
                        let batch = normalize_batch(page.items);

                        // 配信でブロックするのはここだけ。次の要求は別タスクの
                        // 待機を経て発行されるので、消費者が遅くても取得要求が
                        // 積み上がることはない。
                        if batch_tx.send(batch).await.is_err() {
                            log::info!("Message channel closed, stopping pump");
                            break;
                        }

                        let request_tx = request_tx.clone();
                        tokio::spawn(async move {
                            tokio::time::sleep(delay).await;
                            let _ = request_tx.send(PageRequest {
                                page_token: next_token,
                            }).await;
                        });
                    }
                    Err(e) => {
                        log::error!("Failed to fetch chat page: {}", e);
                        let _ = error_tx.send(e).await;
                        break;
                    }
                }
            }
        }
    }

    log::info!("Chat pump stopped");
    // ここでbatch_tx / error_txがdropされ、下流のチャネルが閉じる
}
