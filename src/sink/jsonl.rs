//! JSON出力シンク
//!
//! 受信したMessageBatchを1行ずつJSONとして書き出す。
//! パイプ先のツール（jqなど）でそのまま処理できる形式。

use std::io::Write;

use tokio::sync::mpsc;

use crate::youtube::types::MessageBatch;

/// チャネルが閉じるか書き込みに失敗するまでバッチを書き続ける
pub async fn run<W: Write>(mut batches: mpsc::Receiver<MessageBatch>, mut out: W) {
    while let Some(batch) = batches.recv().await {
        let line = match serde_json::to_string(&batch) {
            Ok(line) => line,
            Err(e) => {
                log::error!("Failed to serialize batch: {}", e);
                break;
            }
        };

        if let Err(e) = writeln!(out, "{}", line) {
            log::error!("Failed to write batch: {}", e);
            break;
        }
    }

    log::info!("JSON sink stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::types::{Message, MessageKind};

    fn batch(ids: &[&str]) -> MessageBatch {
        MessageBatch {
            items: ids
                .iter()
                .map(|id| Message {
                    id: id.to_string(),
                    author: None,
                    text: format!("text-{}", id),
                    kind: MessageKind::Text,
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_writes_one_line_per_batch() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(batch(&["m1", "m2"])).await.unwrap();
        tx.send(batch(&["m3"])).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        run(rx, &mut out).await;

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["items"][0]["id"], "m1");
        assert_eq!(first["items"][1]["id"], "m2");
        // authorなしのメッセージはauthorキー自体を持たない
        assert!(first["items"][0].get("author").is_none());

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["items"][0]["id"], "m3");
    }

    #[tokio::test]
    async fn test_stops_when_channel_closes() {
        let (tx, rx) = mpsc::channel::<MessageBatch>(1);
        drop(tx);

        let mut out = Vec::new();
        run(rx, &mut out).await;
        assert!(out.is_empty());
    }
}
