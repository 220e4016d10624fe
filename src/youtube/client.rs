use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::{errors::YouTubeError, types::*};
use crate::auth::TokenProvider;
use crate::config;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// liveChatMessages.list で要求するpart
const MESSAGES_PART: &str = "id,snippet,authorDetails";

/// チャットページ取得のケイパビリティ
///
/// ポンプはこのトレイト越しにのみ外部APIへ触れる。
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 次の1ページを取得する。page_tokenがNoneなら先頭ページ。
    async fn fetch_page(
        &self,
        live_chat_id: &str,
        page_token: Option<&str>,
    ) -> Result<LiveChatMessagesResponse, YouTubeError>;
}

pub struct YouTubeClient {
    client: Client,
    auth: Arc<dyn TokenProvider>,
    base_url: String,
}

impl YouTubeClient {
    pub fn new(auth: Arc<dyn TokenProvider>) -> Result<Self, YouTubeError> {
        Self::with_base_url(auth, API_BASE)
    }

    pub fn with_base_url(
        auth: Arc<dyn TokenProvider>,
        base_url: impl Into<String>,
    ) -> Result<Self, YouTubeError> {
        Ok(Self {
            client: Client::builder()
                .timeout(config::http_timeout())
                .build()?,
            auth,
            base_url: base_url.into(),
        })
    }

    /// 動画IDからactiveLiveChatIdを取得
    ///
    /// 配信の解決は起動時に1回だけ行う。失敗はリトライせず致命的エラー。
    pub async fn get_live_chat_id(&self, video_id: &str) -> Result<String, YouTubeError> {
        log::info!("Fetching live chat ID for video: {}", video_id);

        let url = format!("{}/videos", self.base_url);
        let bearer = self.auth.bearer_token().await?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(&bearer)
            .query(&[("part", "liveStreamingDetails"), ("id", video_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("videos.list failed - status: {}, body: {}", status, body);
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: VideoResponse = response
            .json()
            .await
            .map_err(|e| YouTubeError::Parse(e.to_string()))?;

        let item = data
            .items
            .first()
            .ok_or_else(|| YouTubeError::VideoNotFound(video_id.to_string()))?;

        let chat_id = item
            .live_streaming_details
            .as_ref()
            .and_then(|details| details.active_live_chat_id.clone())
            .ok_or_else(|| YouTubeError::NotLive(video_id.to_string()))?;

        log::info!("Live chat ID retrieved: {}", chat_id);
        Ok(chat_id)
    }

    /// ライブチャットメッセージを1ページ取得
    pub async fn get_live_chat_messages(
        &self,
        live_chat_id: &str,
        page_token: Option<&str>,
    ) -> Result<LiveChatMessagesResponse, YouTubeError> {
        log::debug!("Fetching live chat messages (chat ID: {})", live_chat_id);

        let url = format!("{}/liveChat/messages", self.base_url);
        let bearer = self.auth.bearer_token().await?;

        let mut query_params = vec![("liveChatId", live_chat_id), ("part", MESSAGES_PART)];

        let page_token_string;
        if let Some(token) = page_token {
            page_token_string = token.to_string();
            query_params.push(("pageToken", &page_token_string));
            log::debug!("Using page token: {}", token);
        }

        let response = self
            .client
            .get(&url)
            .bearer_auth(&bearer)
            .query(&query_params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!(
                "liveChatMessages.list failed - status: {}, body: {}",
                status,
                body
            );
            return Err(YouTubeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let data: LiveChatMessagesResponse = response
            .json()
            .await
            .map_err(|e| YouTubeError::Parse(e.to_string()))?;
        log::debug!(
            "Fetched {} messages (polling interval: {}ms)",
            data.items.len(),
            data.polling_interval_millis
        );
        Ok(data)
    }
}

#[async_trait]
impl PageFetcher for YouTubeClient {
    async fn fetch_page(
        &self,
        live_chat_id: &str,
        page_token: Option<&str>,
    ) -> Result<LiveChatMessagesResponse, YouTubeError> {
        self.get_live_chat_messages(live_chat_id, page_token).await
    }
}
