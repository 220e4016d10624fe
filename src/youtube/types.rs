use serde::{Deserialize, Serialize};

/// 正規化済みチャットメッセージ
///
/// シンクへ渡す最終形。authorDetailsを持たない生アイテムもあるため、
/// authorはOptionのまま保持する（空のAuthorで代用しない）。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    pub text: String,
    pub kind: MessageKind,
}

/// メッセージの著者
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
    pub is_owner: bool,
    pub is_moderator: bool,
    pub is_sponsor: bool,
    pub is_verified: bool,
}

/// メッセージ種別
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageKind {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "superChat")]
    SuperChat { amount: String, currency: String },
    #[serde(rename = "chatEnded")]
    ChatEnded,
}

/// 1ページ分の正規化済みメッセージ
///
/// ページ単位でまとめてシンクへ配信する。itemsの順序は
/// APIレスポンスの到着順と一致する。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageBatch {
    pub items: Vec<Message>,
}

// YouTube API レスポンス型
#[derive(Debug, Deserialize)]
pub struct LiveChatMessagesResponse {
    #[serde(rename = "pollingIntervalMillis")]
    pub polling_interval_millis: u64,
    #[serde(rename = "nextPageToken")]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub items: Vec<LiveChatMessageItem>,
}

#[derive(Debug, Deserialize)]
pub struct LiveChatMessageItem {
    pub id: String,
    pub snippet: MessageSnippet,
    #[serde(rename = "authorDetails")]
    pub author_details: Option<AuthorDetails>,
}

#[derive(Debug, Deserialize)]
pub struct MessageSnippet {
    #[serde(rename = "type")]
    pub message_type: String,
    // chatEndedEventなど本文を持たないイベントではdisplayMessageが欠落する
    #[serde(rename = "displayMessage")]
    pub display_message: Option<String>,
    #[serde(rename = "superChatDetails")]
    pub super_chat_details: Option<SuperChatDetails>,
}

#[derive(Debug, Deserialize)]
pub struct SuperChatDetails {
    #[serde(rename = "amountDisplayString")]
    pub amount_display_string: String,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthorDetails {
    #[serde(rename = "channelId")]
    pub channel_id: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "profileImageUrl")]
    pub profile_image_url: String,
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
    #[serde(rename = "isChatOwner")]
    pub is_chat_owner: bool,
    #[serde(rename = "isChatSponsor")]
    pub is_chat_sponsor: bool,
    #[serde(rename = "isChatModerator")]
    pub is_chat_moderator: bool,
}

#[derive(Debug, Deserialize)]
pub struct VideoResponse {
    pub items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
pub struct VideoItem {
    #[serde(rename = "liveStreamingDetails")]
    pub live_streaming_details: Option<LiveStreamingDetails>,
}

#[derive(Debug, Deserialize)]
pub struct LiveStreamingDetails {
    #[serde(rename = "activeLiveChatId")]
    pub active_live_chat_id: Option<String>,
}
