//! 生のAPIレスポンスをドメインモデルへ正規化する

use super::types::{
    Author, AuthorDetails, LiveChatMessageItem, Message, MessageBatch, MessageKind,
};

/// 認識するイベント種別（snippet.type）
const EVENT_TEXT: &str = "textMessageEvent";
const EVENT_SUPER_CHAT: &str = "superChatEvent";
const EVENT_CHAT_ENDED: &str = "chatEndedEvent";

/// 1件の生アイテムを正規化する
///
/// 認識できないイベント種別はNoneを返して黙って捨てる。
/// これはエラーではないのでログも出さない。
pub fn normalize_item(item: LiveChatMessageItem) -> Option<Message> {
    let kind = match item.snippet.message_type.as_str() {
        EVENT_TEXT => MessageKind::Text,
        EVENT_SUPER_CHAT => {
            let details = item.snippet.super_chat_details.as_ref();
            MessageKind::SuperChat {
                amount: details
                    .map(|d| d.amount_display_string.clone())
                    .unwrap_or_default(),
                currency: details.map(|d| d.currency.clone()).unwrap_or_default(),
            }
        }
        EVENT_CHAT_ENDED => MessageKind::ChatEnded,
        _ => return None,
    };

    Some(Message {
        id: item.id,
        author: item.author_details.map(map_author),
        text: item.snippet.display_message.unwrap_or_default(),
        kind,
    })
}

/// 1ページ分のアイテム列を正規化する
///
/// 入力順を保持する。認識できなかったアイテムの分だけ短くなる。
pub fn normalize_batch(items: Vec<LiveChatMessageItem>) -> MessageBatch {
    MessageBatch {
        items: items.into_iter().filter_map(normalize_item).collect(),
    }
}

fn map_author(details: AuthorDetails) -> Author {
    Author {
        id: details.channel_id,
        name: details.display_name,
        avatar_url: details.profile_image_url,
        is_owner: details.is_chat_owner,
        is_moderator: details.is_chat_moderator,
        is_sponsor: details.is_chat_sponsor,
        is_verified: details.is_verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::youtube::types::{MessageSnippet, SuperChatDetails};

    fn raw_item(id: &str, event_type: &str, text: Option<&str>) -> LiveChatMessageItem {
        LiveChatMessageItem {
            id: id.to_string(),
            snippet: MessageSnippet {
                message_type: event_type.to_string(),
                display_message: text.map(String::from),
                super_chat_details: None,
            },
            author_details: None,
        }
    }

    fn author_details(name: &str) -> AuthorDetails {
        AuthorDetails {
            channel_id: "ch1".to_string(),
            display_name: name.to_string(),
            profile_image_url: "https://example.com/a.png".to_string(),
            is_verified: false,
            is_chat_owner: true,
            is_chat_sponsor: false,
            is_chat_moderator: false,
        }
    }

    #[test]
    fn test_normalize_text_message() {
        let mut item = raw_item("m1", "textMessageEvent", Some("hello"));
        item.author_details = Some(author_details("alice"));

        let message = normalize_item(item).unwrap();
        assert_eq!(message.id, "m1");
        assert_eq!(message.text, "hello");
        assert!(matches!(message.kind, MessageKind::Text));

        let author = message.author.unwrap();
        assert_eq!(author.name, "alice");
        assert!(author.is_owner);
        assert!(!author.is_moderator);
    }

    #[test]
    fn test_normalize_super_chat() {
        let mut item = raw_item("m2", "superChatEvent", Some("thanks!"));
        item.snippet.super_chat_details = Some(SuperChatDetails {
            amount_display_string: "¥1,000".to_string(),
            currency: "JPY".to_string(),
        });

        let message = normalize_item(item).unwrap();
        match message.kind {
            MessageKind::SuperChat { amount, currency } => {
                assert_eq!(amount, "¥1,000");
                assert_eq!(currency, "JPY");
            }
            other => panic!("unexpected kind: {:?}", other),
        }
    }

    #[test]
    fn test_normalize_chat_ended_without_text() {
        let message = normalize_item(raw_item("m3", "chatEndedEvent", None)).unwrap();
        assert!(matches!(message.kind, MessageKind::ChatEnded));
        assert_eq!(message.text, "");
    }

    #[test]
    fn test_unrecognized_kind_is_dropped() {
        assert!(normalize_item(raw_item("m4", "superStickerEvent", None)).is_none());
        assert!(normalize_item(raw_item("m5", "membershipItemEvent", None)).is_none());
        assert!(normalize_item(raw_item("m6", "", None)).is_none());
    }

    #[test]
    fn test_author_absence_is_preserved() {
        let message = normalize_item(raw_item("m7", "textMessageEvent", Some("hi"))).unwrap();
        assert!(message.author.is_none());
    }

    #[test]
    fn test_batch_preserves_order_and_drops_unknown() {
        let items = vec![
            raw_item("m1", "textMessageEvent", Some("one")),
            raw_item("m2", "sponsorOnlyModeStartedEvent", None),
            raw_item("m3", "textMessageEvent", Some("three")),
            raw_item("m4", "chatEndedEvent", None),
        ];

        let batch = normalize_batch(items);
        let ids: Vec<&str> = batch.items.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m1", "m3", "m4"]);
    }

    #[test]
    fn test_batch_length_never_exceeds_input() {
        let items = vec![
            raw_item("m1", "unknownEvent", None),
            raw_item("m2", "textMessageEvent", Some("hi")),
        ];
        let batch = normalize_batch(items);
        assert!(batch.items.len() <= 2);
        assert_eq!(batch.items.len(), 1);
    }
}
