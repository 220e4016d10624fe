//! OAuthトークンの永続化
//!
//! 設定ディレクトリ配下のtoken.jsonに単一のJSON blobとして保存する。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::AuthError;
use crate::config::Config;

/// トークンファイル名
const TOKEN_FILE_NAME: &str = "token.json";

/// 有効期限チェック時のマージン（秒）
///
/// 期限ぎりぎりのトークンをAPIリクエストに使うと途中で失効するため、
/// このマージン内に入ったら失効扱いにしてリフレッシュする。
const EXPIRY_LEEWAY_SECS: i64 = 30;

/// 保存されるOAuthトークン
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expiry: DateTime<Utc>,
}

impl StoredToken {
    /// アクセストークンがまだ使えるかどうか
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.access_token.is_empty()
            && now + Duration::seconds(EXPIRY_LEEWAY_SECS) < self.expiry
    }
}

/// トークンblobの読み書き
pub struct TokenStore {
    config: Config,
}

impl TokenStore {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// トークンを保存する
    pub fn save(&self, token: &StoredToken) -> Result<(), AuthError> {
        let data = serde_json::to_vec(token)?;
        self.config.write_file(TOKEN_FILE_NAME, &data)?;
        Ok(())
    }

    /// 保存済みトークンを読み込む
    ///
    /// ファイルが存在しない場合はOk(None)を返す。
    pub fn load(&self) -> Result<Option<StoredToken>, AuthError> {
        match self.config.read_file(TOKEN_FILE_NAME) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_token(expiry: DateTime<Utc>) -> StoredToken {
        StoredToken {
            access_token: "access-123".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: Some("refresh-456".to_string()),
            expiry,
        }
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(Config::with_dir(dir.path().join("ylc")));

        let token = sample_token(Utc::now() + Duration::hours(1));
        store.save(&token).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access-123");
        assert_eq!(loaded.token_type, "Bearer");
        assert_eq!(loaded.refresh_token.as_deref(), Some("refresh-456"));
        assert_eq!(loaded.expiry, token.expiry);
    }

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(Config::with_dir(dir.path()));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_is_valid_with_leeway() {
        let now = Utc::now();

        // 十分先の期限は有効
        assert!(sample_token(now + Duration::hours(1)).is_valid(now));

        // 期限切れは無効
        assert!(!sample_token(now - Duration::hours(1)).is_valid(now));

        // マージン内（30秒以内に失効）は無効扱い
        assert!(!sample_token(now + Duration::seconds(10)).is_valid(now));
    }

    #[test]
    fn test_empty_access_token_is_invalid() {
        let now = Utc::now();
        let mut token = sample_token(now + Duration::hours(1));
        token.access_token = String::new();
        assert!(!token.is_valid(now));
    }
}
