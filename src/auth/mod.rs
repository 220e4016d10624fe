//! Google OAuth2 認証
//!
//! authorization_code（初回の対話認可）とrefresh_token（失効時の更新）の
//! 2つのグラントのみを扱う。取得したトークンは毎回TokenStoreへ保存し、
//! 次回起動時に再利用する。

mod token_store;

pub use token_store::{StoredToken, TokenStore};

use std::io::{self, Write};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::config;
use crate::util::mask_token;

/// Google OAuth2 認可エンドポイント
const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";

/// Google OAuth2 トークンエンドポイント
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// 認可コードを手動入力で受け取るためのリダイレクト先（out-of-band）
const REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// 要求するスコープ
const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/youtube",
    "https://www.googleapis.com/auth/youtube.readonly",
    "https://www.googleapis.com/auth/youtube.force-ssl",
];

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse token: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET is not set")]
    MissingClientCredentials,

    #[error("invalid OAuth URL: {0}")]
    InvalidUrl(String),

    #[error("token endpoint returned an error: {0}")]
    TokenEndpoint(String),
}

/// 有効なBearerトークンを供給するケイパビリティ
///
/// 利用側は認証状態を一切変更しない。リフレッシュと永続化は
/// 実装側が透過的に行う。
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// 現在有効なアクセストークンを返す
    async fn bearer_token(&self) -> Result<String, AuthError>;
}

/// トークンエンドポイントの成功レスポンス
///
/// refresh_tokenはauthorization_codeグラントのときのみ含まれる。
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    token_type: String,
    expires_in: i64,
}

/// OAuthトークンの取得・更新・キャッシュを管理する
pub struct OAuthManager {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    store: TokenStore,
    token: Mutex<Option<StoredToken>>,
    token_url: String,
}

impl OAuthManager {
    pub fn new(
        client_id: String,
        client_secret: String,
        store: TokenStore,
    ) -> Result<Self, AuthError> {
        Self::with_token_url(client_id, client_secret, store, TOKEN_URL)
    }

    fn with_token_url(
        client_id: String,
        client_secret: String,
        store: TokenStore,
        token_url: impl Into<String>,
    ) -> Result<Self, AuthError> {
        if client_id.is_empty() || client_secret.is_empty() {
            return Err(AuthError::MissingClientCredentials);
        }

        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(config::http_timeout())
                .build()?,
            client_id,
            client_secret,
            store,
            token: Mutex::new(None),
            token_url: token_url.into(),
        })
    }

    /// キャッシュ→リフレッシュ→対話認可の順で有効なトークンを確保する
    ///
    /// どの経路で取得してもトークンは必ず保存してから返す。
    pub async fn ensure_token(&self) -> Result<StoredToken, AuthError> {
        let mut guard = self.token.lock().await;

        // メモリになければディスクキャッシュを読む
        if guard.is_none() {
            *guard = self.store.load()?;
        }

        if let Some(token) = guard.as_ref() {
            if token.is_valid(Utc::now()) {
                return Ok(token.clone());
            }
        }

        let token = match guard.as_ref().and_then(|t| t.refresh_token.clone()) {
            Some(refresh_token) => {
                log::info!("Access token expired, refreshing");
                self.refresh(&refresh_token).await?
            }
            None => {
                log::info!("No cached token found, starting interactive authorization");
                self.request_token_interactive().await?
            }
        };

        self.store.save(&token)?;
        log::debug!("Token saved ({})", mask_token(&token.access_token));

        *guard = Some(token.clone());
        Ok(token)
    }

    /// 認可コード取得用のURL
    fn auth_code_url(&self) -> Result<String, AuthError> {
        let scope = SCOPES.join(" ");
        let url = reqwest::Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", REDIRECT_URI),
                ("response_type", "code"),
                ("scope", scope.as_str()),
                ("access_type", "offline"),
            ],
        )
        .map_err(|e| AuthError::InvalidUrl(e.to_string()))?;
        Ok(url.into())
    }

    /// 対話的に認可コードを受け取ってトークンと交換する
    async fn request_token_interactive(&self) -> Result<StoredToken, AuthError> {
        println!("Access to this URL and get auth code.");
        println!("{}", self.auth_code_url()?);
        print!("Input auth code: ");
        io::stdout().flush()?;

        let mut code = String::new();
        io::stdin().read_line(&mut code)?;

        self.exchange_code(code.trim()).await
    }

    /// 認可コードをトークンと交換する
    async fn exchange_code(&self, code: &str) -> Result<StoredToken, AuthError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("redirect_uri", REDIRECT_URI),
        ];
        self.post_token(&params, None).await
    }

    /// リフレッシュトークンでアクセストークンを更新する
    async fn refresh(&self, refresh_token: &str) -> Result<StoredToken, AuthError> {
        let params = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        // リフレッシュ応答にはrefresh_tokenが含まれないことがあるので引き継ぐ
        self.post_token(&params, Some(refresh_token.to_string()))
            .await
    }

    async fn post_token(
        &self,
        params: &[(&str, &str)],
        fallback_refresh: Option<String>,
    ) -> Result<StoredToken, AuthError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Token endpoint error - status: {}, body: {}", status, body);
            return Err(AuthError::TokenEndpoint(format!(
                "status {}: {}",
                status, body
            )));
        }

        let data: TokenResponse = response.json().await?;
        Ok(StoredToken {
            access_token: data.access_token,
            token_type: data.token_type,
            refresh_token: data.refresh_token.or(fallback_refresh),
            expiry: Utc::now() + Duration::seconds(data.expires_in),
        })
    }
}

#[async_trait]
impl TokenProvider for OAuthManager {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Ok(self.ensure_token().await?.access_token)
    }
}
