// =============================================================================
// 共通設定モジュール
// =============================================================================
// アプリケーション全体で使用する定数と、ユーザー設定ディレクトリの管理
// =============================================================================

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// HTTPリクエストのデフォルトタイムアウト（秒）
///
/// YouTube API・OAuthエンドポイントへのリクエストで使用。
/// ネットワーク状況が悪い場合でも適切にタイムアウトし、
/// ユーザーを長時間待たせないようにする。
pub const HTTP_TIMEOUT_SECS: u64 = 10;

/// HTTPリクエストのデフォルトタイムアウト（Duration）
///
/// HTTPクライアント構築時に直接使用可能
pub fn http_timeout() -> Duration {
    Duration::from_secs(HTTP_TIMEOUT_SECS)
}

/// 設定ディレクトリ名（~/.config/ylc）
const CONFIG_DIR_NAME: &str = "ylc";

/// ユーザー設定ディレクトリ
///
/// トークンキャッシュなどの永続ファイルはすべてこのディレクトリ配下に置く。
pub struct Config {
    dir: PathBuf,
}

impl Config {
    /// デフォルトの設定ディレクトリを指すConfigを作成
    pub fn new() -> io::Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "config directory not available")
        })?;
        Ok(Self {
            dir: base.join(CONFIG_DIR_NAME),
        })
    }

    /// 任意のディレクトリを指すConfigを作成
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 設定ディレクトリ配下へファイルを書き込む
    ///
    /// ディレクトリが存在しない場合は作成する。認証情報を含むため
    /// ファイルは所有者のみ読み書き可能にする。
    pub fn write_file(&self, file_name: &str, data: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        fs::write(&path, data)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// 設定ディレクトリ配下のファイルを読み込む
    pub fn read_file(&self, file_name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.dir.join(file_name))
    }
}
