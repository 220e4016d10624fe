//! コマンドライン引数定義

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "ylc",
    about = "YouTube Live Chat viewer for the terminal",
    version
)]
pub struct Args {
    /// 対象のYouTube Live動画ID（省略時は起動後に入力）
    #[arg(short, long)]
    pub live_id: Option<String>,

    /// TUIの代わりに1行JSONで標準出力へ書き出す
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_live_id_and_json() {
        let args = Args::parse_from(["ylc", "--live-id", "abc123", "--json"]);
        assert_eq!(args.live_id.as_deref(), Some("abc123"));
        assert!(args.json);
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["ylc"]);
        assert!(args.live_id.is_none());
        assert!(!args.json);
    }
}
