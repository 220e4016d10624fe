/// トークンをマスキングしてログ出力用の文字列を生成
///
/// 最初の4文字と最後の4文字のみを表示し、中間を***でマスキング
pub fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "***".to_string();
    }

    let len = token.len();
    if len <= 8 {
        // 短いトークンは全体をマスク
        return "***".to_string();
    }

    let prefix = &token[..4];
    let suffix = &token[len - 4..];
    format!("{}***{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        // 通常のトークン
        assert_eq!(mask_token("ya29.a0AfB_byCdEf123456"), "ya29***3456");

        // 短いトークン
        assert_eq!(mask_token("short"), "***");

        // 空文字列
        assert_eq!(mask_token(""), "***");

        // 8文字ちょうど
        assert_eq!(mask_token("12345678"), "***");

        // 9文字（マスキング開始）
        assert_eq!(mask_token("123456789"), "1234***6789");
    }
}
