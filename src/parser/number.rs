//! 数字文字列の正規化モジュール

/// 数字文字列を正規化する（全角→半角、カンマ・通貨記号・空白の除去）
///
/// 冪等であり、どんな入力に対しても失敗しない。
pub fn normalize_number_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            // 全角数字を半角に変換
            '０'..='９' => {
                let offset = c as u32 - '０' as u32;
                if let Some(half) = char::from_u32('0' as u32 + offset) {
                    result.push(half);
                }
            }
            // カンマ・通貨記号・空白は除去
            ',' | '，' | '¥' | '￥' | ' ' | '\u{3000}' => {}
            _ => result.push(c),
        }
    }

    result
}
