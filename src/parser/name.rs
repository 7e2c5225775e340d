//! 物件名抽出モジュール

use regex::Regex;

use crate::naming::sanitize_filename;

/// 明示的な物件名フィールドのパターン（優先度順）
const NAME_FIELD_PATTERNS: &[&str] = &[
    r"物件名[:：]\s*([^\n\r]+)",
    r"建物名[:：]\s*([^\n\r]+)",
    r"マンション名[:：]\s*([^\n\r]+)",
    r"アパート名[:：]\s*([^\n\r]+)",
];

/// 部屋番号・階数パターン
const ROOM_PATTERN: &str =
    r"(?:\d{1,4}\s*号\s*室?|\d{1,3}\s*[fF]|\d{1,3}\s*階|#\s*\d{1,4}|-\d{1,4}|\d{1,4}\s*室)";

/// 括弧内のノイズパターン
const BRACKET_NOISE_PATTERN: &str =
    r"(?i)[（(](?:掲載用|新着|価格改定|更新日|NEW|更新|改定|値下げ)[)）]";

/// 物件名に混入するノイズ語（この順で除去する）
const NOISE_TOKENS: &[&str] = &[
    "掲載用", "チラシ", "新着", "価格改定", "更新日", "No.", "Ｎｏ．", "物件No",
    "NEW", "更新", "改定", "値下げ", "成約", "商談中", "図面", "間取り",
];

/// 物件名らしさのスコアリングで減点対象とする記号
const SYMBOL_CHARS: &str = "[]（）()/*-—_:;#|<>※→←↑↓★☆●○■□▲△▼▽";

/// テキストから物件名を抽出する
///
/// 明示的な「物件名：」等のフィールドを最優先し、
/// 見つからない場合は候補行のスコアリングで決める。
pub fn extract_name(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }

    // 1. 明示的な物件名フィールドを検索
    for pattern in NAME_FIELD_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Some(name) = clean_name(m.as_str()) {
                        return Some(name);
                    }
                }
            }
        }
    }

    // 2. 候補行からの抽出
    for candidate in extract_name_candidates(text, 10) {
        if let Some(name) = clean_name(&candidate) {
            return Some(name);
        }
    }

    None
}

/// 物件名からノイズ語・部屋番号を除去して正規化する
///
/// 結果が2文字未満、または数字のみの場合は無効として `None` を返す。
pub fn clean_name(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let mut s = s.to_string();

    // 括弧内のノイズを除去
    if let Ok(re) = Regex::new(BRACKET_NOISE_PATTERN) {
        s = re.replace_all(&s, " ").into_owned();
    }

    // 部屋番号・階数を除去
    if let Ok(re) = Regex::new(ROOM_PATTERN) {
        s = re.replace_all(&s, " ").into_owned();
    }

    // ノイズ語を除去（大文字小文字は区別しない）
    for token in NOISE_TOKENS {
        if let Ok(re) = Regex::new(&format!("(?i){}", regex::escape(token))) {
            s = re.replace_all(&s, " ").into_owned();
        }
    }

    let s = sanitize_filename(&s);

    // 極端に短い場合は無効
    if s.chars().count() < 2 {
        return None;
    }

    // 数字のみの場合も無効（部屋番号の可能性）
    if s.chars().all(|c| c.is_numeric()) {
        return None;
    }

    Some(s)
}

/// テキストから物件名候補の行を抽出する（スコア降順）
pub fn extract_name_candidates(text: &str, max_candidates: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    // 先頭50行に限定し、短すぎる行は除外
    let mut lines: Vec<&str> = text
        .lines()
        .take(50)
        .map(str::trim)
        .filter(|line| line.chars().count() >= 3)
        .collect();

    lines.sort_by(|a, b| {
        name_score(b)
            .partial_cmp(&name_score(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    lines
        .into_iter()
        .take(max_candidates)
        .map(str::to_string)
        .collect()
}

/// 行の物件名らしさをスコア化する
fn name_score(line: &str) -> f64 {
    let len = line.chars().count();
    if len == 0 {
        return -1.0;
    }

    // 記号の多さでペナルティ
    let symbol_count = line.chars().filter(|c| SYMBOL_CHARS.contains(*c)).count();
    let symbol_penalty = symbol_count as f64 / len as f64;

    // 数字の多さでペナルティ（住所・電話番号等を除外、過半数を占める場合のみ）
    let digit_count = line.chars().filter(|c| c.is_numeric()).count();
    let digit_penalty = if digit_count * 2 > len {
        digit_count as f64 / len as f64
    } else {
        0.0
    };

    // 長さボーナス（適度な長さが望ましい）
    let length_bonus = if (3..=30).contains(&len) {
        (len as f64 / 20.0).min(1.0)
    } else {
        0.0
    };

    // 日本語文字ボーナス
    let japanese_count = line.chars().filter(|c| is_japanese_char(*c)).count();
    let japanese_bonus = japanese_count as f64 / len as f64;

    japanese_bonus + length_bonus - symbol_penalty - digit_penalty
}

/// ひらがな・カタカナ・漢字か判定する
fn is_japanese_char(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}' | '\u{30A0}'..='\u{30FF}' | '\u{4E00}'..='\u{9FAF}')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_name_removes_room_markers() {
        assert_eq!(
            clean_name("グランドタワー渋谷 1203号室"),
            Some("グランドタワー渋谷".to_string())
        );
        assert_eq!(
            clean_name("パークハウス新宿 3F"),
            Some("パークハウス新宿".to_string())
        );
        assert_eq!(
            clean_name("メゾン青山 #402"),
            Some("メゾン青山".to_string())
        );
    }

    #[test]
    fn clean_name_removes_noise_tokens() {
        assert_eq!(
            clean_name("マンション青山 掲載用"),
            Some("マンション青山".to_string())
        );
        assert_eq!(
            clean_name("レジデンス恵比寿（新着）"),
            Some("レジデンス恵比寿".to_string())
        );
        assert_eq!(
            clean_name("ハイツ中野 NEW"),
            Some("ハイツ中野".to_string())
        );
    }

    #[test]
    fn clean_name_rejects_short_or_digit_only() {
        assert_eq!(clean_name("12"), None);
        assert_eq!(clean_name(""), None);
        assert_eq!(clean_name("   "), None);
        assert_eq!(clean_name("あ"), None);
    }

    #[test]
    fn clean_name_sanitizes_forbidden_chars() {
        assert_eq!(
            clean_name("タワー/渋谷:南"),
            Some("タワー・渋谷・南".to_string())
        );
    }

    #[test]
    fn extract_name_prefers_explicit_field() {
        let text = "NEW 掲載用\n物件名：グランドタワー渋谷 1203号室\n販売価格：1.2億円";
        assert_eq!(extract_name(text), Some("グランドタワー渋谷".to_string()));
    }

    #[test]
    fn extract_name_field_order_beats_line_order() {
        let text = "マンション名：サンハイム中野\n物件名：グランドタワー渋谷";
        // 物件名フィールドの方が優先度が高い
        assert_eq!(extract_name(text), Some("グランドタワー渋谷".to_string()));
    }

    #[test]
    fn extract_name_falls_back_to_candidate_lines() {
        let text = "2024/04/01\nグランドタワー渋谷\n03-1234-5678\n駅徒歩5分";
        assert_eq!(extract_name(text), Some("グランドタワー渋谷".to_string()));
    }

    #[test]
    fn extract_name_empty_text() {
        assert_eq!(extract_name(""), None);
    }

    #[test]
    fn candidates_prefer_japanese_lines() {
        let text = "ABC123456789\nレジデンス恵比寿\n!!!***";
        let candidates = extract_name_candidates(text, 10);
        assert_eq!(candidates.first().map(String::as_str), Some("レジデンス恵比寿"));
    }
}
