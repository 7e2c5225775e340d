//! 取引種別判定モジュール

use regex::Regex;

use super::Kind;

/// 売買のヒントになるキーワード
const SELL_HINTS: &[&str] = &[
    "販売価格", "売出価格", "価格", "売買", "売出", "購入", "分譲", "売却", "販売",
];

/// 賃貸のヒントになるキーワード
const RENT_HINTS: &[&str] = &[
    "賃料", "家賃", "月額", "管理費", "敷金", "礼金", "賃貸", "貸", "テナント",
];

/// 売買を強く示すパターン（一致ごとに+3）
const STRONG_SELL_PATTERNS: &[&str] = &[
    r"売買|分譲|購入|販売価格",
    r"\d+(?:万|億)円.*売",
];

/// 賃貸を強く示すパターン（一致ごとに+3）
const STRONG_RENT_PATTERNS: &[&str] = &[
    r"賃貸|テナント|月額",
    r"家賃.*\d+(?:万|,\d+)?円",
    r"敷金|礼金|管理費",
];

/// テキストから取引種別を判定する
///
/// キーワードの出現と強いパターンの重み付けでスコアを算出し、
/// 大きい側を採用する。同点（0対0を含む）は unknown。
pub fn detect_kind(text: &str) -> Kind {
    if text.is_empty() {
        return Kind::Unknown;
    }

    let normalized = text.to_lowercase();

    let mut sell_score = SELL_HINTS
        .iter()
        .filter(|hint| normalized.contains(&hint.to_lowercase()))
        .count() as i32;
    let mut rent_score = RENT_HINTS
        .iter()
        .filter(|hint| normalized.contains(&hint.to_lowercase()))
        .count() as i32;

    for pattern in STRONG_SELL_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if re.is_match(&normalized) {
                sell_score += 3;
            }
        }
    }

    for pattern in STRONG_RENT_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if re.is_match(&normalized) {
                rent_score += 3;
            }
        }
    }

    if rent_score > sell_score {
        Kind::Rent
    } else if sell_score > rent_score {
        Kind::Sell
    } else {
        Kind::Unknown
    }
}
