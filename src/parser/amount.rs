//! 金額抽出モジュール - 億/万/円表記の解析と役割別抽出

use regex::Regex;

use super::number::normalize_number_string;

/// 価格未定・応相談を表す定型句（これが出たら金額なし扱い）
const UNSPECIFIED_PHRASES: &[&str] = &[
    "応相談",
    "要問合せ",
    "要問合わせ",
    "価格未定",
    "要相談",
    "別途相談",
    "お問い合わせ",
];

/// 金額パターンの解釈単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AmountUnit {
    /// N億[円]
    Oku,
    /// N万[円]
    Man,
    /// N円
    Yen,
    /// 単位なしの数字列（7桁以上のみ金額とみなす）
    Bare,
}

/// 価格抽出パターン（優先度順、最初に一致したクラスが勝つ）
const PRICE_PATTERNS: &[(&str, AmountUnit)] = &[
    // 億円パターン
    (
        r"([0-9０-９]+(?:[.．][0-9０-９]+)?)\s*億\s*円?",
        AmountUnit::Oku,
    ),
    // 万円パターン
    (r"([0-9０-９,，]+)\s*万\s*円?", AmountUnit::Man),
    // 千万円パターン（4桁以上の万円。直前のパターンに吸収されるが挙動互換のため残す）
    (r"([0-9０-９,，]{4,})\s*万\s*円?", AmountUnit::Man),
    // 円パターン（4桁以上）
    (r"([0-9０-９,，]{4,})\s*円", AmountUnit::Yen),
    // 数字のみ（7桁以上を価格と判定）
    (r"([0-9０-９,，]{7,})", AmountUnit::Bare),
];

// 役割別抽出パターン（役割ごとに最初に解析できた1件のみ採用）
const RENT_ROLE_PATTERNS: &[&str] = &[
    r"賃料[:：]?\s*([0-9０-９,，]+(?:[.．][0-9０-９]+)?[万円億]+)",
    r"家賃[:：]?\s*([0-9０-９,，]+(?:[.．][0-9０-９]+)?[万円億]+)",
    r"月額[:：]?\s*([0-9０-９,，]+(?:[.．][0-9０-９]+)?[万円億]+)",
];
const PRICE_ROLE_PATTERNS: &[&str] = &[
    r"(?:販売)?価格[:：]?\s*([0-9０-９,，]+(?:[.．][0-9０-９]+)?[万円億]+)",
    r"売出[価格]*[:：]?\s*([0-9０-９,，]+(?:[.．][0-9０-９]+)?[万円億]+)",
];

/// 役割別に抽出された金額
///
/// 1テキストにつき1回生成し、取引種別に応じた優先順位付けで即座に消費する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmountRoles {
    /// 賃料（家賃/賃料/月額）
    pub rent: Option<i64>,
    /// 売買価格（価格/販売価格/売出）
    pub price: Option<i64>,
    /// 価格未定・応相談の定型句を検出したか
    pub price_unspecified: bool,
}

impl AmountRoles {
    /// 抽出された金額のうち最大のもの（売買価格である可能性が高い）
    pub fn max_amount(&self) -> Option<i64> {
        match (self.rent, self.price) {
            (Some(r), Some(p)) => Some(r.max(p)),
            (Some(r), None) => Some(r),
            (None, Some(p)) => Some(p),
            (None, None) => None,
        }
    }
}

/// 価格未定・応相談の定型句が含まれるか判定する
pub fn check_price_unspecified(text: &str) -> bool {
    UNSPECIFIED_PHRASES.iter().any(|p| text.contains(p))
}

/// テキストから日本円の金額を抽出する（円単位の整数）
///
/// 優先度順のパターンを順に試し、最初に一致したクラスの最初のマッチのみ使う。
/// 数値として解釈できないマッチは読み飛ばして次のパターンに進む。
pub fn parse_amount_jpy(text: &str) -> Option<i64> {
    if text.trim().is_empty() {
        return None;
    }

    for (pattern, unit) in PRICE_PATTERNS {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    let number = normalize_number_string(m.as_str()).replace('．', ".");
                    if let Some(yen) = interpret_amount(&number, *unit) {
                        return Some(yen);
                    }
                }
            }
        }
    }

    None
}

/// 正規化済み数字列を単位に従って円に換算する
fn interpret_amount(number: &str, unit: AmountUnit) -> Option<i64> {
    match unit {
        AmountUnit::Oku => {
            let value: f64 = number.parse().ok()?;
            let yen = (value * 100_000_000.0).round();
            if yen.is_finite() && yen >= 0.0 && yen <= i64::MAX as f64 {
                Some(yen as i64)
            } else {
                None
            }
        }
        AmountUnit::Man => {
            let value: i64 = number.parse().ok()?;
            value.checked_mul(10_000)
        }
        AmountUnit::Yen => number.parse().ok(),
        AmountUnit::Bare => {
            let value: i64 = number.parse().ok()?;
            // 100万以上のみ円として扱う
            (value >= 1_000_000).then_some(value)
        }
    }
}

/// テキストから役割別（賃料/売買価格）の金額を抽出する
///
/// 価格未定の定型句を検出した場合は数値を一切返さない。
pub fn extract_multiple_amounts(text: &str) -> AmountRoles {
    if text.is_empty() {
        return AmountRoles::default();
    }

    if check_price_unspecified(text) {
        return AmountRoles {
            price_unspecified: true,
            ..AmountRoles::default()
        };
    }

    AmountRoles {
        rent: first_role_amount(text, RENT_ROLE_PATTERNS),
        price: first_role_amount(text, PRICE_ROLE_PATTERNS),
        price_unspecified: false,
    }
}

/// 役割パターンリストの中で最初に解析できた金額を返す
fn first_role_amount(text: &str, patterns: &[&str]) -> Option<i64> {
    for pattern in patterns {
        if let Ok(re) = Regex::new(pattern) {
            if let Some(caps) = re.captures(text) {
                if let Some(m) = caps.get(1) {
                    if let Some(amount) = parse_amount_jpy(m.as_str()) {
                        return Some(amount);
                    }
                }
            }
        }
    }
    None
}

/// 売買価格を表示用にフォーマットする（1億以上はN.X億円、未満はN,NNN万円）
pub fn format_price_sell(yen: i64) -> String {
    if yen < 0 {
        return "0円".to_string();
    }

    if yen >= 100_000_000 {
        // 小数1桁に丸め、ちょうど整数なら小数部を省く
        let oku = (yen as f64 / 100_000_000.0 * 10.0).round() / 10.0;
        if oku.fract() == 0.0 {
            format!("{}億円", oku as i64)
        } else {
            format!("{:.1}億円", oku)
        }
    } else {
        format!("{}万円", group_thousands(yen / 10_000))
    }
}

/// 賃貸価格を表示用にフォーマットする（N,NNN円）
pub fn format_price_rent(yen: i64) -> String {
    if yen < 0 {
        return "0円".to_string();
    }
    format!("{}円", group_thousands(yen))
}

/// 3桁ごとのカンマ区切り
fn group_thousands(n: i64) -> String {
    let digits: Vec<char> = n.to_string().chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*c);
    }
    out
}
