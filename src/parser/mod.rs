//! テキスト解析モジュール - マイソク（物件チラシ）情報の抽出

mod amount;
mod kind;
mod name;
mod number;

pub use amount::{
    AmountRoles, check_price_unspecified, extract_multiple_amounts, format_price_rent,
    format_price_sell, parse_amount_jpy,
};
pub use kind::detect_kind;
pub use name::{clean_name, extract_name, extract_name_candidates};
pub use number::normalize_number_string;

/// 取引種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kind {
    /// 売買
    Sell,
    /// 賃貸
    Rent,
    /// 判定不能
    #[default]
    Unknown,
}

impl Kind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Sell => "sell",
            Kind::Rent => "rent",
            Kind::Unknown => "unknown",
        }
    }
}

/// マイソクから抽出された物件情報
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedInfo {
    /// 取引種別
    pub kind: Kind,
    /// 物件名（クリーニング済み）
    pub name: Option<String>,
    /// 金額（円単位の整数。未定・応相談も None）
    pub amount: Option<i64>,
}

impl ParsedInfo {
    /// テキストから物件情報を解析する
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }

        let kind = detect_kind(text);
        Self {
            kind,
            name: extract_name(text),
            amount: extract_amount(text, kind),
        }
    }
}

/// 取引種別に応じた優先順位で金額を抽出する
///
/// 賃貸なら賃料、売買なら売買価格を優先し、該当役割が無ければもう一方へ、
/// それも無ければテキスト全体の金額解析、最後に役割金額の最大値に落ちる。
pub fn extract_amount(text: &str, kind: Kind) -> Option<i64> {
    if text.is_empty() {
        return None;
    }

    // 価格未定の定型句は数値の有無に関わらず金額なしとする
    if check_price_unspecified(text) {
        return None;
    }

    let roles = extract_multiple_amounts(text);

    let preferred = match kind {
        Kind::Rent => roles.rent.or(roles.price),
        Kind::Sell => roles.price.or(roles.rent),
        Kind::Unknown => None,
    };

    preferred
        .or_else(|| parse_amount_jpy(text))
        .or_else(|| roles.max_amount())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELL_TEXT: &str = "物件名：グランドタワー渋谷 1203号室\n販売価格：1.2億円\n所在地：東京都渋谷区";
    const RENT_TEXT: &str = "建物名：レジデンス恵比寿\n賃料：210,000円\n敷金：1ヶ月 礼金：1ヶ月";

    #[test]
    fn parse_sell_flyer() {
        let info = ParsedInfo::parse(SELL_TEXT);
        assert_eq!(info.kind, Kind::Sell);
        assert_eq!(info.name.as_deref(), Some("グランドタワー渋谷"));
        assert_eq!(info.amount, Some(120_000_000));
    }

    #[test]
    fn parse_rent_flyer() {
        let info = ParsedInfo::parse(RENT_TEXT);
        assert_eq!(info.kind, Kind::Rent);
        assert_eq!(info.name.as_deref(), Some("レジデンス恵比寿"));
        assert_eq!(info.amount, Some(210_000));
    }

    #[test]
    fn parse_empty_text() {
        let info = ParsedInfo::parse("");
        assert_eq!(info.kind, Kind::Unknown);
        assert_eq!(info.name, None);
        assert_eq!(info.amount, None);
    }

    #[test]
    fn amount_prefers_role_matching_kind() {
        let text = "販売価格：5,000万円\n家賃：210,000円";
        assert_eq!(extract_amount(text, Kind::Sell), Some(50_000_000));
        assert_eq!(extract_amount(text, Kind::Rent), Some(210_000));
    }

    #[test]
    fn amount_falls_back_to_other_role() {
        let text = "家賃：210,000円";
        assert_eq!(extract_amount(text, Kind::Sell), Some(210_000));
    }

    #[test]
    fn amount_unknown_kind_uses_whole_text_parse() {
        assert_eq!(extract_amount("5,000万円", Kind::Unknown), Some(50_000_000));
    }

    #[test]
    fn amount_unspecified_short_circuits() {
        let text = "販売価格：応相談\n参考：9,800万円";
        assert_eq!(extract_amount(text, Kind::Sell), None);
    }
}
