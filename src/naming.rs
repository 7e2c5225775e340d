//! ファイル名生成モジュール - 命名テンプレート・サニタイズ・衝突回避

use std::path::Path;

use regex::Regex;

use crate::parser::{Kind, ParsedInfo, format_price_rent, format_price_sell};

/// ファイル名（ステム+拡張子）の最大UTF-8バイト数
const MAX_FILENAME_BYTES: usize = 200;

/// 物件名が取得できなかった場合のプレースホルダ
const NAME_PLACEHOLDER: &str = "名称未取得";

/// ファイル名に使用できない文字
const FORBIDDEN_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// ファイル名として安全な文字列に変換する
///
/// 禁止文字は「・」に置換し、全角スペースを半角に統一、連続空白を畳む。
pub fn sanitize_filename(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }

    let replaced: String = s
        .chars()
        .map(|c| {
            if FORBIDDEN_CHARS.contains(&c) {
                '・'
            } else if c == '\u{3000}' {
                ' '
            } else {
                c
            }
        })
        .collect();

    // 連続空白を単一空白に
    match Regex::new(r"\s+") {
        Ok(re) => re.replace_all(&replaced, " ").trim().to_string(),
        Err(_) => replaced.trim().to_string(),
    }
}

/// 物件情報から新しいファイル名を生成する（拡張子含む）
///
/// (取引種別, 物件名の有無, 金額の有無) の組み合わせで
/// 固定テンプレートを選択する。
pub fn generate_filename(info: &ParsedInfo, original_path: &Path) -> String {
    let original_stem = original_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let extension = original_path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let stem = match (info.kind, info.name.as_deref(), info.amount) {
        (Kind::Sell, Some(name), Some(amount)) => {
            format!("【売買】{}_{}", safe_name(name), format_price_sell(amount))
        }
        (Kind::Rent, Some(name), Some(amount)) => {
            format!("【賃貸】{}_家賃{}", safe_name(name), format_price_rent(amount))
        }
        (Kind::Sell, Some(name), None) => {
            format!("【売買】{}_価格未取得", safe_name(name))
        }
        (Kind::Rent, Some(name), None) => {
            format!("【賃貸】{}_家賃未取得", safe_name(name))
        }
        (Kind::Unknown, Some(name), None) => {
            format!("【その他】{}_取引種別未取得", safe_name(name))
        }
        // 情報不足・不明
        (_, name, _) => {
            let base = match name {
                Some(n) => safe_name(n),
                None => sanitize_filename(original_stem),
            };
            format!("【その他】{}_未確定", base)
        }
    };

    truncate_filename(&format!("{}{}", sanitize_filename(&stem), extension))
}

/// 物件名をファイル名用に整える（空ならプレースホルダ）
fn safe_name(raw: &str) -> String {
    let sanitized = sanitize_filename(raw.trim());
    if sanitized.is_empty() {
        NAME_PLACEHOLDER.to_string()
    } else {
        sanitized
    }
}

/// ファイル名をUTF-8バイト数で切り詰める
///
/// 文字境界を壊さないよう最大4バイト戻り、それでも切れない場合は
/// 文字数ベースで先頭1/4を返す。
pub fn truncate_filename(filename: &str) -> String {
    if filename.len() <= MAX_FILENAME_BYTES {
        return filename.to_string();
    }

    let floor = MAX_FILENAME_BYTES.saturating_sub(4);
    for cut in (floor..=MAX_FILENAME_BYTES).rev() {
        if filename.is_char_boundary(cut) {
            return filename[..cut].to_string();
        }
    }

    // 安全マージンとして元の文字列の前半部分
    filename.chars().take(MAX_FILENAME_BYTES / 4).collect()
}

/// ディレクトリ内でのファイル名衝突を回避する
///
/// 同名ファイルがある場合は `{stem}-{連番}{拡張子}` を1から999まで試し、
/// すべて埋まっている場合はUNIXタイムスタンプを付与する。
/// チェックと後続のファイル操作はアトミックではない（単独運用前提）。
pub fn collision_free_filename(target_filename: &str, target_dir: &Path) -> String {
    if !target_dir.exists() {
        return target_filename.to_string();
    }

    if !target_dir.join(target_filename).exists() {
        return target_filename.to_string();
    }

    let path = Path::new(target_filename);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(target_filename);
    let suffix = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    for i in 1..=999 {
        let candidate = format!("{}-{}{}", stem, i, suffix);
        if !target_dir.join(&candidate).exists() {
            tracing::debug!(original = target_filename, resolved = %candidate, "collision avoided");
            return candidate;
        }
    }

    // 999まで埋まっている場合のフォールバック
    let timestamp = chrono::Utc::now().timestamp();
    let fallback = format!("{}-{}{}", stem, timestamp, suffix);
    tracing::warn!(filename = %fallback, "high collision count, using timestamp suffix");
    fallback
}
