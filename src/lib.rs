//! マイソクリネーマー - 物件チラシPDFの自動リネームツール
//!
//! # 機能
//! - PDFの埋め込みテキストレイヤーからテキスト抽出
//! - 取引種別（売買/賃貸）・物件名・金額のルールベース抽出
//! - 抽出情報に基づく決定的なファイル名生成と衝突回避
//! - dry-run / apply / rollback のバッチCLIとTSV監査ログ

pub mod cli;
pub mod fileops;
pub mod naming;
pub mod parser;
pub mod pdf;
pub mod pipeline;
pub mod tsv;

pub use parser::{Kind, ParsedInfo};
