//! TSV入出力モジュール - プレビュー/適用/ロールバック/エラーの記録

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// dry-run結果の1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewRecord {
    pub path: String,
    pub status: String,
    pub kind: String,
    pub name: String,
    pub amount: Option<i64>,
    pub text_length: Option<usize>,
    pub new_name: String,
    pub notes: String,
}

/// apply結果の1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyRecord {
    pub path: String,
    pub status: String,
    pub kind: String,
    pub name: String,
    pub amount: Option<i64>,
    pub text_length: Option<usize>,
    pub new_name: String,
    pub actual_new_path: String,
    pub timestamp: String,
    pub notes: String,
}

/// ロールバック用の1行（適用時に書き出し、rollbackコマンドで読み戻す）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackEntry {
    pub old_path: String,
    pub new_path: String,
    pub kind: String,
    pub name: String,
    pub amount: Option<i64>,
    pub timestamp: String,
    pub notes: String,
}

/// エラー記録の1行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub original_path: String,
    pub error_type: String,
    pub error_message: String,
    pub timestamp: String,
}

/// dry-run結果をTSVに書き出す
pub fn write_preview_tsv(records: &[PreviewRecord], output_path: &Path) -> Result<()> {
    write_records(records, output_path)?;
    tracing::info!(path = %output_path.display(), rows = records.len(), "preview TSV written");
    Ok(())
}

/// apply結果をTSVに書き出す
pub fn write_apply_tsv(records: &[ApplyRecord], output_path: &Path) -> Result<()> {
    write_records(records, output_path)?;
    tracing::info!(path = %output_path.display(), rows = records.len(), "apply TSV written");
    Ok(())
}

/// ロールバック用TSVを書き出す
pub fn write_rollback_tsv(entries: &[RollbackEntry], output_path: &Path) -> Result<()> {
    write_records(entries, output_path)?;
    tracing::info!(path = %output_path.display(), rows = entries.len(), "rollback TSV written");
    Ok(())
}

/// エラー記録をTSVに追記する（新規作成時のみヘッダーを書く）
pub fn append_error_tsv(errors: &[ErrorRecord], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let exists = output_path.exists();
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(output_path)
        .with_context(|| format!("Failed to open error TSV: {}", output_path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(!exists)
        .from_writer(file);
    for error in errors {
        writer.serialize(error)?;
    }
    writer.flush()?;

    tracing::debug!(path = %output_path.display(), rows = errors.len(), "error TSV appended");
    Ok(())
}

/// ロールバック用TSVを読み込む
pub fn read_rollback_tsv(input_path: &Path) -> Result<Vec<RollbackEntry>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_path(input_path)
        .with_context(|| format!("Failed to open rollback TSV: {}", input_path.display()))?;

    let mut entries = Vec::new();
    for record in reader.deserialize::<RollbackEntry>() {
        entries.push(record?);
    }

    tracing::info!(path = %input_path.display(), rows = entries.len(), "rollback TSV read");
    Ok(entries)
}

/// タイムスタンプ付きファイル名を生成する（例: mysoku_rollback_20250830_120000.tsv）
pub fn timestamped_filename(base_name: &str, extension: &str, timestamp: DateTime<Local>) -> String {
    format!("{}_{}{}", base_name, timestamp.format("%Y%m%d_%H%M%S"), extension)
}

fn write_records<T: Serialize>(records: &[T], output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)
        .with_context(|| format!("Failed to create TSV: {}", output_path.display()))?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rollback_tsv_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rollback.tsv");

        let entries = vec![
            RollbackEntry {
                old_path: "/x/original.pdf".to_string(),
                new_path: "/x/【売買】グランドタワー渋谷_1.2億円.pdf".to_string(),
                kind: "sell".to_string(),
                name: "グランドタワー渋谷".to_string(),
                amount: Some(120_000_000),
                timestamp: "2025-08-30T12:00:00".to_string(),
                notes: "rename_success".to_string(),
            },
            RollbackEntry {
                old_path: "/x/mystery.pdf".to_string(),
                new_path: "/x/【その他】mystery_未確定.pdf".to_string(),
                kind: "unknown".to_string(),
                name: String::new(),
                amount: None,
                timestamp: "2025-08-30T12:00:01".to_string(),
                notes: String::new(),
            },
        ];

        write_rollback_tsv(&entries, &path).unwrap();
        let read_back = read_rollback_tsv(&path).unwrap();

        assert_eq!(read_back.len(), 2);
        assert_eq!(read_back[0].old_path, entries[0].old_path);
        assert_eq!(read_back[0].amount, Some(120_000_000));
        assert_eq!(read_back[1].amount, None);
    }

    #[test]
    fn preview_tsv_has_expected_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.tsv");

        let records = vec![PreviewRecord {
            path: "/x/a.pdf".to_string(),
            status: "OK".to_string(),
            kind: "rent".to_string(),
            name: "レジデンス恵比寿".to_string(),
            amount: Some(210_000),
            text_length: Some(512),
            new_name: "【賃貸】レジデンス恵比寿_家賃210,000円.pdf".to_string(),
            notes: "embedded_text_512chars".to_string(),
        }];

        write_preview_tsv(&records, &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let header = content.lines().next().unwrap();
        assert_eq!(
            header,
            "path\tstatus\tkind\tname\tamount\ttext_length\tnew_name\tnotes"
        );
    }

    #[test]
    fn error_tsv_appends_without_duplicate_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("errors.tsv");

        let error = ErrorRecord {
            original_path: "/x/broken.pdf".to_string(),
            error_type: "PDF_PROCESSING_ERROR".to_string(),
            error_message: "extraction_error".to_string(),
            timestamp: "2025-08-30T12:00:00".to_string(),
        };

        append_error_tsv(std::slice::from_ref(&error), &path).unwrap();
        append_error_tsv(std::slice::from_ref(&error), &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let header_count = content
            .lines()
            .filter(|l| l.starts_with("original_path"))
            .count();
        assert_eq!(header_count, 1);
        assert_eq!(content.lines().count(), 3);
    }

    #[test]
    fn timestamped_filename_format() {
        let ts = Local.with_ymd_and_hms(2025, 8, 30, 12, 34, 56).unwrap();
        assert_eq!(
            timestamped_filename("mysoku_rollback", ".tsv", ts),
            "mysoku_rollback_20250830_123456.tsv"
        );
    }
}
