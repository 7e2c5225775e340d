//! 処理パイプラインモジュール - PDF1件の解析からリネーム案生成まで

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::naming::generate_filename;
use crate::parser::{Kind, ParsedInfo};
use crate::pdf;
use crate::tsv::{ApplyRecord, PreviewRecord};

/// 処理ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Error => "ERROR",
        }
    }
}

/// 1ファイル分の処理結果
///
/// TSVに載るフィールドをすべて構築時に宣言する（後付けの属性は持たない）。
#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub path: PathBuf,
    pub status: Status,
    pub kind: Kind,
    pub name: Option<String>,
    pub amount: Option<i64>,
    pub text_length: Option<usize>,
    pub new_name: Option<String>,
    pub actual_new_path: Option<PathBuf>,
    pub timestamp: Option<String>,
    pub notes: String,
}

impl ProcessResult {
    fn error(path: &Path, notes: String) -> Self {
        Self {
            path: path.to_path_buf(),
            status: Status::Error,
            kind: Kind::Unknown,
            name: None,
            amount: None,
            text_length: None,
            new_name: None,
            actual_new_path: None,
            timestamp: None,
            notes,
        }
    }

    pub fn to_preview_record(&self) -> PreviewRecord {
        PreviewRecord {
            path: self.path.display().to_string(),
            status: self.status.as_str().to_string(),
            kind: self.kind.as_str().to_string(),
            name: self.name.clone().unwrap_or_default(),
            amount: self.amount,
            text_length: self.text_length,
            new_name: self.new_name.clone().unwrap_or_default(),
            notes: self.notes.clone(),
        }
    }

    pub fn to_apply_record(&self) -> ApplyRecord {
        ApplyRecord {
            path: self.path.display().to_string(),
            status: self.status.as_str().to_string(),
            kind: self.kind.as_str().to_string(),
            name: self.name.clone().unwrap_or_default(),
            amount: self.amount,
            text_length: self.text_length,
            new_name: self.new_name.clone().unwrap_or_default(),
            actual_new_path: self
                .actual_new_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            timestamp: self.timestamp.clone().unwrap_or_default(),
            notes: self.notes.clone(),
        }
    }
}

/// 単一PDFを解析し、リネーム案までを生成する
///
/// 抽出エラーはERROR行として返し、バッチ全体は止めない。
pub fn process_single_pdf(pdf_path: &Path) -> ProcessResult {
    tracing::debug!(path = %pdf_path.display(), "processing");

    let extracted = pdf::analyze_pdf(pdf_path);
    if extracted.note == "extraction_error" {
        return ProcessResult::error(pdf_path, extracted.note);
    }

    let info = ParsedInfo::parse(&extracted.text);
    let new_name = generate_filename(&info, pdf_path);

    ProcessResult {
        path: pdf_path.to_path_buf(),
        status: Status::Ok,
        kind: info.kind,
        name: info.name,
        amount: info.amount,
        text_length: Some(extracted.text_length),
        new_name: Some(new_name),
        actual_new_path: None,
        timestamp: None,
        notes: if extracted.needs_ocr {
            "needs_ocr".to_string()
        } else {
            extracted.note
        },
    }
}

/// 処理対象のPDF一覧を得る（単一ファイルまたはディレクトリ再帰）
pub fn find_pdfs(path: &Path, max_files: Option<usize>) -> Result<Vec<PathBuf>> {
    let mut candidates = Vec::new();

    if path.is_file() {
        if !is_pdf(path) {
            bail!("Not a PDF: {}", path.display());
        }
        candidates.push(path.to_path_buf());
    } else if path.is_dir() {
        collect_pdfs(path, &mut candidates)?;
        candidates.sort();
    } else {
        bail!("Path not found or not a PDF: {}", path.display());
    }

    if let Some(max) = max_files {
        candidates.truncate(max);
    }
    Ok(candidates)
}

fn collect_pdfs(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_pdfs(&path, out)?;
        } else if is_pdf(&path) {
            out.push(path);
        }
    }
    Ok(())
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_pdfs_recurses_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("b.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("sub/a.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("note.txt"), b"x").unwrap();

        let pdfs = find_pdfs(dir.path(), None).unwrap();
        assert_eq!(pdfs.len(), 2);
        assert!(pdfs[0].ends_with("b.pdf"));
        assert!(pdfs[1].ends_with("sub/a.pdf"));
    }

    #[test]
    fn find_pdfs_respects_max_files() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        assert_eq!(find_pdfs(dir.path(), Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn find_pdfs_rejects_missing_path() {
        assert!(find_pdfs(Path::new("/no/such/path"), None).is_err());
    }

    #[test]
    fn process_missing_pdf_yields_error_row() {
        let result = process_single_pdf(Path::new("/no/such/file.pdf"));
        assert_eq!(result.status, Status::Error);
        assert_eq!(result.kind, Kind::Unknown);
        assert_eq!(result.new_name, None);
        assert_eq!(result.notes, "extraction_error");
    }
}
