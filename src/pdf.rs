//! PDF処理モジュール - 埋め込みテキストレイヤーの抽出

use std::path::Path;

use anyhow::{Context, Result, bail};
use lopdf::Document;

/// テキストが少なすぎてOCRが必要と判断する文字数の閾値
pub const OCR_THRESHOLD: usize = 200;

/// PDFテキスト抽出の結果
#[derive(Debug, Clone)]
pub struct ExtractResult {
    /// 全ページのテキスト（改行結合）
    pub text: String,
    /// 前後空白を除いたテキスト長
    pub text_length: usize,
    /// OCRが必要と思われるか（テキストが閾値未満）
    pub needs_ocr: bool,
    /// 処理メモ（TSVのnotes列に載る）
    pub note: String,
}

/// PDFの埋め込みテキストレイヤーからテキストを抽出する
///
/// OCRは行わない。抽出に失敗したページは空文字列として読み飛ばす。
pub fn extract_text_embedded(pdf_path: &Path) -> Result<String> {
    let doc = Document::load(pdf_path)
        .with_context(|| format!("Failed to open PDF: {}", pdf_path.display()))?;

    let mut parts = Vec::new();
    for (page_number, _) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) => parts.push(text),
            Err(e) => {
                // 壊れたページは読み飛ばして続行
                tracing::debug!(page = page_number, error = %e, "page text extraction failed");
                parts.push(String::new());
            }
        }
    }

    Ok(parts.join("\n"))
}

/// PDFを解析して埋め込みテキストとOCR要否を返す
///
/// 抽出エラーはバッチを止めず、空テキスト＋エラーメモの結果に落とす。
pub fn analyze_pdf(pdf_path: &Path) -> ExtractResult {
    match try_analyze(pdf_path) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(path = %pdf_path.display(), error = %e, "PDF analysis failed");
            ExtractResult {
                text: String::new(),
                text_length: 0,
                needs_ocr: true,
                note: "extraction_error".to_string(),
            }
        }
    }
}

fn try_analyze(pdf_path: &Path) -> Result<ExtractResult> {
    if !pdf_path.exists() {
        bail!("PDF not found: {}", pdf_path.display());
    }

    let is_pdf = pdf_path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        bail!("Not a PDF file: {}", pdf_path.display());
    }

    let text = extract_text_embedded(pdf_path)?;
    let length = text.trim().chars().count();
    let needs_ocr = length < OCR_THRESHOLD;

    let note = if length == 0 {
        "no_text_extracted".to_string()
    } else if needs_ocr {
        format!("short_text_{}chars", length)
    } else {
        format!("embedded_text_{}chars", length)
    };

    Ok(ExtractResult {
        text,
        text_length: length,
        needs_ocr,
        note,
    })
}
