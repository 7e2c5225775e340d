//! CLIモジュール - dry-run / apply / rollback コマンド

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;
use clap::{Args, Parser, Subcommand};

use crate::fileops::{FileManager, FileOperation};
use crate::naming::collision_free_filename;
use crate::parser::Kind;
use crate::pipeline::{ProcessResult, Status, find_pdfs, process_single_pdf};
use crate::tsv;
use crate::tsv::{ErrorRecord, RollbackEntry};

#[derive(Parser, Debug)]
#[command(
    name = "mysoku-rename",
    about = "Rename real-estate flyer PDFs from their extracted listing facts",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logs
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview renames without touching any file (TSV output)
    DryRun(RunArgs),
    /// Rename or copy files, writing apply/rollback TSVs
    Apply(ApplyArgs),
    /// Reverse the operations recorded in a rollback TSV
    Rollback(RollbackArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// PDF file or directory
    path: PathBuf,

    /// TSV path for preview/apply results
    #[arg(long)]
    output: Option<PathBuf>,

    /// Limit number of PDFs to process
    #[arg(long)]
    max_files: Option<usize>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    #[command(flatten)]
    run: RunArgs,

    /// Copy files to this directory (default: rename in same directory)
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Stop at the first file-operation error
    #[arg(long)]
    strict: bool,
}

#[derive(Args, Debug)]
struct RollbackArgs {
    /// Rollback TSV written by a previous apply run
    #[arg(long)]
    tsv: PathBuf,

    /// Preview the rollback without moving files
    #[arg(long)]
    dry_run: bool,
}

/// CLIのエントリポイント。終了コードを返す。
pub fn run() -> i32 {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let outcome = match cli.command {
        Command::DryRun(args) => cmd_dry_run(&args),
        Command::Apply(args) => cmd_apply(&args),
        Command::Rollback(args) => cmd_rollback(&args),
    };

    match outcome {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = format!("{e:#}"), "command failed");
            1
        }
    }
}

fn init_logging(debug: bool) {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
}

/// 集計用の統計
#[derive(Debug, Default)]
struct RunStats {
    errors: usize,
    ocr_needed: usize,
    sell: usize,
    rent: usize,
    unknown: usize,
    name_missing: usize,
    amount_missing: usize,
}

impl RunStats {
    fn record(&mut self, result: &ProcessResult) {
        if result.status == Status::Error {
            self.errors += 1;
            return;
        }
        if result.notes == "needs_ocr" {
            self.ocr_needed += 1;
        }
        match result.kind {
            Kind::Sell => self.sell += 1,
            Kind::Rent => self.rent += 1,
            Kind::Unknown => self.unknown += 1,
        }
        if result.name.is_none() {
            self.name_missing += 1;
        }
        if result.amount.is_none() {
            self.amount_missing += 1;
        }
    }
}

/// ドライランモード：ファイルは変更せず処理結果をTSVにプレビューする
fn cmd_dry_run(args: &RunArgs) -> Result<i32> {
    let pdfs = find_pdfs(&args.path, args.max_files)?;

    let mut stats = RunStats::default();
    let mut results = Vec::with_capacity(pdfs.len());
    let mut collisions_expected = 0usize;

    for pdf in &pdfs {
        let result = process_single_pdf(pdf);
        stats.record(&result);

        // 同一ディレクトリでのリネームを想定した衝突チェック
        if let (Some(new_name), Some(parent)) = (&result.new_name, pdf.parent()) {
            if collision_free_filename(new_name, parent) != *new_name {
                collisions_expected += 1;
            }
        }

        results.push(result);
    }

    let out_tsv = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("mysoku_preview.tsv"));
    let records: Vec<_> = results.iter().map(ProcessResult::to_preview_record).collect();
    tsv::write_preview_tsv(&records, &out_tsv)?;

    let success = results.len() - stats.errors;
    tracing::info!(
        total = results.len(),
        success,
        errors = stats.errors,
        need_ocr = stats.ocr_needed,
        collisions_expected,
        output = %out_tsv.display(),
        "dry-run completed"
    );
    if success > 0 {
        tracing::info!(
            sell = stats.sell,
            rent = stats.rent,
            unknown = stats.unknown,
            name_missing = stats.name_missing,
            amount_missing = stats.amount_missing,
            "extraction summary"
        );
    }

    Ok(0)
}

/// アプライモード：実際にリネーム/コピーを実行し、ロールバックTSVを残す
fn cmd_apply(args: &ApplyArgs) -> Result<i32> {
    let pdfs = find_pdfs(&args.run.path, args.run.max_files)?;
    let base_dir = if args.run.path.is_dir() {
        args.run.path.clone()
    } else {
        args.run
            .path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    };

    let started = Local::now();
    let timestamp = started.format("%Y-%m-%dT%H:%M:%S").to_string();
    let rollback_path = base_dir.join(tsv::timestamped_filename("mysoku_rollback", ".tsv", started));
    let apply_path = args
        .run
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(tsv::timestamped_filename("mysoku_apply", ".tsv", started)));

    tracing::info!(
        mode = if args.outdir.is_some() { "copy" } else { "rename" },
        files = pdfs.len(),
        "starting apply"
    );

    let mut manager = FileManager::new();
    let mut stats = RunStats::default();
    let mut results = Vec::with_capacity(pdfs.len());
    let mut rollback_entries = Vec::new();
    let mut errors = Vec::new();

    for (i, pdf) in pdfs.iter().enumerate() {
        tracing::debug!(index = i + 1, total = pdfs.len(), path = %pdf.display(), "processing");

        let mut result = process_single_pdf(pdf);
        stats.record(&result);

        if result.status == Status::Error {
            errors.push(ErrorRecord {
                original_path: pdf.display().to_string(),
                error_type: "PDF_PROCESSING_ERROR".to_string(),
                error_message: result.notes.clone(),
                timestamp: timestamp.clone(),
            });
            results.push(result);
            continue;
        }

        let Some(new_name) = result.new_name.clone() else {
            results.push(result);
            continue;
        };

        let operation = match &args.outdir {
            Some(outdir) => manager.copy_file(pdf, &new_name, outdir),
            None => manager.rename_file(pdf, &new_name),
        };

        match operation {
            Ok(op) => {
                result.notes = format!("Applied: {} successful", op.operation_type.as_str());
                result.actual_new_path = Some(op.final_path.clone());
                result.timestamp = Some(timestamp.clone());
                rollback_entries.push(rollback_entry(&result, &op, &timestamp));
            }
            Err(e) => {
                stats.errors += 1;
                result.status = Status::Error;
                result.notes = format!("File operation failed: {e}");
                result.timestamp = Some(timestamp.clone());
                errors.push(ErrorRecord {
                    original_path: pdf.display().to_string(),
                    error_type: "FILE_OPERATION_ERROR".to_string(),
                    error_message: e.to_string(),
                    timestamp: timestamp.clone(),
                });
                if args.strict {
                    tracing::error!("strict mode: stopping at first error");
                    results.push(result);
                    break;
                }
            }
        }

        results.push(result);
    }

    if !rollback_entries.is_empty() {
        tsv::write_rollback_tsv(&rollback_entries, &rollback_path)?;
    }

    let apply_records: Vec<_> = results.iter().map(ProcessResult::to_apply_record).collect();
    tsv::write_apply_tsv(&apply_records, &apply_path)?;

    if !errors.is_empty() {
        tsv::append_error_tsv(&errors, &base_dir.join("errors.tsv"))?;
    }

    let success = results
        .iter()
        .filter(|r| r.status == Status::Ok && r.actual_new_path.is_some())
        .count();
    tracing::info!(
        total = pdfs.len(),
        success,
        errors = stats.errors,
        output = %apply_path.display(),
        "apply completed"
    );

    let summary = manager.summary();
    if summary.total > 0 {
        tracing::info!(
            operations = summary.total,
            renames = summary.renames,
            copies = summary.copies,
            collisions_avoided = summary.collisions_avoided,
            "file operations"
        );
    }

    Ok(if stats.errors > 0 { 1 } else { 0 })
}

fn rollback_entry(result: &ProcessResult, op: &FileOperation, timestamp: &str) -> RollbackEntry {
    RollbackEntry {
        old_path: result.path.display().to_string(),
        new_path: op.final_path.display().to_string(),
        kind: result.kind.as_str().to_string(),
        name: result.name.clone().unwrap_or_default(),
        amount: result.amount,
        timestamp: timestamp.to_string(),
        notes: format!("{}_success", op.operation_type.as_str()),
    }
}

/// ロールバックモード：TSVに記録された操作を逆転する
fn cmd_rollback(args: &RollbackArgs) -> Result<i32> {
    let entries = tsv::read_rollback_tsv(&args.tsv)?;

    let mut success = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for entry in &entries {
        let new_path = Path::new(&entry.new_path);
        let old_path = Path::new(&entry.old_path);

        if !new_path.exists() {
            tracing::warn!(path = %entry.new_path, "rollback source missing, skipping");
            skipped += 1;
            continue;
        }
        if old_path.exists() {
            tracing::warn!(path = %entry.old_path, "rollback target already exists, skipping");
            skipped += 1;
            continue;
        }

        if args.dry_run {
            tracing::info!(from = %entry.new_path, to = %entry.old_path, "would roll back");
            success += 1;
            continue;
        }

        let restore = || -> std::io::Result<()> {
            if let Some(parent) = old_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::rename(new_path, old_path)
        };
        match restore() {
            Ok(()) => {
                tracing::debug!(from = %entry.new_path, to = %entry.old_path, "rolled back");
                success += 1;
            }
            Err(e) => {
                tracing::error!(from = %entry.new_path, error = %e, "rollback failed");
                failed += 1;
            }
        }
    }

    tracing::info!(
        total = entries.len(),
        success,
        skipped,
        failed,
        dry_run = args.dry_run,
        "rollback completed"
    );

    Ok(if failed > 0 { 1 } else { 0 })
}
