//! ファイル操作モジュール - リネーム/コピーの実行と操作ログ

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::naming::collision_free_filename;

/// ファイル操作のエラー
#[derive(Debug, Error)]
pub enum FileOpError {
    #[error("original file does not exist: {0}")]
    MissingOriginal(PathBuf),
    #[error("original file has no parent directory: {0}")]
    NoParentDir(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// 操作の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Rename,
    Copy,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::Rename => "rename",
            OperationType::Copy => "copy",
        }
    }
}

/// 実行済みファイル操作の記録
#[derive(Debug, Clone)]
pub struct FileOperation {
    /// 元のファイルパス
    pub original_path: PathBuf,
    /// 希望していたファイル名
    pub requested_name: String,
    /// 実際に書き込まれたパス（衝突回避後）
    pub final_path: PathBuf,
    /// 操作の種類
    pub operation_type: OperationType,
}

impl FileOperation {
    /// 衝突回避によって希望名から変わったか
    pub fn collision_avoided(&self) -> bool {
        self.final_path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n != self.requested_name)
    }
}

/// 操作統計
#[derive(Debug, Clone, Copy, Default)]
pub struct OperationSummary {
    pub total: usize,
    pub renames: usize,
    pub copies: usize,
    pub collisions_avoided: usize,
}

/// ファイル操作を実行し記録するマネージャ
#[derive(Debug, Default)]
pub struct FileManager {
    operations: Vec<FileOperation>,
}

impl FileManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 同一ディレクトリ内でファイルをリネームする
    pub fn rename_file(
        &mut self,
        original_path: &Path,
        new_filename: &str,
    ) -> Result<FileOperation, FileOpError> {
        if !original_path.exists() {
            return Err(FileOpError::MissingOriginal(original_path.to_path_buf()));
        }

        let target_dir = original_path
            .parent()
            .ok_or_else(|| FileOpError::NoParentDir(original_path.to_path_buf()))?;
        let final_name = collision_free_filename(new_filename, target_dir);
        let target_path = target_dir.join(&final_name);

        tracing::debug!(from = %original_path.display(), to = %target_path.display(), "renaming");
        std::fs::rename(original_path, &target_path)?;

        let op = FileOperation {
            original_path: original_path.to_path_buf(),
            requested_name: new_filename.to_string(),
            final_path: target_path,
            operation_type: OperationType::Rename,
        };
        self.operations.push(op.clone());
        Ok(op)
    }

    /// ファイルを指定ディレクトリにコピーする（ディレクトリは無ければ作成）
    pub fn copy_file(
        &mut self,
        original_path: &Path,
        new_filename: &str,
        output_dir: &Path,
    ) -> Result<FileOperation, FileOpError> {
        if !original_path.exists() {
            return Err(FileOpError::MissingOriginal(original_path.to_path_buf()));
        }

        std::fs::create_dir_all(output_dir)?;

        let final_name = collision_free_filename(new_filename, output_dir);
        let target_path = output_dir.join(&final_name);

        tracing::debug!(from = %original_path.display(), to = %target_path.display(), "copying");
        std::fs::copy(original_path, &target_path)?;

        let op = FileOperation {
            original_path: original_path.to_path_buf(),
            requested_name: new_filename.to_string(),
            final_path: target_path,
            operation_type: OperationType::Copy,
        };
        self.operations.push(op.clone());
        Ok(op)
    }

    /// 実行された操作の統計を返す
    pub fn summary(&self) -> OperationSummary {
        OperationSummary {
            total: self.operations.len(),
            renames: self
                .operations
                .iter()
                .filter(|op| op.operation_type == OperationType::Rename)
                .count(),
            copies: self
                .operations
                .iter()
                .filter(|op| op.operation_type == OperationType::Copy)
                .count(),
            collisions_avoided: self
                .operations
                .iter()
                .filter(|op| op.collision_avoided())
                .count(),
        }
    }

    pub fn operations(&self) -> &[FileOperation] {
        &self.operations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original.pdf");
        std::fs::write(&original, b"pdf").unwrap();

        let mut manager = FileManager::new();
        let op = manager.rename_file(&original, "renamed.pdf").unwrap();

        assert_eq!(op.final_path, dir.path().join("renamed.pdf"));
        assert!(!original.exists());
        assert!(op.final_path.exists());
        assert!(!op.collision_avoided());
    }

    #[test]
    fn rename_avoids_existing_name() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original.pdf");
        std::fs::write(&original, b"pdf").unwrap();
        std::fs::write(dir.path().join("taken.pdf"), b"x").unwrap();

        let mut manager = FileManager::new();
        let op = manager.rename_file(&original, "taken.pdf").unwrap();

        assert_eq!(op.final_path, dir.path().join("taken-1.pdf"));
        assert!(op.collision_avoided());
        assert_eq!(manager.summary().collisions_avoided, 1);
    }

    #[test]
    fn copy_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let original = dir.path().join("original.pdf");
        std::fs::write(&original, b"pdf").unwrap();
        let outdir = dir.path().join("out/nested");

        let mut manager = FileManager::new();
        let op = manager.copy_file(&original, "copied.pdf", &outdir).unwrap();

        assert!(original.exists());
        assert_eq!(op.final_path, outdir.join("copied.pdf"));
        assert!(op.final_path.exists());
    }

    #[test]
    fn missing_original_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = FileManager::new();
        let err = manager
            .rename_file(&dir.path().join("ghost.pdf"), "new.pdf")
            .unwrap_err();
        assert!(matches!(err, FileOpError::MissingOriginal(_)));
        assert_eq!(manager.summary().total, 0);
    }
}
