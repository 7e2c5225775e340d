//! マイソクリネーマー - メインエントリポイント

use std::process::ExitCode;

fn main() -> ExitCode {
    // ロギング初期化はCLI側（--debugの解釈後）で行う
    let code = mysoku_renamer::cli::run();
    ExitCode::from(code as u8)
}
