use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ファイルを読み込めません: {path}\n  {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("設定ファイルの形式が正しくありません: {path}\n  {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("設定値が不正です: {0}")]
    Invalid(String),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
