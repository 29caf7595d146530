pub mod error;

pub use error::*;

use amiflow_core::{DEFAULT_PCLUSTER_VERSION, DEFAULT_POLL_INTERVAL, DEFAULT_REGION};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 設定ファイルのパスを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "AMIFLOW_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["amiflow.yaml", ".amiflow.yaml"];

/// amiflow の設定
///
/// 全フィールドが省略可能で、省略時はデフォルト値が使われる。
/// CLI の引数・環境変数が指定された場合はそちらが優先される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// AWS リージョン
    pub region: String,

    /// ビルド状態の確認間隔（秒）
    pub poll_interval_secs: u64,

    /// 監視全体のタイムアウト（秒）。未指定なら終了状態まで待ち続ける
    pub timeout_secs: Option<u64>,

    /// pcluster コマンドのパス
    pub pcluster_bin: PathBuf,

    /// 期待する pcluster のバージョン（部分一致）
    pub pcluster_version: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            timeout_secs: None,
            pcluster_bin: PathBuf::from("pcluster"),
            pcluster_version: DEFAULT_PCLUSTER_VERSION.to_string(),
        }
    }
}

impl Settings {
    /// YAML ファイルから読み込む
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // 空ファイルはデフォルト扱い
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let settings: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(ConfigError::Invalid("region が空です".to_string()));
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "poll_interval_secs は 1 以上を指定してください".to_string(),
            ));
        }
        if self.pcluster_bin.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("pcluster_bin が空です".to_string()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// グローバル設定ファイルのパス (~/.config/amiflow/config.yaml)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("amiflow").join("config.yaml"))
}

/// 設定ファイルを探す
///
/// 以下の優先順位で検索:
/// 1. 環境変数 AMIFLOW_CONFIG_PATH (直接パス指定)
/// 2. カレントディレクトリ: amiflow.yaml, .amiflow.yaml
/// 3. ~/.config/amiflow/config.yaml (グローバル設定)
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    let current_dir = std::env::current_dir()?;
    Ok(find_settings_file_in(&current_dir))
}

/// `dir` をカレントディレクトリとして設定ファイルを探す
pub fn find_settings_file_in(dir: &Path) -> Option<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Some(path);
        }
        tracing::warn!("{} が存在しないパスを指しています: {}", CONFIG_PATH_ENV, path.display());
    }

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = dir.join(filename);
        if path.exists() {
            return Some(path);
        }
    }

    // 3. グローバル設定ファイル
    global_config_path().filter(|path| path.exists())
}

/// 設定を読み込む。設定ファイルが無ければデフォルト値
pub fn load_settings() -> Result<Settings> {
    match find_settings_file()? {
        Some(path) => {
            tracing::debug!("Loading settings from {}", path.display());
            Settings::from_path(&path)
        }
        None => Ok(Settings::default()),
    }
}
