pub mod build;
pub mod describe;
pub mod start;
pub mod watch;

use crate::{LaunchArgs, TargetArgs, WatchArgs};
use amiflow_cloudwatch::CloudWatchLogs;
use amiflow_config::Settings;
use amiflow_core::{
    BuildError, BuildRequest, ImageTarget, StopHandle, StopSignal, WatchOptions, WatchRequest,
    stop_channel,
};
use amiflow_pcluster::PclusterProvider;
use colored::Colorize;
use std::future::Future;
use std::path::PathBuf;

/// 設定ファイルと CLI 引数をマージした実行時の設定
#[derive(Debug, Clone)]
pub struct Resolved {
    pub settings: Settings,
    pub target: ImageTarget,
    pub output_file: PathBuf,
    pub config_file: Option<PathBuf>,
}

impl Resolved {
    /// CLI 引数（環境変数を含む）で設定ファイルの値を上書きする
    pub fn new(
        mut settings: Settings,
        target: &TargetArgs,
        launch: Option<&LaunchArgs>,
        watch: Option<&WatchArgs>,
    ) -> anyhow::Result<Self> {
        if let Some(region) = &target.region {
            settings.region = region.clone();
        }
        if let Some(bin) = &target.pcluster_bin {
            settings.pcluster_bin = bin.clone();
        }
        if let Some(version) = launch.and_then(|l| l.pcluster_version.as_ref()) {
            settings.pcluster_version = version.clone();
        }
        if let Some(watch) = watch {
            if let Some(secs) = watch.poll_interval {
                settings.poll_interval_secs = secs;
            }
            if watch.timeout.is_some() {
                settings.timeout_secs = watch.timeout;
            }
        }
        settings.validate()?;

        Ok(Self {
            target: ImageTarget::new(target.image_id.clone(), settings.region.clone()),
            output_file: target.output_file.clone(),
            config_file: launch.map(|l| l.config_file.clone()),
            settings,
        })
    }

    pub fn build_request(&self) -> anyhow::Result<BuildRequest> {
        let config_file = self
            .config_file
            .clone()
            .ok_or_else(|| anyhow::anyhow!("設定ファイルを指定してください（-c/--config-file）"))?;

        Ok(BuildRequest {
            target: self.target.clone(),
            config_file,
            output_file: self.output_file.clone(),
            expected_version: self.settings.pcluster_version.clone(),
        })
    }

    pub fn watch_request(&self) -> WatchRequest {
        WatchRequest {
            target: self.target.clone(),
            output_file: self.output_file.clone(),
        }
    }

    pub fn watch_options(&self, stop: StopSignal) -> WatchOptions {
        let options = WatchOptions::default()
            .with_poll_interval(self.settings.poll_interval())
            .with_stop(stop);
        match self.settings.timeout() {
            Some(timeout) => options.with_timeout(timeout),
            None => options,
        }
    }

    pub fn provider(&self) -> PclusterProvider {
        PclusterProvider::new(&self.settings.pcluster_bin)
    }

    pub async fn logs(&self) -> CloudWatchLogs {
        CloudWatchLogs::from_region(self.settings.region.clone()).await
    }

    pub fn print_target(&self) {
        println!("イメージ: {}", self.target.image_id.cyan());
        println!("リージョン: {}", self.target.region.cyan());
    }
}

/// Ctrl-C で追跡を止める StopSignal を作る。2 回目の Ctrl-C で即終了
pub fn stop_on_ctrl_c() -> StopSignal {
    let (handle, signal) = stop_channel();
    tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, handle).await {
            eprintln!("{}", "✗ 中断しました".red().bold());
            std::process::exit(130);
        }
    });
    signal
}

/// 1 回目の割り込みで停止を要求し、2 回目が来たら true を返す
async fn relay_interrupts<F, Fut>(mut interrupted: F, handle: StopHandle) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if interrupted().await.is_err() {
        return false;
    }
    tracing::info!("Interrupted, stopping after the current check (Ctrl-C again to quit)");
    handle.stop();

    interrupted().await.is_ok()
}

/// ビルド失敗を色付きで表示して anyhow のエラーに変換する
pub fn report_failure(err: BuildError) -> anyhow::Error {
    let headline = match &err {
        BuildError::BuildFailed { .. } | BuildError::UnrecognizedStatus { .. } => {
            "✗ イメージのビルドに失敗しました"
        }
        BuildError::VersionMismatch { .. } => "✗ pcluster のバージョンが一致しません",
        BuildError::Cancelled { .. } => "✗ 追跡を中断しました",
        BuildError::DeadlineExceeded { .. } => "✗ 追跡がタイムアウトしました",
        _ => "✗ エラーが発生しました",
    };
    eprintln!("{}", headline.red().bold());
    err.into()
}
