mod commands;
mod console;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "amiflow")]
#[command(about = "ParallelCluster で AMI をビルドし、完了まで見届ける。", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// イメージのビルドを開始（完了を待たない）
    Start {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        launch: LaunchArgs,
    },
    /// イメージをビルドし、完了まで状態とログを追跡
    Build {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        launch: LaunchArgs,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// 実行中のビルドを完了まで追跡
    Watch {
        #[command(flatten)]
        target: TargetArgs,
        #[command(flatten)]
        watch: WatchArgs,
    },
    /// イメージの現在の状態を表示
    Describe {
        #[command(flatten)]
        target: TargetArgs,
    },
    /// バージョン情報を表示
    Version,
}

/// 対象イメージの指定
#[derive(Args, Debug, Clone)]
struct TargetArgs {
    /// イメージID
    #[arg(short = 'i', long, env = "AMIFLOW_IMAGE_ID")]
    image_id: String,

    /// 出力ファイルのパス
    #[arg(short = 'o', long, env = "AMIFLOW_OUTPUT_FILE")]
    output_file: PathBuf,

    /// AWS リージョン [default: us-east-1]
    #[arg(short = 'r', long, env = "AMIFLOW_REGION")]
    region: Option<String>,

    /// pcluster コマンドのパス [default: pcluster]
    #[arg(long, env = "AMIFLOW_PCLUSTER_BIN")]
    pcluster_bin: Option<PathBuf>,
}

/// ビルド開始時の指定
#[derive(Args, Debug, Clone)]
struct LaunchArgs {
    /// pcluster のイメージ設定ファイル
    #[arg(short = 'c', long, env = "AMIFLOW_CONFIG_FILE")]
    config_file: PathBuf,

    /// 期待する pcluster のバージョン [default: 3.2]
    #[arg(short = 'p', long, env = "AMIFLOW_PCLUSTER_VERSION")]
    pcluster_version: Option<String>,
}

/// 追跡の指定
#[derive(Args, Debug, Clone, Default)]
struct WatchArgs {
    /// 状態確認の間隔（秒） [default: 600]
    #[arg(long, env = "AMIFLOW_POLL_INTERVAL")]
    poll_interval: Option<u64>,

    /// 追跡を打ち切るまでの時間（秒）
    #[arg(long, env = "AMIFLOW_TIMEOUT")]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ログは stderr に出力し、stdout はビルドログと結果の JSON 用に空けておく
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Versionコマンドは設定ファイル不要
    if matches!(cli.command, Commands::Version) {
        println!("amiflow {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let settings = amiflow_config::load_settings()?;

    match cli.command {
        Commands::Start { target, launch } => {
            let resolved = commands::Resolved::new(settings, &target, Some(&launch), None)?;
            commands::start::handle(&resolved).await?;
        }
        Commands::Build {
            target,
            launch,
            watch,
        } => {
            let resolved = commands::Resolved::new(settings, &target, Some(&launch), Some(&watch))?;
            commands::build::handle(&resolved).await?;
        }
        Commands::Watch { target, watch } => {
            let resolved = commands::Resolved::new(settings, &target, None, Some(&watch))?;
            commands::watch::handle(&resolved).await?;
        }
        Commands::Describe { target } => {
            let resolved = commands::Resolved::new(settings, &target, None, None)?;
            commands::describe::handle(&resolved).await?;
        }
        Commands::Version => {
            unreachable!("Version is handled before config loading");
        }
    }

    Ok(())
}
