//! 端末への出力

use amiflow_core::{BuildPhase, ImageDescription, LogEvent, LogSink, LogStreamId};
use chrono::{DateTime, Utc};
use colored::Colorize;

/// ビルドログを stdout に流す
#[derive(Debug, Default)]
pub struct ConsoleSink {
    current: Option<LogStreamId>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogSink for ConsoleSink {
    fn write_event(&mut self, stream: &LogStreamId, event: &LogEvent) {
        // ストリームが変わったときだけ見出しを出す
        if self.current.as_ref() != Some(stream) {
            println!("{}", format!("── {} ──", stream).dimmed());
            self.current = Some(stream.clone());
        }
        println!(
            "{} {}",
            format_timestamp(event.timestamp).dimmed(),
            event.message
        );
    }
}

/// エポックミリ秒を UTC の時刻文字列にする
pub fn format_timestamp(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// イメージの状態と JSON を表示
pub fn print_description(description: &ImageDescription) -> anyhow::Result<()> {
    let status = &description.image_build_status;
    let status = match description.phase() {
        BuildPhase::Complete => status.green(),
        BuildPhase::InProgress => status.yellow(),
        BuildPhase::Failed | BuildPhase::Unrecognized => status.red(),
    };
    println!("状態: {}", status.bold());
    if let Some(ami_id) = description.ami_id() {
        println!("AMI: {}", ami_id.cyan());
    }
    println!("{}", serde_json::to_string_pretty(description)?);
    Ok(())
}
