use super::{Resolved, report_failure, stop_on_ctrl_c};
use crate::console::{ConsoleSink, print_description};
use amiflow_core::BuildFlows;
use colored::Colorize;

pub async fn handle(resolved: &Resolved) -> anyhow::Result<()> {
    println!("{}", "ビルドを追跡中...".blue());
    resolved.print_target();
    println!();

    let provider = resolved.provider();
    let logs = resolved.logs().await;
    let flows =
        BuildFlows::new(&provider, &logs).with_options(resolved.watch_options(stop_on_ctrl_c()));

    let description = flows
        .watch(&resolved.watch_request(), &mut ConsoleSink::new())
        .await
        .map_err(report_failure)?;

    println!();
    println!("{}", "✓ ビルドが完了しました".green().bold());
    print_description(&description)?;
    Ok(())
}
