use super::{Resolved, report_failure, stop_on_ctrl_c};
use crate::console::{ConsoleSink, print_description};
use amiflow_core::BuildFlows;
use colored::Colorize;

pub async fn handle(resolved: &Resolved) -> anyhow::Result<()> {
    println!("{}", "イメージをビルド中...".blue());
    resolved.print_target();
    println!();

    let request = resolved.build_request()?;
    let provider = resolved.provider();
    let logs = resolved.logs().await;
    let flows =
        BuildFlows::new(&provider, &logs).with_options(resolved.watch_options(stop_on_ctrl_c()));

    let description = flows
        .build_and_watch(&request, &mut ConsoleSink::new())
        .await
        .map_err(report_failure)?;

    println!();
    println!("{}", "✓ ビルドが完了しました".green().bold());
    print_description(&description)?;
    Ok(())
}
