use super::{Resolved, report_failure};
use amiflow_core::{BuildFlows, NoLogs};
use colored::Colorize;

pub async fn handle(resolved: &Resolved) -> anyhow::Result<()> {
    println!("{}", "イメージのビルドを開始中...".blue());
    resolved.print_target();

    let request = resolved.build_request()?;
    let provider = resolved.provider();
    let flows = BuildFlows::new(&provider, &NoLogs);

    flows.start(&request).await.map_err(report_failure)?;

    println!();
    println!("{}", "✓ ビルドを開始しました".green().bold());
    println!(
        "  追跡するには: amiflow watch --image-id {} --output-file {} --region {}",
        request.target.image_id,
        request.output_file.display(),
        request.target.region
    );
    Ok(())
}
