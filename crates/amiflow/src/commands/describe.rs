use super::{Resolved, report_failure};
use crate::console::print_description;
use amiflow_core::{BuildFlows, NoLogs};

pub async fn handle(resolved: &Resolved) -> anyhow::Result<()> {
    let provider = resolved.provider();
    let flows = BuildFlows::new(&provider, &NoLogs);

    let description = flows
        .describe(&resolved.watch_request())
        .await
        .map_err(report_failure)?;

    print_description(&description)?;
    Ok(())
}
