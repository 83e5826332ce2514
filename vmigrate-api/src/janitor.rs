use tracing::{info, warn};
use vmigrate_orchestrator::MigrationOrchestrator;

/// Fail migrations left `running` by a previous process.
///
/// Must run before the server accepts requests; afterwards a `running`
/// record may belong to a live run of this process.
pub async fn recover_interrupted_runs(orchestrator: &MigrationOrchestrator) -> anyhow::Result<usize> {
    let recovered = orchestrator.recover_interrupted().await?;

    for id in &recovered {
        warn!("Migration {} was interrupted and has been marked as error", id);
    }

    if !recovered.is_empty() {
        info!("Recovered {} interrupted migration(s)", recovered.len());
    }

    Ok(recovered.len())
}
