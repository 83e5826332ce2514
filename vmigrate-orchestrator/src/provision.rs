use crate::catalog::Catalog;
use crate::error::RunFailure;
use crate::models::{MigrationTarget, NewWorkload, Workload};
use crate::reconcile::Reconciliation;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// The target now points at this workload.
    Bound(Workload),
    Failed(RunFailure),
}

/// Materialize the reconciliation result on the target.
///
/// A full match binds the source workload itself. A partial match creates a
/// derived workload carrying the source's address and credentials and only
/// the overlapping mount points, then binds it; the catalog commits both in
/// one transaction so a failure never leaves the target half-written.
pub async fn provision(
    catalog: &dyn Catalog,
    target: &MigrationTarget,
    source: &Workload,
    reconciliation: Reconciliation,
) -> ProvisionOutcome {
    match reconciliation {
        Reconciliation::FullMatch => match catalog.set_target_vm(&target.id, &source.id).await {
            Ok(()) => {
                info!(target_id = %target.id, workload_id = %source.id, "bound source workload to target");
                ProvisionOutcome::Bound(source.clone())
            }
            Err(e) => {
                warn!(target_id = %target.id, "failed to bind source workload: {}", e);
                ProvisionOutcome::Failed(RunFailure::ProvisioningFault(e.to_string()))
            }
        },
        Reconciliation::PartialMatch(overlap) => {
            let derived = NewWorkload::derived_from(source, overlap);
            match catalog.bind_new_workload(&target.id, derived).await {
                Ok(workload) => {
                    info!(
                        target_id = %target.id,
                        source_id = %source.id,
                        workload_id = %workload.id,
                        "bound derived workload to target"
                    );
                    ProvisionOutcome::Bound(workload)
                }
                Err(e) => {
                    warn!(target_id = %target.id, "failed to create derived workload: {}", e);
                    ProvisionOutcome::Failed(RunFailure::ProvisioningFault(e.to_string()))
                }
            }
        }
        Reconciliation::Impossible => ProvisionOutcome::Failed(RunFailure::ReconciliationImpossible),
    }
}
