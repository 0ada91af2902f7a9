// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness probes for deployed cost-manager services.
// Purpose: Wake cold-starting hosts without arbitrary sleeps.
// Dependencies: cost-manager-probe, tokio
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use cost_manager_probe::CostManagerApi;
use cost_manager_probe::ServiceKind;
use tokio::time::sleep;

/// Default readiness budget for hosts that sleep when idle.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_secs(90);

/// Path polled on each service. Any HTTP status counts as ready.
const fn ready_path(kind: ServiceKind) -> &'static str {
    match kind {
        ServiceKind::Users => "/api/users",
        ServiceKind::Costs => "/api/report",
        ServiceKind::Logs => "/api/logs",
        ServiceKind::Admin => "/api/about",
    }
}

/// Polls every service until it answers or `timeout` expires.
pub async fn wait_for_services_ready(
    api: &CostManagerApi,
    timeout: Duration,
) -> Result<(), String> {
    let start = Instant::now();
    for kind in ServiceKind::ALL {
        let client = api.service(kind);
        let mut attempts = 0u32;
        loop {
            attempts = attempts.saturating_add(1);
            match client.get(ready_path(kind), &[]).await {
                Ok(_) => break,
                Err(err) => {
                    if start.elapsed() > timeout {
                        return Err(format!(
                            "{} readiness timeout after {attempts} attempts: {err}",
                            kind.as_str()
                        ));
                    }
                    sleep(Duration::from_millis(500)).await;
                }
            }
        }
    }
    Ok(())
}
