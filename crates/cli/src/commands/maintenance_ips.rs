//! `maintenance-ips` command.

use visitors_online_admin::report::{ConfigProvider, MAINTENANCE_IP_KEY, ReportError};
use visitors_online_core::{ExcludedIpSet, ShopScope};

use super::{CommandError, connect};

/// Parse a raw list and print it.
#[allow(clippy::print_stdout)]
pub fn print_raw(raw: &str) {
    print!("{}", render(&ExcludedIpSet::parse(raw)));
}

/// Read the global maintenance IP setting and print it.
#[allow(clippy::print_stdout)]
pub async fn print_configured() -> Result<(), CommandError> {
    let report = connect().await?;
    let raw = report
        .config()
        .get(MAINTENANCE_IP_KEY, ShopScope::All)
        .await
        .map_err(ReportError::from)?;
    tracing::debug!(raw = raw.as_deref().unwrap_or_default(), "Read maintenance IPs");

    print!("{}", render(&ExcludedIpSet::parse(raw.as_deref().unwrap_or_default())));
    Ok(())
}

/// One address per line, sorted.
pub fn render(set: &ExcludedIpSet) -> String {
    if set.is_empty() {
        return "No maintenance IPs configured.\n".to_string();
    }
    set.iter().map(|ip| format!("{ip}\n")).collect()
}
