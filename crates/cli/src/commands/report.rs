//! `report` command.
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string of the host database
//! - `ADMIN_READ_DATABASE_URL` - Optional read replica
//! - `HOST_TABLE_PREFIX` - Prefix of the host tables (default: `ps_`)

use std::fmt::Write as _;

use chrono::Utc;

use visitors_online_admin::report::PresenceSnapshot;
use visitors_online_core::{ShopGroupId, ShopId, ShopScope};

use super::{CommandError, connect};

/// Map the command line filters to a shop scope.
///
/// Clap rejects passing both; the shop takes precedence if it happens anyway.
pub fn scope(shop: Option<i32>, shop_group: Option<i32>) -> ShopScope {
    match (shop, shop_group) {
        (Some(shop), _) => ShopScope::Shop(ShopId::new(shop)),
        (None, Some(group)) => ShopScope::Group(ShopGroupId::new(group)),
        (None, None) => ShopScope::All,
    }
}

/// Compute the snapshot and print it.
#[allow(clippy::print_stdout)]
pub async fn run(scope: ShopScope, json: bool) -> Result<(), CommandError> {
    let report = connect().await?;
    let snapshot = report.snapshot(Utc::now(), scope).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", render(&snapshot));
    }
    Ok(())
}

/// Plain text rendering of a snapshot.
pub fn render(snapshot: &PresenceSnapshot) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Customers online: {}", snapshot.customers.total_count());
    if snapshot.customers.is_empty() {
        let _ = writeln!(out, "  There are no customers online.");
    }
    for customer in snapshot.customers.entries() {
        let _ = write!(
            out,
            "  #{:<6} {} {}",
            customer.customer_id.as_i32(), customer.first_name, customer.last_name
        );
        if snapshot.page_views_enabled {
            let _ = write!(out, "  {}", customer.current_page);
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Visitors online: {}", snapshot.visitors.total_count());
    if snapshot.visitors.is_empty() {
        let _ = writeln!(out, "  There are no visitors online.");
    }
    for visitor in snapshot.visitors.entries() {
        let ip = visitor
            .ip_address
            .map_or_else(|| "-".to_string(), |ip| ip.to_string());
        let _ = write!(
            out,
            "  #{:<6} guest {:<6} {:<15} {}",
            visitor.connection_id.as_i32(),
            visitor.guest_id.as_i32(),
            ip,
            visitor.last_activity_clock()
        );
        if snapshot.page_views_enabled {
            let _ = write!(out, "  {}", visitor.current_page);
        }
        let _ = writeln!(out, "  {}", visitor.referrer_host);
    }

    if !snapshot.page_views_enabled {
        let _ = writeln!(
            out,
            "Current pages are not tracked; enable customer page views to see them."
        );
    }
    if snapshot.excluded_ip_count > 0 {
        let _ = writeln!(out, "{} maintenance IP(s) hidden.", snapshot.excluded_ip_count);
    }
    out
}
