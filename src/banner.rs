//! Configuration banner logged before a run.

use crate::config::AppConfig;
use loadtest_runner::{RunConfig, Workload};
use tracing::info;

/// Replace the password in a connection URI with `***`.
pub fn mask_uri(uri: &str) -> String {
    let Some(scheme_end) = uri.find("://") else {
        return uri.to_string();
    };
    let authority_start = scheme_end + 3;
    let rest = &uri[authority_start..];

    // Credentials end at the last '@' before the path
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let Some(at) = rest[..authority_end].rfind('@') else {
        return uri.to_string();
    };
    let credentials = &rest[..at];
    match credentials.find(':') {
        Some(colon) => format!(
            "{}{}:***{}",
            &uri[..authority_start],
            &credentials[..colon],
            &rest[at..]
        ),
        None => uri.to_string(),
    }
}

/// Log the effective configuration.
pub fn log_configuration(config: &AppConfig, run: &RunConfig, workload: &Workload, dry_run: bool) {
    if dry_run {
        info!("Target: in-memory database (dry run)");
    } else {
        info!("Target: {}", mask_uri(&config.uri));
    }

    let namespaces: Vec<String> = workload
        .targets()
        .iter()
        .map(|t| t.namespace.to_string())
        .collect();
    info!(
        "Collections: {} ({} query templates{})",
        namespaces.join(", "),
        workload.templates().len(),
        if config.uses_default_workload() {
            ", built-in workload"
        } else {
            ""
        }
    );

    if run.is_fixed_mode() {
        info!("Mode: fixed (each query template runs once)");
    } else {
        info!(
            "Workers: {}, duration: {:?}, report interval: {:?}",
            run.concurrency, run.duration, run.status_interval
        );
    }

    let mix: Vec<String> = run
        .distribution
        .iter()
        .filter(|(_, pct)| *pct > 0)
        .map(|(bucket, pct)| format!("{bucket:?} {pct}%"))
        .collect();
    info!("Operation mix: {}", mix.join(", "));

    if run.use_transactions {
        info!(
            "Transactions: enabled, up to {} operations each",
            run.max_transaction_ops
        );
    }
    if config.skip_seed || config.documents_count == 0 {
        info!("Seeding: skipped");
    } else {
        info!(
            "Seeding: {} documents per collection in batches of {}",
            config.documents_count, config.seed_batch_size
        );
    }
}
