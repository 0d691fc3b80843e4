//! Live status lines and the final summary.

use crate::collector::{CounterSnapshot, StatsCollector};
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, Table};
use std::time::Duration;
use workload_core::OperationKind;

/// Column groups for the live status line.
const STATUS_COLUMNS: &[(&str, &[OperationKind])] = &[
    ("SELECT", &[OperationKind::Find]),
    ("INSERT", &[OperationKind::InsertOne, OperationKind::InsertMany]),
    ("UPDATE", &[OperationKind::UpdateOne, OperationKind::UpdateMany]),
    ("DELETE", &[OperationKind::DeleteOne, OperationKind::DeleteMany]),
    ("AGG", &[OperationKind::Aggregate]),
    ("TXN", &[OperationKind::Transaction]),
];

/// Header printed once before the first status line.
pub fn format_status_header() -> String {
    let mut header = format!(" {:<7} | {:>9}", "TIME", "TOTAL OPS");
    for (label, _) in STATUS_COLUMNS {
        header.push_str(&format!(" | {label:>6}"));
    }
    let rule = "-".repeat(header.len());
    format!("{header}\n {rule}")
}

/// One status row from the counter delta of the last interval.
pub fn format_status_line(delta: &CounterSnapshot) -> String {
    let mut line = format!(
        " {:<7} | {:>9}",
        format_elapsed(delta.elapsed),
        format_number(delta.total())
    );
    for (_, kinds) in STATUS_COLUMNS {
        let count: u64 = kinds.iter().map(|k| delta.get(*k)).sum();
        line.push_str(&format!(" | {:>6}", format_number(count)));
    }
    line
}

/// Final report: totals, average rate and the latency table.
pub fn format_summary(stats: &StatsCollector, runtime: Duration) -> String {
    let total = stats.total_ops();
    let seconds = runtime.as_secs_f64();
    let rate = if seconds > 0.0 { total as f64 / seconds } else { 0.0 };

    let mut output = String::new();
    output.push_str("\nSUMMARY\n");
    output.push_str(&format!("  Runtime:    {seconds:.2}s\n"));
    output.push_str(&format!("  Total Ops:  {}\n", format_number(total)));
    output.push_str(&format!("  Avg Rate:   {} ops/sec\n", format_number(rate as u64)));
    output.push_str(&format!(
        "  Errors:     {}\n",
        format_number(stats.total_failures())
    ));

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["TYPE", "OPS", "AVG", "MIN", "MAX", "P95", "P99"]);

    for kind in OperationKind::ALL {
        let snap = stats.histogram_snapshot(kind);
        let mut row = vec![Cell::new(kind.as_str())];
        if snap.is_empty() {
            row.push(Cell::new("-").set_alignment(CellAlignment::Right));
            for _ in 0..5 {
                row.push(Cell::new("-").set_alignment(CellAlignment::Right));
            }
        } else {
            row.push(Cell::new(format_number(snap.count)).set_alignment(CellAlignment::Right));
            for ms in [
                snap.mean_ms(),
                snap.min_ms,
                snap.max_ms,
                snap.percentile(95.0),
                snap.percentile(99.0),
            ] {
                row.push(Cell::new(format_latency(ms)).set_alignment(CellAlignment::Right));
            }
        }
        table.add_row(row);
    }

    table.add_row(vec![
        Cell::new("TOTAL"),
        Cell::new(format_number(total)).set_alignment(CellAlignment::Right),
    ]);

    output.push_str("\nLATENCY DISTRIBUTION\n");
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

/// Format a latency in milliseconds as ms, seconds or minutes.
pub fn format_latency(ms: f64) -> String {
    if ms < 1_000.0 {
        format!("{ms:.2} ms")
    } else if ms < 60_000.0 {
        format!("{:.2} s", ms / 1_000.0)
    } else {
        format!("{:.2} m", ms / 60_000.0)
    }
}

/// `MM:SS` elapsed time.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Format number with thousands separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1_000), "1,000");
        assert_eq!(format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_format_latency_units() {
        assert_eq!(format_latency(12.345), "12.35 ms");
        assert_eq!(format_latency(2_500.0), "2.50 s");
        assert_eq!(format_latency(90_000.0), "1.50 m");
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "02:05");
    }

    #[test]
    fn test_status_line_groups_kinds() {
        let stats = StatsCollector::new();
        stats.record(OperationKind::UpdateOne, Duration::from_millis(1));
        stats.record(OperationKind::UpdateMany, Duration::from_millis(1));
        stats.record(OperationKind::Find, Duration::from_millis(1));

        let line = format_status_line(&stats.counters().delta(&CounterSnapshot::zero()));
        let cells: Vec<&str> = line.split('|').map(str::trim).collect();
        assert_eq!(cells[1], "3");
        assert_eq!(cells[2], "1");
        assert_eq!(cells[4], "2");
        assert_eq!(cells.len(), 2 + STATUS_COLUMNS.len());
    }

    #[test]
    fn test_header_matches_columns() {
        let header = format_status_header();
        let first = header.lines().next().unwrap();
        assert!(first.contains("TOTAL OPS"));
        assert!(first.contains("TXN"));
    }

    #[test]
    fn test_summary_uses_sentinel_for_empty_kinds() {
        let stats = StatsCollector::new();
        stats.record(OperationKind::Find, Duration::from_millis(4));

        let summary = format_summary(&stats, Duration::from_secs(2));
        assert!(summary.contains("Total Ops:  1"));
        let delete_row = summary
            .lines()
            .find(|l| l.contains("deleteOne"))
            .unwrap();
        assert!(delete_row.contains('-'));
        assert!(!delete_row.contains("ms"));
        let find_row = summary.lines().find(|l| l.contains("find")).unwrap();
        assert!(find_row.contains("4.00 ms"));
    }
}
