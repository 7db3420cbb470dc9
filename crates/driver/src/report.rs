//! Console and JSON rendering of a [`RunSummary`].

use crate::summary::RunSummary;

/// Render the summary as an aligned console table.
pub fn render_table(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Run summary: {} clients, {:.1}s{} ===\n",
        summary.clients,
        summary.duration_secs,
        if summary.db_info.is_empty() {
            String::new()
        } else {
            format!(", {}", summary.db_info)
        }
    ));
    out.push_str(&format!(
        "{:<24} {:>10} {:>8} {:>8} {:>9} {:>10} {:>10} {:>10} {:>9}\n",
        "transaction", "count", "errors", "warns", "rollbacks", "min ms", "mean ms", "max ms", "tps"
    ));

    for tx in &summary.transactions {
        out.push_str(&format!(
            "{:<24} {:>10} {:>8} {:>8} {:>9} {:>10} {:>10} {:>10} {:>9.1}\n",
            tx.name,
            tx.count,
            tx.errors,
            tx.warnings,
            tx.rollbacks,
            fmt_ms(tx.min_ms),
            fmt_ms(tx.mean_ms),
            fmt_ms(tx.max_ms),
            tx.observed_tps(),
        ));
    }

    out.push_str(&format!(
        "total: {} executions, {} errors, {:.1} tps overall\n",
        summary.total_count(),
        summary.total_errors(),
        summary.overall_tps(),
    ));
    out
}

/// Print the console table to stdout.
pub fn print(summary: &RunSummary) {
    print!("{}", render_table(summary));
}

/// Render the summary as pretty-printed JSON.
pub fn to_json(summary: &RunSummary) -> serde_json::Result<String> {
    serde_json::to_string_pretty(summary)
}

fn fmt_ms(value: f64) -> String {
    if value.is_nan() {
        "-".to_string()
    } else {
        format!("{:.2}", value)
    }
}
