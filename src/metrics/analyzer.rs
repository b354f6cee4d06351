use super::{Metric, Report};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How one metric's estimate moves as the replication count grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceRow {
    pub metric: Metric,
    pub replications: usize,
    pub mean: f64,
    pub half_width: f64,
    pub relative_error: f64,
}

/// Rows grouped by metric, each group sorted by replication count.
pub fn convergence(reports: &[Report]) -> Vec<ConvergenceRow> {
    let mut rows = Vec::new();
    for metric in Metric::ALL {
        let mut group: Vec<ConvergenceRow> = reports
            .iter()
            .filter_map(|report| {
                report.get(metric).map(|e| ConvergenceRow {
                    metric,
                    replications: report.replications,
                    mean: e.mean,
                    half_width: e.interval.half_width(),
                    relative_error: e.relative_error,
                })
            })
            .collect();
        group.sort_by_key(|row| row.replications);
        rows.extend(group);
    }
    rows
}

pub fn save_json(reports: &[Report], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(reports)?)?;
    Ok(())
}

/// Reads either a single report or a list of reports.
pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<Report>> {
    let content = std::fs::read_to_string(path)?;
    if let Ok(reports) = serde_json::from_str::<Vec<Report>>(&content) {
        return Ok(reports);
    }
    Ok(vec![serde_json::from_str::<Report>(&content)?])
}

#[cfg(feature = "latex-export")]
pub fn export_latex_table(reports: &[Report], path: impl AsRef<Path>) -> Result<()> {
    use std::fmt::Write as _;

    let Some(first) = reports.first() else {
        anyhow::bail!("No reports to export");
    };

    let mut tex = String::new();
    writeln!(tex, "\\begin{{table}}[h]")?;
    writeln!(tex, "\\centering")?;
    writeln!(tex, "\\begin{{tabular}}{{lrrrrr}}")?;
    writeln!(tex, "\\hline")?;
    writeln!(tex, "Metric & $N$ & Mean & CI low & CI high & Rel. error \\\\")?;
    writeln!(tex, "\\hline")?;
    for metric in Metric::ALL {
        for report in reports {
            if let Some(e) = report.get(metric) {
                writeln!(
                    tex,
                    "{} & {} & {:.4} & {:.4} & {:.4} & {:.2}\\% \\\\",
                    metric.label(),
                    report.replications,
                    e.mean,
                    e.interval.lower,
                    e.interval.upper,
                    e.relative_error * 100.0
                )?;
            }
        }
        writeln!(tex, "\\hline")?;
    }
    writeln!(tex, "\\end{{tabular}}")?;
    writeln!(
        tex,
        "\\caption{{M/M/1 estimates, $\\lambda={}$, $\\mu={}$, $T={}$}}",
        first.lambda, first.mu, first.horizon
    )?;
    writeln!(tex, "\\label{{tab:mm1_convergence}}")?;
    writeln!(tex, "\\end{{table}}")?;

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, tex)?;
    Ok(())
}
