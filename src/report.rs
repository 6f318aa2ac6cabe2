use std::collections::BTreeSet;
use std::fmt::Write;

use crate::analysis::Analysis;
use crate::stats::{coverage, Histogram};
use crate::utils::{format_number, redact_domain};

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    pub redact: bool,
}

pub fn render_report(analysis: &Analysis, options: &ReportOptions) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_report(&mut out, analysis, options);
    out
}

fn write_report(out: &mut String, analysis: &Analysis, options: &ReportOptions) -> std::fmt::Result {
    let total = analysis.attribution.len();

    writeln!(out, "--- Blocklist analysis: {} ---", analysis.source_label)?;
    writeln!(
        out,
        "Entries: {}, unique domains: {}",
        format_number(analysis.entry_count),
        format_number(total)
    )?;
    if analysis.carried_forward > 0 {
        writeln!(
            out,
            "Domains carried forward from earlier runs: {}",
            format_number(analysis.carried_forward)
        )?;
    }

    if !analysis.drifts.is_empty() {
        section(out, "Attribution changes since last run")?;
        for drift in &analysis.drifts {
            writeln!(
                out,
                "{}\t{} -> {}",
                display_domain(&drift.domain, options),
                join_ids(&drift.previous),
                join_ids(&drift.current)
            )?;
        }
    }

    section(out, "Blocklists appearing by themselves")?;
    writeln!(out, "domains\tid")?;
    writeln!(out, "--     \t--")?;
    for (id, domains) in &analysis.classification.solos {
        writeln!(out, "{}\t{}", format_number(domains.len()), id)?;
        writeln!(out, "\t{}", join_domains(domains, options))?;
    }

    if !analysis.classification.combos.is_empty() {
        section(out, "Blocklists found only in combos")?;
        writeln!(out, "domains\tids")?;
        writeln!(out, "--     \t---")?;
        for (ids, domains) in &analysis.classification.combos {
            writeln!(out, "{}\t{}", format_number(domains.len()), ids.join(", "))?;
            writeln!(out, "\t{}", join_domains(domains, options))?;
        }
    }

    section(out, &format!("Domain coverage ({} total)", format_number(total)))?;
    for row in coverage(&analysis.blists, total) {
        writeln!(out, "{:5.1}% {}", row.percent, row.id)?;
    }

    section(out, "Redundancy histogram")?;
    for (id, histogram) in &analysis.redundancy {
        write_histogram(out, id, histogram)?;
    }

    Ok(())
}

fn section(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "\n#\n# {}\n#\n", title)
}

fn write_histogram(out: &mut String, id: &str, histogram: &Histogram) -> std::fmt::Result {
    writeln!(out, "{}", id)?;
    for (level, count) in histogram.dense() {
        writeln!(out, "{}: {}", level_label(level), "*".repeat(count))?;
    }
    writeln!(out)
}

fn level_label(level: usize) -> String {
    match level {
        1 => "🥇".to_string(),
        2 => "🥈".to_string(),
        3 => "🥉".to_string(),
        n => format!("{:2}", n),
    }
}

fn display_domain(domain: &str, options: &ReportOptions) -> String {
    if options.redact {
        redact_domain(domain)
    } else {
        domain.to_string()
    }
}

fn join_domains(domains: &BTreeSet<String>, options: &ReportOptions) -> String {
    domains
        .iter()
        .map(|d| display_domain(d, options))
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_ids(ids: &BTreeSet<String>) -> String {
    format!(
        "{{{}}}",
        ids.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    )
}
