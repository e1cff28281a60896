use std::time::Instant;

use crate::config::Settings;
use crate::switcher::{Switcher, UpdateOutcome};
use crate::vault::MemoryVault;

fn p95_ms(samples: &mut [f64]) -> f64 {
    samples.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let last = samples.len().saturating_sub(1);
    let idx = ((last as f64) * 0.95).round() as usize;
    samples[idx.min(last)]
}

fn large_vault() -> MemoryVault {
    let mut vault = MemoryVault::default();
    let entries = (0..5_000).map(|i| {
        let content = format!(
            "# Document {i:05}\n## Summary\nSee [[Document_{next:05}]] #topic{bucket}\n## Details\n",
            next = (i + 1) % 5_000,
            bucket = i % 20,
        );
        (format!("area{}/Document_{i:05}.md", i % 50), Some(content))
    });
    vault.add_entries(entries);
    vault.add_entries([(
        "reports/Quarterly.md".to_string(),
        Some("# Q4 Report\n## Revenue\n".to_string()),
    )]);
    vault
}

fn headings_query(switcher: &mut Switcher, vault: &MemoryVault, text: &str) -> usize {
    match switcher.update_suggestions(vault, text, None, None, Instant::now()) {
        UpdateOutcome::Ready { suggestions, .. } => suggestions.len(),
        _ => 0,
    }
}

#[test]
fn warm_headings_query_p95_under_budget() {
    let vault = large_vault();
    let mut switcher = Switcher::with_default_matcher(Settings::default()).expect("default settings are valid");

    assert!(headings_query(&mut switcher, &vault, "#q4 report") > 0);
    for _ in 0..5 {
        let _ = headings_query(&mut switcher, &vault, "#q4 report");
    }

    let mut batch_p95 = Vec::with_capacity(5);
    for _ in 0..5 {
        let mut samples = Vec::with_capacity(10);
        for _ in 0..10 {
            let start = Instant::now();
            let _ = headings_query(&mut switcher, &vault, "#q4 report");
            samples.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        batch_p95.push(p95_ms(&mut samples));
    }

    batch_p95.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let median_p95 = batch_p95[batch_p95.len() / 2];

    assert!(
        median_p95 <= 250.0,
        "median batch p95 too high: {median_p95:.3}ms (budget 250.0ms); batches={batch_p95:?}",
    );
}
