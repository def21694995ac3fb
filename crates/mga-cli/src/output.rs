//! Terminal output formatting.

use colored::Colorize;

use mga_core::stats::grouped;
use mga_core::Stats;
use mga_graph::GraphCounts;

/// Print the summary of an analyzer run.
pub fn print_stats(stats: &Stats) {
    println!();
    print!("{}", render_stats(stats));
}

fn render_stats(stats: &Stats) -> String {
    let mut out = format!("{}\n", "Successfully created".green().bold());
    for (count, label) in stats.counters() {
        out.push_str(&format!("\t{:>8} {label}\n", grouped(count)));
    }
    if stats.failed_resources > 0 {
        let failed = format!(
            "\t{:>8} resources could not be processed.",
            grouped(stats.failed_resources)
        );
        out.push_str(&format!("{}\n", failed.red()));
    }
    out.push_str(&format!(
        "{}\n",
        format!("in {} seconds.", stats.human_readable_duration()).green().bold()
    ));

    if !stats.errors.is_empty() {
        out.push_str(&format!("\n{} ({})\n", "Errors".red().bold(), stats.errors.len()));
        for error in &stats.errors {
            out.push_str(&format!("  {} {error}\n", "•".dimmed()));
        }
    }
    out
}

/// Print node counts per label.
pub fn print_counts(counts: &GraphCounts) {
    println!("{:<14} {:>10}", "Label".bold(), "Nodes".bold());
    println!("{}", "─".repeat(25));
    for (label, count) in &counts.labels {
        let count = if *count == 0 {
            count.to_string().dimmed()
        } else {
            count.to_string().normal()
        };
        println!("{:<14} {:>10}", label.cyan(), count);
    }
    println!("{}", "─".repeat(25));
    println!("{:<14} {:>10}", "Total".bold(), counts.nodes);
    println!("{:<14} {:>10}", "Relationships".bold(), counts.relationships);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_stats() {
        colored::control::set_override(false);
        let mut stats = Stats::new();
        stats.resources = 1200;
        stats.failed_resources = 1;
        stats.error("Unable to read child types of '/'");
        stats.error("Unable to parse deprecation version 'abc' for '/subsystem=foo'");

        let rendered = render_stats(&stats);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Successfully created");
        assert_eq!(lines[1], "\t   1,200 resources");
        assert_eq!(lines[8], "\t       1 resources could not be processed.");
        assert_eq!(lines[9], "in 00:00 seconds.");
        assert_eq!(
            lines[10..].to_vec(),
            vec![
                "",
                "Errors (2)",
                "  • Unable to read child types of '/'",
                "  • Unable to parse deprecation version 'abc' for '/subsystem=foo'",
            ]
        );
    }

    #[test]
    fn test_render_stats_with_error_mentioning_errors() {
        colored::control::set_override(false);
        let mut stats = Stats::new();
        stats.error("Failed at\n\nErrors\nsomewhere");

        let rendered = render_stats(&stats);
        assert!(rendered.contains("Errors (1)\n"));
        assert!(rendered.contains("  • Failed at\n"));
        assert!(!rendered.contains("could not be processed"));
    }
}
