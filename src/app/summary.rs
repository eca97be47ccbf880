use crate::metrics::{CompleteReport, DegenerateReport, ErrorTally, RunReport};

/// Divisor for `_x100` fixed-point values.
const X100_DIVISOR: u64 = 100;
const US_PER_MS: u64 = 1_000;
const US_PER_SEC: u64 = 1_000_000;

pub(crate) fn print_report(report: &RunReport, url: &str) {
    for line in summary_lines(report, url) {
        println!("{}", line);
    }
}

pub(crate) fn summary_lines(report: &RunReport, url: &str) -> Vec<String> {
    match report {
        RunReport::Degenerate(report) => degenerate_lines(report, url),
        RunReport::Complete(report) => complete_lines(report, url),
    }
}

fn degenerate_lines(report: &DegenerateReport, url: &str) -> Vec<String> {
    let mut lines = vec![format!(
        "No successful requests to {} ({} failed in {}).",
        url,
        report.failures,
        format_duration_us(duration_us(report.elapsed))
    )];
    error_lines(&report.errors, &mut lines);
    lines
}

fn complete_lines(report: &CompleteReport, url: &str) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} requests to {} in {} with {} workers ({} failed)",
        report.successes,
        url,
        format_duration_us(duration_us(report.elapsed)),
        report.workers,
        report.failures
    ));
    lines.push(format!("Data read: {}", format_bytes(report.bytes)));
    lines.push(format!(
        "Avg worker time: {}",
        format_duration_us(duration_us(report.avg_worker_time))
    ));
    lines.push(format!(
        "Requests/sec: {} (overall {})",
        format_x100(report.request_rate_x100),
        format_x100(report.overall_request_rate_x100)
    ));
    lines.push(format!(
        "Transfer/sec: {} (overall {})",
        format_bytes(report.transfer_rate),
        format_bytes(report.overall_transfer_rate)
    ));

    let latency = &report.latency;
    lines.push(format!(
        "Latency min/mean/max: {} / {} / {}",
        format_duration_us(latency.min_us),
        format_duration_us(latency.mean_us),
        format_duration_us(latency.max_us)
    ));
    lines.push(format!(
        "Latency stddev: {}",
        format_duration_us(latency.stddev_us)
    ));
    lines.push("Latency distribution:".to_owned());
    for (percentile, value_us) in &latency.percentiles {
        lines.push(format!(
            "  {:>9}%  {}",
            percentile,
            format_duration_us(*value_us)
        ));
    }

    error_lines(&report.errors, &mut lines);
    lines
}

fn error_lines(errors: &ErrorTally, lines: &mut Vec<String>) {
    if errors.is_empty() {
        return;
    }
    lines.push(format!("Errors ({} total):", errors.total()));
    for (message, count) in errors.by_count() {
        lines.push(format!("  {:>8}  {}", count, message));
    }
}

fn duration_us(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

fn format_x100(value: u64) -> String {
    format!(
        "{}.{:02}",
        value.checked_div(X100_DIVISOR).unwrap_or(0),
        value.checked_rem(X100_DIVISOR).unwrap_or(0)
    )
}

/// Formats microseconds with the largest unit that keeps a whole part.
pub(crate) fn format_duration_us(us: u64) -> String {
    if us >= US_PER_SEC {
        format_scaled(us, US_PER_SEC, "s")
    } else if us >= US_PER_MS {
        format_scaled(us, US_PER_MS, "ms")
    } else {
        format!("{}us", us)
    }
}

/// Formats a byte count with decimal units.
pub(crate) fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1_000;
    const MB: u64 = 1_000_000;
    const GB: u64 = 1_000_000_000;
    const TB: u64 = 1_000_000_000_000;

    if bytes >= TB {
        format_scaled(bytes, TB, "TB")
    } else if bytes >= GB {
        format_scaled(bytes, GB, "GB")
    } else if bytes >= MB {
        format_scaled(bytes, MB, "MB")
    } else if bytes >= KB {
        format_scaled(bytes, KB, "KB")
    } else {
        format!("{}B", bytes)
    }
}

fn format_scaled(value: u64, unit: u64, suffix: &str) -> String {
    let whole = value.checked_div(unit).unwrap_or(0);
    let frac = value
        .saturating_sub(whole.saturating_mul(unit))
        .saturating_mul(100)
        .checked_div(unit)
        .unwrap_or(0);
    format!("{whole}.{frac:02}{suffix}")
}
