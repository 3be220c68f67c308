use std::io::Write;
use std::time::{Duration, Instant};

/// Installs the global logger. An explicit `filter` (usually `RUST_LOG`)
/// wins over the debug flag.
pub fn init_logging(debug: bool, filter: Option<&str>) {
    let default_filter = if debug { "debug" } else { "info" };
    let filter = filter
        .map(str::trim)
        .filter(|filter| !filter.is_empty())
        .unwrap_or(default_filter);

    env_logger::Builder::new()
        .parse_filters(filter)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        })
        .init();
}

/// Measures an operation; slow ones are reported when dropped.
pub struct Timer {
    name: String,
    start: Instant,
    slow_after: Duration,
}

impl Timer {
    pub fn new(name: impl Into<String>, slow_after: Duration) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            slow_after,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        if elapsed > self.slow_after {
            log::warn!("{} took {}ms (slow!)", self.name, elapsed.as_millis());
        } else {
            log::debug!("{} completed in {}ms", self.name, elapsed.as_millis());
        }
    }
}

/// First `max_chars` characters of `text`, for log lines.
pub fn preview(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("héllo wörld", 5), "héllo...");
        assert_eq!(preview("short", 200), "short");
    }
}
