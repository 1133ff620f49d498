use std::time::{Duration, Instant};

/// Logs one pipeline step's duration and returns the total elapsed so far.
///
/// With `profile` set the line goes out at info level, otherwise at trace.
pub(crate) fn trace(profile: bool, l_type: &str, l_step: &str, detect: Instant, _detect_elapsed: Duration) -> Duration {
    let total = detect.elapsed();
    if profile {
        log::info!("{} | Total={:.2?} | {}={:.2?}", l_type, total, l_step, total - _detect_elapsed);
    }
    else {
        log::trace!("{} | Total={:.2?} | {}={:.2?}", l_type, total, l_step, total - _detect_elapsed);
    }
    total
}

/// Formats a byte count with binary units, e.g. `1.50 MiB`.
pub fn human_bytes(size: f64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut size = size;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", size, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_bytes_units() {
        assert_eq!(human_bytes(512.), "512.00 B");
        assert_eq!(human_bytes(1536.), "1.50 KiB");
        assert_eq!(human_bytes(3. * 1024. * 1024. * 1024.), "3.00 GiB");
    }
}
