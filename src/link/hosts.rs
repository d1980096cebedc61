//! Per-host entry selection.
use crate::config::DotEntry;

/// Whether `entry` should be linked on `hostname`.
///
/// An entry without hosts applies everywhere; otherwise the hostname must
/// match one of them exactly.
#[must_use]
pub fn applies(entry: &DotEntry, hostname: &str) -> bool {
    entry.hosts.is_empty() || entry.hosts.iter().any(|h| h == hostname)
}

/// Keep the entries that apply to `hostname`, in config order.
#[must_use]
pub fn filter<'a>(dots: &'a [DotEntry], hostname: &str) -> Vec<&'a DotEntry> {
    dots.iter().filter(|d| applies(d, hostname)).collect()
}
