//! Free-memory metric for the status payload.
//!
//! The device reports how much memory it has left alongside its status, a
//! useful health signal on constrained hardware. On Linux this reads
//! `MemAvailable` from `/proc/meminfo`; targets without procfs report 0.

/// Best-effort free memory in bytes. Never fails; unknown is reported as 0.
#[cfg(target_os = "linux")]
pub fn free_bytes() -> u64 {
    std::fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|contents| parse_meminfo(&contents))
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
pub fn free_bytes() -> u64 {
    0
}

/// Extract `MemAvailable` (reported in kB) and convert to bytes.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_meminfo(contents: &str) -> Option<u64> {
    let line = contents
        .lines()
        .find(|line| line.starts_with("MemAvailable:"))?;
    let kilobytes: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kilobytes * 1024)
}
