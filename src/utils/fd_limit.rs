//! File descriptor limit detection for capping concurrent directory reads (Unix).

use log::debug;

/// Estimated number of file descriptors held per in-flight directory read.
pub const FDS_PER_READ: usize = 1;

/// Fraction of the process FD limit to use (leave headroom for output files and the runtime).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Soft `RLIMIT_NOFILE` of this process. `None` when unlimited or not queryable, in which
/// case directory reads are bounded only by the configured concurrency.
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    let mut rlim = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut rlim) } != 0 {
        return None;
    }
    let soft = rlim.rlim_cur;
    (soft != libc::RLIM_INFINITY && soft <= i64::MAX as u64).then_some(soft)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Largest concurrency that stays under ~80% of the FD limit, or `None` if there is no limit.
pub fn max_reads_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    Some((usable / FDS_PER_READ).max(1))
}

/// Cap `requested` by the FD limit, logging when it is lowered.
pub fn cap_concurrency(requested: usize) -> usize {
    match max_reads_by_fd_limit() {
        Some(cap) if cap < requested => {
            debug!("Capping concurrency {} -> {} (FD limit ~80%)", requested, cap);
            cap
        }
        _ => requested,
    }
}
