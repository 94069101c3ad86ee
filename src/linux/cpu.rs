use std::num::NonZeroUsize;

const PROC_CPUINFO: &str = "/proc/cpuinfo";

/// Number of parallel build jobs to configure for the target.
///
/// Assumes some big.LITTLE-ness, or even "low vs. high" cores,
/// so only half of the logical processors are used. Never returns 0.
pub fn cpu_job_count() -> usize {
    job_count(logical_cpu_count())
}

pub fn job_count(logical_cpus: usize) -> usize {
    (logical_cpus / 2).max(1)
}

pub fn logical_cpu_count() -> usize {
    match std::thread::available_parallelism() {
        Ok(n) => NonZeroUsize::get(n),
        Err(err) => {
            log::warn!("available_parallelism failed: {err}, falling back to {PROC_CPUINFO}");

            std::fs::read_to_string(PROC_CPUINFO)
                .map(|cpuinfo| count_processors(&cpuinfo))
                .unwrap_or(1)
        }
    }
}

fn count_processors(cpuinfo: &str) -> usize {
    cpuinfo
        .lines()
        .filter(|line| line.starts_with("processor"))
        .count()
}
