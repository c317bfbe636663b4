use super::CpuSampler;
use crate::error::CollectionError;
use crate::pid::Pid;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use sysinfo::{ProcessRefreshKind, System, MINIMUM_CPU_UPDATE_INTERVAL};
use tracing::{debug, info_span, instrument, trace, Instrument};

/// Samples a process's CPU utilization.
///
/// Utilization is the process CPU time consumed between two readings taken
/// `window` apart, divided by the wall-clock time between them. On Linux
/// both readings come straight from `/proc/<pid>/stat`, so a process whose
/// first reading is zero ticks (one that has only just started) is still
/// measured. Elsewhere, or if `/proc` cannot be read, the figure `sysinfo`
/// computes from its two refreshes is used instead.
///
/// `sysinfo` also answers whether the process exists at each end of the
/// window. Every sample starts from a fresh [`System`]; nothing is carried
/// over between calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessCpuSampler;

impl ProcessCpuSampler {
    /// Windows shorter than what `sysinfo` can resolve are widened.
    pub fn effective_window(window: Duration) -> Duration {
        window.max(MINIMUM_CPU_UPDATE_INTERVAL)
    }
}

fn refresh(system: &mut System, pid: sysinfo::Pid) -> bool {
    system.refresh_process_specifics(pid, ProcessRefreshKind::new().with_cpu())
}

/// CPU time spent over `elapsed` wall-clock time, as a percentage of one core.
fn utilization(cpu_time: Duration, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        return 0.0;
    }
    cpu_time.as_secs_f64() / elapsed.as_secs_f64() * 100.0
}

#[async_trait]
impl CpuSampler for ProcessCpuSampler {
    #[instrument(level = "debug", skip(self))]
    async fn sample(&self, pid: Pid, window: Duration) -> Result<f64, CollectionError> {
        let target = sysinfo::Pid::from_u32(*pid);
        let mut system = System::new();

        if !refresh(&mut system, target) || system.process(target).is_none() {
            return Err(CollectionError::ProcessNotFound(pid.as_raw()));
        }
        let before = proc_stat::cpu_time(pid).await;
        let started = Instant::now();

        let window = Self::effective_window(window);
        tokio::time::sleep(window)
            .instrument(info_span!("cpu_sample", %pid, window_ms = window.as_millis() as u64))
            .await;

        if !refresh(&mut system, target) {
            return Err(CollectionError::Sampling {
                pid,
                reason: "process exited during the sampling window".to_string(),
            });
        }
        let after = proc_stat::cpu_time(pid).await;
        let elapsed = started.elapsed();

        let process = system
            .process(target)
            .ok_or_else(|| CollectionError::Sampling {
                pid,
                reason: "process disappeared before its usage could be read".to_string(),
            })?;

        let usage = match (before, after) {
            (Some(before), Some(after)) => utilization(after.saturating_sub(before), elapsed),
            _ => {
                debug!(%pid, "Process CPU times unavailable, using sysinfo's estimate");
                f64::from(process.cpu_usage())
            }
        };

        trace!(%pid, usage, elapsed_ms = elapsed.as_millis() as u64, "Sampled process CPU usage");
        Ok(usage)
    }
}

#[cfg(target_os = "linux")]
mod proc_stat {
    use crate::pid::Pid;
    use nix::unistd::{sysconf, SysconfVar};
    use std::time::Duration;

    /// Kernel default, used when `sysconf` cannot report the tick rate.
    const DEFAULT_CLOCK_TICKS: u64 = 100;

    /// Total user and system CPU time `pid` has consumed so far.
    pub async fn cpu_time(pid: Pid) -> Option<Duration> {
        let stat = tokio::fs::read_to_string(format!("/proc/{pid}/stat"))
            .await
            .ok()?;
        parse_ticks(&stat).map(|ticks| ticks_to_duration(ticks, clock_ticks()))
    }

    fn clock_ticks() -> u64 {
        sysconf(SysconfVar::CLK_TCK)
            .ok()
            .flatten()
            .and_then(|ticks| u64::try_from(ticks).ok())
            .filter(|ticks| *ticks > 0)
            .unwrap_or(DEFAULT_CLOCK_TICKS)
    }

    /// Sum of `utime` and `stime` from a `/proc/<pid>/stat` line.
    ///
    /// The command name is parenthesized and may itself hold spaces and
    /// parentheses, so fields are counted from the last `)`.
    pub fn parse_ticks(stat: &str) -> Option<u64> {
        let (_, rest) = stat.rsplit_once(')')?;
        let mut fields = rest.split_whitespace().skip(11);
        let utime = fields.next()?.parse::<u64>().ok()?;
        let stime = fields.next()?.parse::<u64>().ok()?;
        Some(utime.saturating_add(stime))
    }

    pub fn ticks_to_duration(ticks: u64, per_second: u64) -> Duration {
        Duration::from_secs(ticks / per_second)
            + Duration::from_nanos((ticks % per_second) * 1_000_000_000 / per_second)
    }

}

#[cfg(not(target_os = "linux"))]
mod proc_stat {
    use crate::pid::Pid;
    use std::time::Duration;

    pub async fn cpu_time(_pid: Pid) -> Option<Duration> {
        None
    }
}
