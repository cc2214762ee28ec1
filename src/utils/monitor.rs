#[cfg(feature = "cli")]
use std::sync::Mutex;
#[cfg(feature = "cli")]
use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, RefreshKind, System};

#[cfg(feature = "cli")]
#[derive(Debug, Clone)]
pub struct SystemStats {
    pub cpu_usage: f32,
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub elapsed_time: Duration,
}

/// 記錄 ETL 各階段 (extract / transform / load) 的耗時與記憶體用量
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    last_mark: Mutex<Instant>,
    peak_memory: Mutex<u64>,
    phases: Mutex<Vec<(String, Duration)>>,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let mut system = System::new_with_specifics(RefreshKind::everything());
        // 取不到 PID 時只記錄耗時
        let pid = sysinfo::get_current_pid().ok();
        if enabled {
            system.refresh_all();
        }

        let now = Instant::now();
        Self {
            system: Mutex::new(system),
            pid,
            start_time: now,
            last_mark: Mutex::new(now),
            peak_memory: Mutex::new(0),
            phases: Mutex::new(Vec::new()),
            enabled,
        }
    }

    pub fn get_stats(&self) -> Option<SystemStats> {
        if !self.enabled {
            return None;
        }

        let (cpu_usage, memory_mb) = match self.pid {
            Some(pid) => {
                let mut system = self.system.lock().ok()?;
                system.refresh_all();
                system
                    .process(pid)
                    .map(|p| (p.cpu_usage(), p.memory() / 1024 / 1024))
                    .unwrap_or((0.0, 0))
            }
            None => (0.0, 0),
        };

        let mut peak = self.peak_memory.lock().ok()?;
        *peak = (*peak).max(memory_mb);

        Some(SystemStats {
            cpu_usage,
            memory_usage_mb: memory_mb,
            peak_memory_mb: *peak,
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// 結束一個階段：記錄自上次標記以來的耗時
    pub fn mark_phase(&self, phase: &str) {
        if !self.enabled {
            return;
        }

        let phase_time = match self.last_mark.lock() {
            Ok(mut last) => {
                let elapsed = last.elapsed();
                *last = Instant::now();
                elapsed
            }
            Err(_) => return,
        };
        if let Ok(mut phases) = self.phases.lock() {
            phases.push((phase.to_string(), phase_time));
        }

        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 {} - {:?} (CPU: {:.1}%, Memory: {}MB, Peak: {}MB)",
                phase,
                phase_time,
                stats.cpu_usage,
                stats.memory_usage_mb,
                stats.peak_memory_mb
            );
        }
    }

    pub fn phase_durations(&self) -> Vec<(String, Duration)> {
        self.phases.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn log_final_stats(&self) {
        if let Some(stats) = self.get_stats() {
            tracing::info!(
                "📊 Final Stats - Total Time: {:?}, Peak Memory: {}MB, Phases: {}",
                stats.elapsed_time,
                stats.peak_memory_mb,
                self.phase_durations().len()
            );
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 非 CLI 環境的空實現
#[cfg(not(feature = "cli"))]
#[derive(Default)]
pub struct SystemMonitor;

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self
    }

    pub fn mark_phase(&self, _phase: &str) {}

    pub fn phase_durations(&self) -> Vec<(String, std::time::Duration)> {
        Vec::new()
    }

    pub fn log_final_stats(&self) {}

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_monitor_records_nothing() {
        let monitor = SystemMonitor::new(false);
        monitor.mark_phase("extract");
        assert!(monitor.get_stats().is_none());
        assert!(monitor.phase_durations().is_empty());
    }

    #[test]
    fn test_enabled_monitor_records_phases_in_order() {
        let monitor = SystemMonitor::new(true);
        monitor.mark_phase("extract");
        monitor.mark_phase("transform");
        let phases: Vec<String> = monitor.phase_durations().into_iter().map(|(p, _)| p).collect();
        assert_eq!(phases, vec!["extract", "transform"]);
    }
}
