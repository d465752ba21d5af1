use smp_lib::ProgressReporter;
use std::sync::atomic::{AtomicI32, Ordering};

/// Forwards progress to the log, throttled to whole-percent changes.
#[derive(Default)]
pub struct ConsoleProgressReporter {
    percent: AtomicI32,
}

impl ProgressReporter for ConsoleProgressReporter {
    fn start_step(&self, name: &str, total_steps: Option<u32>) {
        match total_steps {
            Some(total) => log::info!("{} (of {} steps)", name, total),
            None => log::info!("{}", name),
        }
    }

    fn update_bytes(&self, transferred: u64, total: Option<u64>) {
        if let Some(total) = total.filter(|t| *t > 0) {
            log::trace!("{}/{} bytes", transferred, total);
        }
    }

    fn set_percent(&self, percent: i32) {
        let previous = self.percent.swap(percent, Ordering::Relaxed);
        if previous != percent {
            log::debug!("{}%", percent);
        }
    }

    fn set_message(&self, message: &str) {
        log::info!("{}", message);
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        if let Some(total) = total {
            log::trace!("{}/{}", current, total);
        }
    }

    fn done(&self, success: bool, message: Option<&str>) {
        match (success, message) {
            (true, Some(msg)) => log::info!("Done: {}", msg),
            (true, None) => log::info!("Done"),
            (false, Some(msg)) => log::error!("Failed: {}", msg),
            (false, None) => log::error!("Failed"),
        }
    }
}
