use chrono::{DateTime, Duration, Timelike, Utc};
use chrono_tz::{OffsetComponents, Tz};

/// Realigns fixed-UTC cron ticks with a report published at a fixed local
/// time.
///
/// The scheduler fires in two UTC hours. While the local zone observes DST
/// only the earlier one (`hour < cutoff`) is meant to run; otherwise only the
/// later one (`hour >= cutoff`).
#[derive(Debug, Clone, Copy)]
pub struct TimeWindowGate {
    timezone: Tz,
    cutoff_hour_utc: u32,
}

impl Default for TimeWindowGate {
    fn default() -> Self {
        Self::new(chrono_tz::US::Eastern, 13)
    }
}

impl TimeWindowGate {
    pub fn new(timezone: Tz, cutoff_hour_utc: u32) -> Self {
        Self {
            timezone,
            cutoff_hour_utc,
        }
    }

    pub fn is_dst(&self, now_utc: DateTime<Utc>) -> bool {
        let local = now_utc.with_timezone(&self.timezone);
        local.offset().dst_offset() != Duration::zero()
    }

    pub fn should_run(&self, now_utc: DateTime<Utc>) -> bool {
        let is_dst = self.is_dst(now_utc);
        let hour = now_utc.hour();
        let proceed = if is_dst {
            hour < self.cutoff_hour_utc
        } else {
            hour >= self.cutoff_hour_utc
        };

        tracing::info!(is_dst, utc_hour = hour, proceed, "Checked publication window");
        proceed
    }
}
