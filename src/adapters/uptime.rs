//! Monotonic uptime, the sampler's time base.
//!
//! Milliseconds since boot — never the RTC, so clock adjustments can't
//! stretch or shrink the sampling cadence.

pub struct Uptime {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Uptime {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u64 {
        // esp_timer counts microseconds since boot.
        (unsafe { esp_idf_sys::esp_timer_get_time() } / 1000) as u64
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nondecreasing() {
        let up = Uptime::new();
        let a = up.now_ms();
        let b = up.now_ms();
        assert!(b >= a);
    }
}
