use std::time::{Duration, Instant};

/// Monotonic frame counter at a nominal rate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    frame: u64,
    rate_hz: u32,
}

impl FrameClock {
    pub fn new(rate_hz: u32) -> Self {
        Self {
            frame: 0,
            rate_hz: rate_hz.max(1),
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn rate_hz(&self) -> u32 {
        self.rate_hz
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.rate_hz))
    }

    /// Moves to the next frame and returns its number.
    pub fn advance(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Nominal time elapsed since frame zero.
    pub fn elapsed(&self) -> Duration {
        self.frame_duration().mul_f64(self.frame as f64)
    }
}

/// Sleeps out the remainder of each frame to hold the nominal rate.
#[derive(Debug)]
pub struct FramePacer {
    frame_duration: Duration,
    next_deadline: Instant,
}

impl FramePacer {
    pub fn new(clock: &FrameClock) -> Self {
        let frame_duration = clock.frame_duration();
        Self {
            frame_duration,
            next_deadline: Instant::now() + frame_duration,
        }
    }

    /// Waits for the next deadline. A late frame resynchronises instead of
    /// trying to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if now < self.next_deadline {
            std::thread::sleep(self.next_deadline - now);
            self.next_deadline += self.frame_duration;
        } else {
            self.next_deadline = now + self.frame_duration;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_one_frame_at_a_time() {
        let mut clock = FrameClock::new(60);
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.elapsed(), clock.frame_duration() * 2);
    }

    #[test]
    fn zero_rate_is_clamped() {
        let clock = FrameClock::new(0);
        assert_eq!(clock.rate_hz(), 1);
        assert_eq!(clock.frame_duration(), Duration::from_secs(1));
    }

    #[test]
    fn pacer_waits_roughly_one_frame() {
        let clock = FrameClock::new(200);
        let mut pacer = FramePacer::new(&clock);
        let start = Instant::now();
        pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(3));
    }
}
