//! Time source for the display loop and the shutdown handshake
//!
//! On the board this wraps the RP2040/RP2350 microsecond timer; on the host
//! `StdClock` uses `std::time`.

/// Microsecond clock with a blocking sleep.
pub trait FrameClock {
    /// Monotonic time in microseconds.
    fn now_us(&self) -> u64;

    /// Block the calling context for `us` microseconds.
    fn sleep_us(&self, us: u64);

    fn sleep_ms(&self, ms: u32) {
        self.sleep_us(ms as u64 * 1000);
    }

    /// Wait for an interrupt (or equivalent) while parked.
    fn idle(&self) {
        self.sleep_us(1000);
    }
}

impl<C: FrameClock + ?Sized> FrameClock for &C {
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }

    fn sleep_us(&self, us: u64) {
        (**self).sleep_us(us)
    }

    fn idle(&self) {
        (**self).idle()
    }
}

#[cfg(any(test, feature = "std"))]
pub use host::StdClock;

#[cfg(any(test, feature = "std"))]
mod host {
    use std::time::{Duration, Instant};

    use super::FrameClock;

    /// Wall clock backed by `std::time::Instant`.
    #[derive(Debug, Clone, Copy)]
    pub struct StdClock {
        origin: Instant,
    }

    impl StdClock {
        pub fn new() -> Self {
            Self { origin: Instant::now() }
        }
    }

    impl Default for StdClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl FrameClock for StdClock {
        fn now_us(&self) -> u64 {
            self.origin.elapsed().as_micros() as u64
        }

        fn sleep_us(&self, us: u64) {
            std::thread::sleep(Duration::from_micros(us));
        }

        fn idle(&self) {
            std::thread::park_timeout(Duration::from_millis(100));
        }
    }
}
