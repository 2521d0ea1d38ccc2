//! Stage timing.
//!
//! Analysis stages carry no timers of their own; callers wrap them with
//! [`timed`], which measures wall time and logs it.

use std::time::{Duration, Instant};

use log::info;

/// A value together with the wall time it took to produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// Runs `f`, logging how long it took under `label`.
pub fn timed<T, F>(label: &str, f: F) -> Timed<T>
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let value = f();
    let elapsed = start.elapsed();
    info!("{}: {:?}", label, elapsed);
    Timed { value, elapsed }
}
