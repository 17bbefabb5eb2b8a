use crossbeam::atomic::AtomicCell;
use std::{sync::Arc, time::Instant};

/// Measures wall-clock frame time for callers that drive the simulation from
/// a render loop. The physics itself only ever sees the `dt` passed to it.
pub struct DeltaTimeMeter {
    last_update: Instant,
    current: DeltaTime,
}

impl DeltaTimeMeter {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            current: DeltaTime(Arc::new(AtomicCell::new(0))),
        }
    }

    /// Records the time since the previous tick and returns it in seconds.
    pub fn tick(&mut self) -> f64 {
        let now = Instant::now();
        let nanos = now.duration_since(self.last_update).as_nanos() as u64;
        self.current.0.store(nanos);
        self.last_update = now;
        nanos as f64 / 1_000_000_000.0
    }

    /// A handle other threads can use to read the latest frame time.
    pub fn reader(&self) -> DeltaTime {
        self.current.clone()
    }
}

impl Default for DeltaTimeMeter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct DeltaTime(Arc<AtomicCell<u64>>);

impl DeltaTime {
    /// Returns the delta-time in seconds.
    pub fn get_f64(&self) -> f64 {
        self.0.load() as f64 / 1_000_000_000.0
    }

    /// Frames per second implied by the last delta, `None` before the first
    /// tick.
    pub fn fps(&self) -> Option<f64> {
        let dt = self.get_f64();
        (dt > 0.0).then(|| 1.0 / dt)
    }
}

use std::fmt;
impl fmt::Debug for DeltaTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get_f64())
    }
}

#[cfg(test)]
mod test {
    use std::{thread, time::Duration};

    use super::DeltaTimeMeter;

    #[test]
    fn reader_sees_latest_tick() {
        let mut meter = DeltaTimeMeter::new();
        let reader = meter.reader();
        assert_eq!(reader.fps(), None);

        thread::sleep(Duration::from_millis(5));
        let dt = meter.tick();
        assert!(dt >= 0.005);
        assert_eq!(reader.get_f64(), dt);
        assert!(reader.fps().is_some());
    }
}
