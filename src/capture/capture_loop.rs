//! Cancellable, self-rescheduling polling loop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::step::StepInterval;

/// Work performed on every tick of a [`CaptureLoop`].
///
/// `tick` starts at 1 and increments on every tick; `step` is the interval
/// in effect for that tick.
pub trait TickHandler: Send + 'static {
    fn on_tick(&mut self, tick: u64, step: Duration);
}

impl<F> TickHandler for F
where
    F: FnMut(u64, Duration) + Send + 'static,
{
    fn on_tick(&mut self, tick: u64, step: Duration) {
        self(tick, step)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Previewing,
    Disposed,
}

/// Polls at the host's step interval until stopped or disposed.
///
/// Cancellation uses a generation token: every run captures the generation
/// current when it started, and a run whose token no longer matches exits
/// before doing any more work. Stopping bumps the generation and aborts the
/// pending sleep, so a reschedule that already fired is a no-op.
#[derive(Debug)]
pub struct CaptureLoop {
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    state: LoopState,
}

impl Default for CaptureLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureLoop {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Previewing
    }

    /// Start polling. Any previous run is cancelled first.
    ///
    /// Must be called from within a Tokio runtime. Returns `false` once the
    /// loop has been disposed.
    pub fn start<H: TickHandler>(&mut self, step: StepInterval, handler: H) -> bool {
        if self.state == LoopState::Disposed {
            log::debug!("Capture loop already disposed; not restarting");
            return false;
        }
        self.cancel();

        let token = self.generation.load(Ordering::SeqCst);
        let generation = Arc::clone(&self.generation);
        self.task = Some(tokio::spawn(run(generation, token, step, handler)));
        self.state = LoopState::Previewing;
        true
    }

    /// Stop polling; the loop can be started again.
    pub fn stop(&mut self) {
        if self.state == LoopState::Previewing {
            self.cancel();
            self.state = LoopState::Idle;
        }
    }

    /// Stop polling for good.
    pub fn dispose(&mut self) {
        self.cancel();
        self.state = LoopState::Disposed;
    }

    fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for CaptureLoop {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn run<H: TickHandler>(
    generation: Arc<AtomicU64>,
    token: u64,
    step: StepInterval,
    mut handler: H,
) {
    let mut tick = 0u64;
    loop {
        if generation.load(Ordering::SeqCst) != token {
            break;
        }
        let interval = step.get();
        tick += 1;
        handler.on_tick(tick, interval);
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counter() -> (Arc<AtomicUsize>, impl FnMut(u64, Duration) + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        (count, move |_tick, _step| {
            c.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Let spawned tasks run at the current instant.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_track_step_interval() {
        let step = StepInterval::from_millis(10);
        let (count, handler) = counter();
        let mut lp = CaptureLoop::new();
        assert!(lp.start(step.clone(), handler));

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 2);

        // Slow the host down: the next reschedule uses the new interval.
        step.set(Duration::from_millis(100));
        tokio::time::sleep(Duration::from_millis(10)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        tokio::time::sleep(Duration::from_millis(50)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dispose_stops_ticks_for_good() {
        let (count, handler) = counter();
        let mut lp = CaptureLoop::new();
        lp.start(StepInterval::from_millis(5), handler);
        settle().await;

        lp.dispose();
        let seen = count.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), seen);

        let (_, again) = counter();
        assert!(!lp.start(StepInterval::from_millis(5), again));
        assert_eq!(lp.state(), LoopState::Disposed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_cancels_previous_run() {
        let (first, handler_a) = counter();
        let (second, handler_b) = counter();
        let mut lp = CaptureLoop::new();
        lp.start(StepInterval::from_millis(5), handler_a);
        settle().await;
        lp.start(StepInterval::from_millis(5), handler_b);
        let first_seen = first.load(Ordering::SeqCst);

        tokio::time::sleep(Duration::from_millis(20)).await;
        settle().await;
        assert_eq!(first.load(Ordering::SeqCst), first_seen);
        assert!(second.load(Ordering::SeqCst) >= 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_returns_to_idle() {
        let (_, handler) = counter();
        let mut lp = CaptureLoop::new();
        lp.start(StepInterval::from_millis(5), handler);
        assert!(lp.is_running());
        lp.stop();
        assert_eq!(lp.state(), LoopState::Idle);
    }
}
