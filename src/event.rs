use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Events the picker reacts to.
pub enum AppEvent {
    Key(KeyEvent),
    Tick,
}

/// Reads terminal input on a background thread and interleaves ticks.
/// Dropping it stops and joins the thread, so no keystroke meant for the
/// next program is consumed.
pub struct EventHandler {
    rx: Receiver<AppEvent>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::channel();
        let tick_rate = Duration::from_millis(tick_rate_ms);
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || pump(&tx, tick_rate, &thread_stop));
        Self {
            rx,
            stop,
            handle: Some(handle),
        }
    }

    /// Block until the next event.
    pub fn next(&self) -> Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Forward key presses and ticks until stopped or the receiver is dropped.
fn pump(tx: &Sender<AppEvent>, tick_rate: Duration, stop: &AtomicBool) {
    let mut last_tick = Instant::now();
    while !stop.load(Ordering::Acquire) {
        let timeout = tick_rate.saturating_sub(last_tick.elapsed());
        // poll() only peeks. Check the flag again before consuming the event.
        if event::poll(timeout).unwrap_or(false) && !stop.load(Ordering::Acquire) {
            // Key release/repeat events arrive on some platforms; only presses count
            if let Ok(Event::Key(key)) = event::read() {
                if key.kind == KeyEventKind::Press && tx.send(AppEvent::Key(key)).is_err() {
                    return;
                }
            }
        }
        if last_tick.elapsed() >= tick_rate {
            if tx.send(AppEvent::Tick).is_err() {
                return;
            }
            last_tick = Instant::now();
        }
    }
}
