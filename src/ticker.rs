//! The one-second countdown clock and tray title formatting.

use crate::models::{SessionKind, SessionState};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Message sent from the ticker thread to the main thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMessage {
    /// One interval elapsed on the ticker with this generation.
    Tick { generation: u64 },
}

/// A repeating tick source running on its own thread. Dropping it stops the
/// thread at its next wake-up.
pub struct Ticker {
    generation: u64,
    stop: Arc<AtomicBool>,
}

impl Ticker {
    pub fn start(generation: u64, interval: Duration, tx: Sender<TimerMessage>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        thread::spawn(move || {
            // Deadline based so sleep overshoot does not accumulate. After a
            // system sleep the missed ticks are delivered back to back.
            let mut deadline = Instant::now() + interval;
            loop {
                thread::sleep(deadline.saturating_duration_since(Instant::now()));
                if flag.load(Ordering::Acquire) {
                    break;
                }
                if tx.send(TimerMessage::Tick { generation }).is_err() {
                    break;
                }
                deadline += interval;
            }
        });

        Self { generation, stop }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Release);
    }
}

/// Owns at most one [`Ticker`] and keeps it in step with the timer state.
pub struct Countdown {
    ticker: Option<Ticker>,
    generation: u64,
    interval: Duration,
    tx: Sender<TimerMessage>,
}

impl Countdown {
    pub fn new(tx: Sender<TimerMessage>) -> Self {
        Self::with_interval(tx, TICK_INTERVAL)
    }

    pub fn with_interval(tx: Sender<TimerMessage>, interval: Duration) -> Self {
        Self {
            ticker: None,
            generation: 0,
            interval,
            tx,
        }
    }

    /// Starts a ticker when the timer runs and drops it when it does not.
    pub fn sync(&mut self, running: bool) {
        match (running, self.ticker.is_some()) {
            (true, false) => {
                self.generation += 1;
                self.ticker = Some(Ticker::start(
                    self.generation,
                    self.interval,
                    self.tx.clone(),
                ));
            }
            (false, true) => self.ticker = None,
            _ => {}
        }
    }

    /// Whether a message comes from the live ticker. Ticks already in flight
    /// from a dropped ticker are rejected.
    pub fn accepts(&self, message: &TimerMessage) -> bool {
        let TimerMessage::Tick { generation } = message;
        self.ticker
            .as_ref()
            .is_some_and(|ticker| ticker.generation() == *generation)
    }

    #[cfg(test)]
    pub fn is_active(&self) -> bool {
        self.ticker.is_some()
    }
}

fn kind_glyph(kind: SessionKind) -> &'static str {
    match kind {
        SessionKind::Focus => "🍅",
        SessionKind::ShortBreak => "☕",
        SessionKind::LongBreak => "🌿",
    }
}

/// Formats the tray title based on current timer state.
pub fn format_tray_title(session: &SessionState, zen_mode: bool) -> String {
    let time = format_time(session.remaining_secs);
    if zen_mode {
        return time;
    }

    if session.is_running {
        format!("{} {}", kind_glyph(session.kind), time)
    } else if session.remaining_secs < session.total_secs {
        format!("⏸ {}", time)
    } else {
        kind_glyph(session.kind).to_string()
    }
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Settings;
    use std::sync::mpsc::{self, RecvTimeoutError};

    fn session(kind: SessionKind, remaining_secs: u32, total_secs: u32, running: bool) -> SessionState {
        SessionState {
            kind,
            session_count: 1,
            remaining_secs,
            total_secs,
            is_running: running,
        }
    }

    #[test]
    fn test_format_tray_title_fresh_session() {
        let state = SessionState::new(&Settings::default());
        assert_eq!(format_tray_title(&state, false), "🍅");
    }

    #[test]
    fn test_format_tray_title_running_focus() {
        let state = session(SessionKind::Focus, 1432, 1500, true);
        assert_eq!(format_tray_title(&state, false), "🍅 23:52");
    }

    #[test]
    fn test_format_tray_title_paused() {
        let state = session(SessionKind::Focus, 600, 1500, false);
        assert_eq!(format_tray_title(&state, false), "⏸ 10:00");
    }

    #[test]
    fn test_format_tray_title_breaks() {
        let short = session(SessionKind::ShortBreak, 272, 300, true);
        assert_eq!(format_tray_title(&short, false), "☕ 04:32");

        let long = session(SessionKind::LongBreak, 900, 900, false);
        assert_eq!(format_tray_title(&long, false), "🌿");
    }

    #[test]
    fn test_format_tray_title_zen() {
        let state = session(SessionKind::ShortBreak, 272, 300, true);
        assert_eq!(format_tray_title(&state, true), "04:32");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(3599), "59:59");
        assert_eq!(format_time(3600), "60:00");
    }

    #[test]
    fn test_ticker_sends_ticks() {
        let (tx, rx) = mpsc::channel();
        let _ticker = Ticker::start(7, Duration::from_millis(10), tx);

        for _ in 0..3 {
            let msg = rx.recv_timeout(Duration::from_secs(2)).unwrap();
            assert_eq!(msg, TimerMessage::Tick { generation: 7 });
        }
    }

    #[test]
    fn test_dropping_ticker_stops_thread() {
        let (tx, rx) = mpsc::channel();
        let ticker = Ticker::start(1, Duration::from_millis(10), tx);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        drop(ticker);

        // Ticks already queued drain, then the thread exits and drops its sender.
        loop {
            match rx.recv_timeout(Duration::from_secs(2)) {
                Ok(_) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => panic!("ticker thread kept running"),
            }
        }
    }

    #[test]
    fn test_countdown_keeps_single_ticker() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::with_interval(tx, Duration::from_secs(60));
        assert!(!countdown.is_active());

        countdown.sync(true);
        assert!(countdown.is_active());
        assert!(countdown.accepts(&TimerMessage::Tick { generation: 1 }));

        // Syncing again while running keeps the same ticker.
        countdown.sync(true);
        assert!(countdown.accepts(&TimerMessage::Tick { generation: 1 }));

        countdown.sync(false);
        assert!(!countdown.is_active());
        assert!(!countdown.accepts(&TimerMessage::Tick { generation: 1 }));
    }

    #[test]
    fn test_countdown_rejects_stale_ticks_after_restart() {
        let (tx, _rx) = mpsc::channel();
        let mut countdown = Countdown::with_interval(tx, Duration::from_secs(60));

        countdown.sync(true);
        countdown.sync(false);
        countdown.sync(true);

        assert!(!countdown.accepts(&TimerMessage::Tick { generation: 1 }));
        assert!(countdown.accepts(&TimerMessage::Tick { generation: 2 }));
    }
}
