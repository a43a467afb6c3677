use std::thread;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;
use tracing::{debug, error};

/// Application events
#[derive(Debug, Clone, Copy)]
pub enum AppEvent {
    /// A key was pressed
    Key(KeyEvent),
    /// Mouse wheel activity
    Mouse(MouseEvent),
    /// Terminal was resized
    Resize(u16, u16),
}

/// Reads terminal events on a dedicated thread so the async side never
/// blocks on `crossterm::event::poll`
pub struct EventHandler {
    poll_interval: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        Self {
            poll_interval: Duration::from_millis(tick_rate_ms.max(1)),
        }
    }

    /// Poll for the next event, waiting at most one poll interval
    pub fn next(&self) -> Result<Option<AppEvent>> {
        if !event::poll(self.poll_interval)? {
            return Ok(None);
        }
        let event = match event::read()? {
            // Only key presses; crossterm 0.27+ also reports releases on some systems
            Event::Key(key) if key.kind == KeyEventKind::Press => Some(AppEvent::Key(key)),
            Event::Mouse(mouse)
                if matches!(mouse.kind, MouseEventKind::ScrollDown | MouseEventKind::ScrollUp) =>
            {
                Some(AppEvent::Mouse(mouse))
            }
            Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
            _ => None,
        };
        Ok(event)
    }

    /// Forward events to `tx` until the receiver is dropped
    pub fn spawn(self, tx: mpsc::UnboundedSender<AppEvent>) -> thread::JoinHandle<()> {
        thread::spawn(move || loop {
            if tx.is_closed() {
                debug!("Event receiver dropped, stopping input thread");
                break;
            }
            match self.next() {
                Ok(Some(event)) => {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    error!("Failed to read terminal event: {}", e);
                    break;
                }
            }
        })
    }
}
