//! Event bus for sensei.
//!
//! Terminal input, timer ticks, highlighter output and finished service calls
//! are all normalised into one `AppEvent` enum on a tokio unbounded MPSC
//! channel. The main loop is the only consumer and the only writer of
//! `AppState`, so service results are applied in arrival order on one task.
//!
//! Two independent intervals drive the render and logic cycles:
//! - **Render interval** (33 ms, about 30 FPS) triggers a `terminal.draw()` call.
//! - **Tick interval** (250 ms) advances the loading spinner.

use crossterm::event::{Event, EventStream, KeyEvent, KeyEventKind, MouseEvent};
use futures::{FutureExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

use sensei_core::conversation::PendingChat;
use sensei_core::types::AnalysisResult;
use sensei_core::{ApiError, PendingAnalysis};

use crate::highlight::types::HighlightPayload;

/// All events the application can receive from any source.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press (`KeyEventKind::Press` only).
    Key(KeyEvent),
    /// Mouse click, scroll or movement.
    Mouse(MouseEvent),
    /// Terminal was resized to (columns, rows).
    Resize(u16, u16),
    /// Logic tick (250 ms).
    Tick,
    /// Render tick; triggers a `terminal.draw()` call.
    Render,
    /// Styled lines from the highlighter thread.
    Highlighted(Box<HighlightPayload>),
    /// An `/analyze` call finished.
    AnalysisFinished {
        pending: PendingAnalysis,
        outcome: Result<AnalysisResult, ApiError>,
    },
    /// A `/chat` call finished.
    ChatFinished {
        pending: PendingChat,
        outcome: Result<String, ApiError>,
    },
}

/// Holds the sender and receiver ends of the unified event channel.
///
/// The sender (`tx`) is cloned into the terminal task, the highlighter thread
/// and every spawned service call; the receiver (`rx`) is owned by the main
/// loop.
pub struct EventHandler {
    pub tx: mpsc::UnboundedSender<AppEvent>,
    pub rx: mpsc::UnboundedReceiver<AppEvent>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the task that turns terminal input and timers into `AppEvent`s.
///
/// - `reader.next().fuse()` keeps `select!` from polling a finished stream.
/// - Only `KeyEventKind::Press` is forwarded; Windows also reports releases.
/// - Send errors mean the main loop is gone; they are ignored.
pub fn spawn_event_task(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let mut tick_interval = interval(Duration::from_millis(250));
        let mut render_interval = interval(Duration::from_millis(33));
        let mut reader = EventStream::new();

        loop {
            let tick_tick = tick_interval.tick();
            let render_tick = render_interval.tick();
            let crossterm_event = reader.next().fuse();

            tokio::select! {
                _ = tick_tick => {
                    let _ = tx.send(AppEvent::Tick);
                }
                _ = render_tick => {
                    let _ = tx.send(AppEvent::Render);
                }
                maybe_event = crossterm_event => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                let _ = tx.send(AppEvent::Key(key));
                            }
                        }
                        Some(Ok(Event::Resize(w, h))) => {
                            let _ = tx.send(AppEvent::Resize(w, h));
                        }
                        Some(Ok(Event::Mouse(mouse))) => {
                            let _ = tx.send(AppEvent::Mouse(mouse));
                        }
                        None => break,
                        _ => {}
                    }
                }
            }
        }
    });
}
