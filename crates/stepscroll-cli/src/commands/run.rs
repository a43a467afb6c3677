use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use tokio::sync::{mpsc, watch};
use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use stepscroll_core::navigation::{Navigator, NavigatorCommand, NavigatorEvent, NavigatorService};
use stepscroll_core::AppConfig;
use stepscroll_tui::{
    app::{resolve_sections, App},
    event::{AppEvent, EventHandler},
    input::{handle_key_event, handle_mouse_event, Action},
    keymap::Keymap,
    widgets::{DebugOverlayWidget, SectionViewWidget, StatusBarWidget},
    AnimatedScroller, Theme,
};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

const STATUS_BAR_HEIGHT: u16 = 1;

/// Rows available to sections in a terminal `rows` tall
fn content_height(rows: u16) -> u16 {
    rows.saturating_sub(STATUS_BAR_HEIGHT).max(1)
}

pub async fn run(config: Arc<AppConfig>, section_count: Option<usize>) -> Result<()> {
    let sections = resolve_sections(&config.sections, section_count);
    let keymap = Keymap::from_config(&config.keymap);

    // Build the navigator before touching the terminal so a bad section
    // count is reported on a normal screen
    let (_, rows) = crossterm::terminal::size()?;
    let scroller = AnimatedScroller::new(config.scroll.easing, content_height(rows) as f64);
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let navigator = Navigator::new(sections.len(), scroller, &config)?.with_event_sender(event_tx);
    let service = NavigatorService::new(navigator).with_scroll_config(&config.scroll);

    let app = App::new(sections, service.snapshots().borrow().clone(), Theme::default());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle("stepscroll"))?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = LocalSet::new()
        .run_until(run_app(&mut terminal, &config, app, keymap, service, event_rx))
        .await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Tui,
    config: &AppConfig,
    mut app: App,
    keymap: Keymap,
    service: NavigatorService<AnimatedScroller>,
    mut nav_events: mpsc::UnboundedReceiver<NavigatorEvent>,
) -> Result<()> {
    let mut snapshots = service.snapshots();
    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let service_handle = tokio::task::spawn_local(service.run(cmd_rx, shutdown_rx));

    // The input thread stops on its own once `input_rx` is dropped
    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let _input_thread = EventHandler::new(config.scroll.tick_rate_ms).spawn(input_tx);

    let wheel_step = config.scroll.wheel_step;

    loop {
        terminal.draw(|frame| draw(frame, &app))?;

        tokio::select! {
            Some(event) = input_rx.recv() => {
                let action = match event {
                    AppEvent::Key(key) => handle_key_event(key, &app, &keymap),
                    AppEvent::Mouse(mouse) => handle_mouse_event(mouse, wheel_step),
                    AppEvent::Resize(_, rows) => {
                        debug!(rows, "Terminal resized");
                        if cmd_tx
                            .send(NavigatorCommand::Resize {
                                viewport_height: content_height(rows) as f64,
                            })
                            .is_err()
                        {
                            warn!("Navigator service stopped");
                        }
                        Action::None
                    }
                };
                if let Some(command) = app.handle_action(action) {
                    if cmd_tx.send(command).is_err() {
                        warn!("Navigator service stopped");
                        break;
                    }
                }
            }

            result = snapshots.changed() => {
                if result.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                app.update_snapshot(snapshot);
            }

            Some(event) = nav_events.recv() => {
                app.apply_event(&event);
            }

            else => break,
        }

        if app.should_quit {
            break;
        }
    }

    let _ = shutdown_tx.send(true);
    let navigator = service_handle.await?;
    info!(
        section = navigator.current_index(),
        transitions = navigator.tracker().history().count(),
        "Viewer closed"
    );
    Ok(())
}

fn draw(frame: &mut Frame, app: &App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(STATUS_BAR_HEIGHT)])
        .split(frame.area());

    SectionViewWidget::render(frame, layout[0], app);
    StatusBarWidget::render(frame, layout[1], app);
    if app.show_debug {
        DebugOverlayWidget::render(frame, layout[0], app);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_height_leaves_room_for_status_bar() {
        assert_eq!(content_height(24), 23);
        assert_eq!(content_height(1), 1);
        assert_eq!(content_height(0), 1);
    }
}
