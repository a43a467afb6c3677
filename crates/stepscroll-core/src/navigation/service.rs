use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use super::controller::ScrollController;
use super::navigator::{DebugInfo, Navigator, Origin};
use super::signal::RawInput;
use crate::config::ScrollConfig;

/// Requests a host sends to a running navigator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NavigatorCommand {
    Input(RawInput),
    Goto(isize),
    Next,
    Prev,
    Resize { viewport_height: f64 },
}

/// Drives a navigator from a command channel and a frame clock, publishing
/// a `DebugInfo` snapshot whenever it changes.
///
/// The navigator is not `Send`; run the service on a current-thread runtime
/// or inside a `LocalSet`.
pub struct NavigatorService<C> {
    navigator: Navigator<C>,
    frame_interval: Duration,
    idle_interval: Duration,
    snapshot_tx: watch::Sender<DebugInfo>,
}

impl<C: ScrollController> NavigatorService<C> {
    pub fn new(navigator: Navigator<C>) -> Self {
        let (snapshot_tx, _) = watch::channel(navigator.debug_info());
        let defaults = ScrollConfig::default();
        Self {
            navigator,
            frame_interval: defaults.frame_interval(),
            idle_interval: defaults.tick_rate(),
            snapshot_tx,
        }
    }

    /// Use the frame and idle rates from a scroll config
    pub fn with_scroll_config(mut self, config: &ScrollConfig) -> Self {
        self.frame_interval = config.frame_interval();
        self.idle_interval = config.tick_rate();
        self
    }

    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn navigator(&self) -> &Navigator<C> {
        &self.navigator
    }

    /// Receiver for debug snapshots
    pub fn snapshots(&self) -> watch::Receiver<DebugInfo> {
        self.snapshot_tx.subscribe()
    }

    fn handle(&mut self, command: NavigatorCommand) {
        let outcome = match command {
            NavigatorCommand::Input(raw) => self.navigator.handle_input(raw),
            NavigatorCommand::Goto(index) => self.navigator.goto_section(index, Origin::External),
            NavigatorCommand::Next => self.navigator.next_section(),
            NavigatorCommand::Prev => self.navigator.prev_section(),
            NavigatorCommand::Resize { viewport_height } => {
                self.navigator.resize(viewport_height);
                return;
            }
        };
        debug!(?command, ?outcome, "Handled navigator command");
    }

    fn publish(&self) {
        let info = self.navigator.debug_info();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == info {
                false
            } else {
                *current = info;
                true
            }
        });
    }

    /// Frame rate while something time-based is happening, idle rate otherwise
    fn next_tick_in(&self) -> Duration {
        if self.navigator.needs_update() || !self.navigator.can_navigate() {
            self.frame_interval
        } else {
            self.idle_interval
        }
    }

    /// Run until shutdown or until every command sender is dropped. Returns
    /// the navigator so callers can inspect final state.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<NavigatorCommand>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Navigator<C> {
        info!(
            sections = self.navigator.section_count(),
            frame_ms = self.frame_interval.as_millis() as u64,
            "Navigator service started"
        );

        loop {
            let sleep = tokio::time::sleep(self.next_tick_in());

            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Navigator service received shutdown signal");
                        break;
                    }
                }

                command = commands.recv() => {
                    match command {
                        Some(command) => self.handle(command),
                        None => {
                            debug!("Command channel closed");
                            break;
                        }
                    }
                }

                _ = sleep => {
                    self.navigator.tick();
                }
            }

            self.publish();
        }

        info!(section = self.navigator.current_index(), "Navigator service stopped");
        self.navigator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::navigation::controller::ScrollRequest;
    use tokio::task::LocalSet;

    /// Lands on every target as soon as it is asked to
    struct InstantController {
        offset: f64,
        viewport: f64,
    }

    impl ScrollController for InstantController {
        fn scroll_to(&mut self, position: f64, request: ScrollRequest) {
            self.offset = position;
            request.completion.complete();
        }

        fn jump_to(&mut self, position: f64) {
            self.offset = position;
        }

        fn scroll_offset(&self) -> f64 {
            self.offset
        }

        fn viewport_height(&self) -> f64 {
            self.viewport
        }

        fn resize(&mut self, viewport_height: f64) {
            self.viewport = viewport_height;
        }
    }

    fn service() -> NavigatorService<InstantController> {
        let controller = InstantController {
            offset: 0.0,
            viewport: 40.0,
        };
        let navigator = Navigator::new(4, controller, &AppConfig::default()).unwrap();
        NavigatorService::new(navigator).with_frame_interval(Duration::from_millis(16))
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_drive_navigation() {
        LocalSet::new()
            .run_until(async {
                let service = service();
                let mut snapshots = service.snapshots();
                let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let handle = tokio::task::spawn_local(service.run(cmd_rx, shutdown_rx));

                cmd_tx.send(NavigatorCommand::Next).unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(snapshots.borrow_and_update().current_index, 1);

                // Inside the cooldown window
                cmd_tx.send(NavigatorCommand::Next).unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(snapshots.borrow_and_update().current_index, 1);

                tokio::time::sleep(Duration::from_millis(250)).await;
                cmd_tx.send(NavigatorCommand::Goto(3)).unwrap();
                tokio::time::sleep(Duration::from_millis(50)).await;
                assert_eq!(snapshots.borrow().current_index, 3);
                assert_eq!(snapshots.borrow().scroll_offset, 120.0);

                shutdown_tx.send(true).unwrap();
                let navigator = handle.await.unwrap();
                assert_eq!(navigator.current_index(), 3);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_when_commands_close() {
        LocalSet::new()
            .run_until(async {
                let service = service();
                let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
                let (_shutdown_tx, shutdown_rx) = watch::channel(false);
                let handle = tokio::task::spawn_local(service.run(cmd_rx, shutdown_rx));

                cmd_tx
                    .send(NavigatorCommand::Resize {
                        viewport_height: 30.0,
                    })
                    .unwrap();
                cmd_tx.send(NavigatorCommand::Prev).unwrap();
                drop(cmd_tx);

                let navigator = handle.await.unwrap();
                assert_eq!(navigator.current_index(), 0);
                assert_eq!(navigator.controller().viewport_height(), 30.0);
            })
            .await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_scrolling_settles_through_ticks() {
        LocalSet::new()
            .run_until(async {
                let service = service();
                let mut snapshots = service.snapshots();
                let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let handle = tokio::task::spawn_local(service.run(cmd_rx, shutdown_rx));

                cmd_tx
                    .send(NavigatorCommand::Input(RawInput::Wheel { delta_y: 5.0 }))
                    .unwrap();
                tokio::time::sleep(Duration::from_millis(20)).await;
                assert!(snapshots.borrow_and_update().is_scrolling);

                tokio::time::sleep(Duration::from_millis(200)).await;
                assert!(!snapshots.borrow_and_update().is_scrolling);

                shutdown_tx.send(true).unwrap();
                handle.await.unwrap();
            })
            .await;
    }
}
