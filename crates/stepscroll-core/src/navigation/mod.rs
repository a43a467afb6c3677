//! Section-snapping navigation
//!
//! A document is a vertical stack of full-viewport sections. User input and
//! external requests move between them one transition at a time; the
//! `Navigator` owns all state and is driven cooperatively through `tick`.

pub mod controller;
pub mod fault;
pub mod navigator;
pub mod scheduler;
pub mod service;
pub mod signal;
pub mod sync;
pub mod tracker;

pub use controller::{
    completion_pair, Completion, CompletionState, CompletionWaiter, ScrollController, ScrollRequest,
};
pub use fault::{BlockReason, NavigationFault};
pub use navigator::{
    DebugInfo, NavigationOutcome, NavigationRequest, Navigator, NavigatorEvent, Origin,
    SectionChange, SubscriptionId,
};
pub use scheduler::{CooldownScheduler, SchedulerSnapshot, SchedulerState};
pub use service::{NavigatorCommand, NavigatorService};
pub use signal::{DeviceProfile, Direction, NavKey, RawInput, SignalEvent, SignalSource, SignalTranslator};
pub use sync::{PositionSynchronizer, SyncReport};
pub use tracker::{AnimationOutcome, AnimationRecord, AnimationTracker};
