mod debug_overlay;
mod section_view;
mod status_bar;

pub use debug_overlay::DebugOverlayWidget;
pub use section_view::{section_lines, visible_bands, Band, SectionViewWidget};
pub use status_bar::{state_label, StatusBarWidget};
