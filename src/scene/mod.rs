//! Pure scene math for the showcase.
//!
//! This module owns everything that can be computed without a widget tree:
//! - `ViewportGeometry` - viewport size plus the cached arc constants
//! - `arc` - quadratic arc placement for the floating cards
//! - `stagger` - per-item gap/speed windowing
//! - `SceneFrame` - the full per-tick style record derived from progress
//!
//! The UI layer applies a `SceneFrame` to widgets in a single render step and
//! holds no animation logic of its own.

pub mod arc;
pub mod frame;
pub mod stagger;
pub mod viewport;

pub use frame::{CardPlacement, SceneFrame, TitleSlot};
pub use stagger::LocalProgress;
pub use viewport::{SceneTuning, ViewportGeometry};
