//! Window-manager core of the browser desktop shell.
//!
//! [`WindowManager`] owns the window registry and is its only writer. Pointer gestures go
//! through [`frame::FrameController`], rendering reads [`compositor`], layout persistence
//! observes the store through [`persistence::LayoutPersister`], and [`runtime_context`] binds
//! it all to leptos signals. [`components`] renders the desktop from those signals.

pub mod components;
pub mod compositor;
pub mod config;
pub mod desktop;
pub mod frame;
pub mod geometry;
pub mod lifecycle;
pub mod model;
pub mod persistence;
pub mod reducer;
pub mod runtime_context;
pub mod shortcuts;
pub mod taskbar;
pub mod window_manager;

pub use components::{DesktopShell, WindowLayer};
pub use compositor::{visible_windows, Compositor};
pub use config::{load_config, WindowManagerConfig};
pub use frame::{FrameController, PointerInput, ResizeDirection};
pub use geometry::{Viewport, WorkArea};
pub use lifecycle::{Clock, ManualClock, SystemClock, TransitionKind};
pub use model::*;
pub use persistence::{load_layout, load_layout_or_default, persist_layout, LayoutPersister};
pub use reducer::{reduce_windows, ReducerError, RuntimeEffect, WindowAction};
pub use runtime_context::{provide_desktop_runtime, use_desktop_runtime, DesktopRuntimeContext};
pub use window_manager::{SubscriptionId, WindowManager};
