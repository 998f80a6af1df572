//! Step inspector built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The inspector replays a run recorded with snapshots turned on. It never
//! executes code itself: stepping only moves a [`Timeline`] cursor over the
//! recorded [`Snapshot`]s.
//!
//! - **[`app`]**: inspector state, keyboard loop and pane focus
//! - **[`panes`]**: stateless render functions (source, console, stack,
//!   namespaces, memory, status bar)
//! - **[`theme`]**: color palette shared by the panes
//!
//! [`Timeline`]: crate::snapshot::Timeline
//! [`Snapshot`]: crate::snapshot::Snapshot

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
