//! Navigation and session state for atlas.
//!
//! A [`Session`] owns a [`VirtualTree`](atlas_core::VirtualTree) and the
//! [`NavigationState`] describing what is being looked at. The state maps
//! to and from a query-string [`Address`], the selection is moved with a
//! [`Cursor`], and file previews are requested and loaded through
//! [`PreviewLoader`] with tickets that discard stale results.

pub mod address;
mod commands;
mod cursor;
mod loader;
mod preview;
mod session;
mod settings;
mod state;

pub use address::Address;
pub use commands::{CommandAction, HELP, SortCommand, parse_command};
pub use cursor::{Cursor, GRID_COLUMNS, Layout, ListNavigator, Movement, PAGE_SIZE};
pub use loader::{MANIFEST_FILE, load_manifest, load_manifest_stdin};
pub use preview::{
    PreviewContent, PreviewError, PreviewLoader, PreviewRequest, PreviewTicket, PreviewTracker,
    TEXT_PREVIEW_LIMIT,
};
pub use session::{Activation, Breadcrumb, Session};
pub use settings::{Bookmark, UserSettings};
pub use state::NavigationState;
