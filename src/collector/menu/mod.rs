mod controller;
mod handle;
mod page;
mod state;

// Re-export public API
pub use controller::MenuController;
pub use handle::{MenuHandle, PageMessageHandler, PageReactionHandler};
pub use page::{Page, PageRef};
pub use state::{Location, MenuState, Navigation, back, forward};
