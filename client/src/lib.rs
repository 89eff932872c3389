pub mod api;
pub mod config;
pub mod dashboard;
pub mod debounce;
pub mod editor;
pub mod error;
pub mod models;
pub mod navigation;
pub mod session;

pub use api::{RelayApi, RelayClient};
pub use config::ClientConfig;
pub use dashboard::{Dashboard, DashboardView};
pub use editor::EditorDraft;
pub use error::{ClientError, EditorError, NavigationError};
pub use models::FileEntry;
pub use navigation::{FolderStackEntry, ListScope, Navigation};
pub use session::{Credential, Provider, Session};
