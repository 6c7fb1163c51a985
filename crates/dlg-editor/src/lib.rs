pub mod debounce;
pub mod document;
pub mod error;
pub mod layout_state;
pub mod messages;
pub mod observer;
pub mod store;
pub mod sync;

pub use debounce::{ChangeDebouncer, WriteOutcome};
pub use document::{MemoryDocument, TextDocument};
pub use error::{DocumentError, LayoutStateError, StateError, StoreError, SyncError};
pub use layout_state::{DockEvent, LayoutData, MemoryStateStore, SceneLayout, StateStore, ViewportTransform};
pub use messages::{Origin, SceneMessage, StoreMessage};
pub use observer::{Registry, Subscription};
pub use store::SceneStore;
pub use sync::SyncSession;
