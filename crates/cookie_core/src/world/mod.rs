//! Game world: object registry, session state and gameplay events

mod events;
mod game_object;
mod game_world;
mod session;

pub use events::GameEvent;
pub use game_object::{GameObject, ObjectHandle, ObjectKind};
pub use game_world::GameWorld;
pub use session::GameSession;
