pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod persist;

// Re-export key types at crate root for convenience
pub use api::game::{Game, GameConfig, EngineContext};
pub use api::types::{EntityId, GameEvent};
pub use components::entity::Entity;
pub use components::mesh::{MeshComponent, SDFShape, SDFColor};
pub use core::scene::Scene;
pub use core::time::{SimClock, LoopState};
pub use renderer::sdf_instance::{SDFInstance, SDFBuffer};
pub use input::queue::{InputEvent, InputQueue};
pub use bridge::protocol::ProtocolLayout;
pub use persist::{DocumentPath, DocumentStore, MemoryStore, StoreError};
pub use persist::firestore::FirestoreConfig;

#[cfg(feature = "vectors")]
pub use systems::vector::{VectorState, VectorVertex, VectorColor};
