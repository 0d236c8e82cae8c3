use crate::api::types::{EntityId, GameEvent};
use crate::core::scene::Scene;
use crate::core::time::SimClock;
use crate::input::queue::InputQueue;
#[cfg(feature = "vectors")]
use crate::systems::vector::VectorState;

/// Configuration for the engine, provided by the game.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// World width in game units.
    pub world_width: f32,
    /// World height in game units.
    pub world_height: f32,
    /// Maximum number of SDF sphere instances (default: 128).
    pub max_sdf_instances: usize,
    /// Maximum number of tessellated vector vertices (default: 16384).
    pub max_vector_vertices: usize,
    /// Maximum number of game events per frame (default: 32).
    pub max_events: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            world_width: 800.0,
            world_height: 600.0,
            max_sdf_instances: 128,
            max_vector_vertices: 16384,
            max_events: 32,
        }
    }
}

/// The core contract every game must fulfill.
pub trait Game {
    /// Return engine configuration. Called once before init.
    fn config(&self) -> GameConfig {
        GameConfig::default()
    }

    /// Setup initial state, spawn entities, bind host controls.
    fn init(&mut self, ctx: &mut EngineContext);

    /// The per-frame tick. `ctx.clock` already holds this frame's timestamp.
    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue);

    /// A host control changed to `value`. Called between frames, as soon as
    /// the host reports the edit.
    fn control(&mut self, _ctx: &mut EngineContext, _control: u32, _value: f64) {}
}

/// Mutable access to engine state, passed to Game::init and Game::update.
pub struct EngineContext {
    pub scene: Scene,
    pub events: Vec<GameEvent>,
    pub clock: SimClock,
    #[cfg(feature = "vectors")]
    pub vectors: VectorState,
    next_id: u32,
}

impl EngineContext {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
            events: Vec::new(),
            clock: SimClock::new(),
            #[cfg(feature = "vectors")]
            vectors: VectorState::new(),
            next_id: 1,
        }
    }

    /// Generate the next unique entity ID.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Emit a game event to be forwarded to the host page.
    pub fn emit_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Clear per-frame transient data (events, vector geometry).
    pub fn clear_frame_data(&mut self) {
        self.events.clear();
        #[cfg(feature = "vectors")]
        self.vectors.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}
