use orrery_engine::{
    Game, GameConfig, EngineContext,
    InputEvent, InputQueue, SDFBuffer, ProtocolLayout,
};
use orrery_engine::bridge::protocol::{
    HEADER_FLOATS, HEADER_FRAME_COUNTER, HEADER_PROTOCOL_VERSION,
    HEADER_WORLD_WIDTH, HEADER_WORLD_HEIGHT,
    HEADER_MAX_SDF_INSTANCES, HEADER_SDF_INSTANCE_COUNT,
    HEADER_MAX_VECTOR_VERTICES, HEADER_VECTOR_VERTEX_COUNT,
    HEADER_MAX_EVENTS, HEADER_EVENT_COUNT, HEADER_SIM_TIME,
    PROTOCOL_VERSION,
};
use orrery_engine::systems::sdf_render::build_sdf_buffer;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game creates a `thread_local!` GameRunner and exports free
/// functions via `#[wasm_bindgen]`, because wasm-bindgen cannot export
/// generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    sdf_buffer: SDFBuffer,
    config: GameConfig,
    layout: ProtocolLayout,
    header: [f32; HEADER_FLOATS],
    initialized: bool,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let layout = ProtocolLayout::from_config(&config);
        let sdf_buffer = SDFBuffer::with_capacity(config.max_sdf_instances);

        Self {
            game,
            ctx: EngineContext::new(),
            input: InputQueue::new(),
            sdf_buffer,
            layout,
            config,
            header: [0.0; HEADER_FLOATS],
            initialized: false,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.config = self.game.config();
        self.layout = ProtocolLayout::from_config(&self.config);
        self.game.init(&mut self.ctx);
        build_sdf_buffer(self.ctx.scene.iter(), &mut self.sdf_buffer);
        self.initialized = true;
        self.write_header();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Deliver a host control edit to the game right away, between frames.
    pub fn control(&mut self, control: u32, value: f64) {
        if !self.initialized {
            log::warn!("control {control} changed before init; ignored");
            return;
        }
        self.game.control(&mut self.ctx, control, value);
    }

    /// Run one frame: advance the clock to the host timestamp, update the
    /// game once, rebuild the SDF buffer. One host frame is one tick.
    pub fn tick(&mut self, timestamp: f64) {
        if !self.initialized {
            return;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        self.ctx.clock.advance_to(timestamp);
        self.game.update(&mut self.ctx, &self.input);

        // Drain input after update
        self.input.drain();

        build_sdf_buffer(self.ctx.scene.iter(), &mut self.sdf_buffer);
        if self.sdf_buffer.instance_count() > self.layout.max_sdf_instances {
            log::warn!(
                "{} SDF instances exceed capacity {}; extra spheres are not drawn",
                self.sdf_buffer.instance_count(),
                self.layout.max_sdf_instances
            );
        }

        self.write_header();
    }

    /// Run `f` with the game and its engine context between frames.
    /// Used by async completions (save/load) to re-enter the game.
    pub fn with_game<R>(&mut self, f: impl FnOnce(&mut G, &mut EngineContext) -> R) -> R {
        f(&mut self.game, &mut self.ctx)
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn write_header(&mut self) {
        let sdf_count = self.sdf_instance_count();
        let vector_count = self.vector_vertex_count();
        let event_count = self.game_events_len();

        let h = &mut self.header;
        h[HEADER_FRAME_COUNTER] = self.ctx.clock.frames() as f32;
        h[HEADER_PROTOCOL_VERSION] = PROTOCOL_VERSION;
        h[HEADER_WORLD_WIDTH] = self.config.world_width;
        h[HEADER_WORLD_HEIGHT] = self.config.world_height;
        h[HEADER_MAX_SDF_INSTANCES] = self.layout.max_sdf_instances as f32;
        h[HEADER_SDF_INSTANCE_COUNT] = sdf_count as f32;
        h[HEADER_MAX_VECTOR_VERTICES] = self.layout.max_vector_vertices as f32;
        h[HEADER_VECTOR_VERTEX_COUNT] = vector_count as f32;
        h[HEADER_MAX_EVENTS] = self.layout.max_events as f32;
        h[HEADER_EVENT_COUNT] = event_count as f32;
        h[HEADER_SIM_TIME] = self.ctx.clock.elapsed() as f32;
    }

    // ---- Pointer accessors for SharedArrayBuffer reads ----

    pub fn header_ptr(&self) -> *const f32 {
        self.header.as_ptr()
    }

    pub fn header(&self) -> &[f32; HEADER_FLOATS] {
        &self.header
    }

    pub fn sdf_instances_ptr(&self) -> *const f32 {
        self.sdf_buffer.instances_ptr()
    }

    pub fn sdf_instance_count(&self) -> u32 {
        self.sdf_buffer.instance_count().min(self.layout.max_sdf_instances) as u32
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertices_ptr(&self) -> *const f32 {
        self.ctx.vectors.buffer_ptr()
    }

    #[cfg(feature = "vectors")]
    pub fn vector_vertex_count(&self) -> u32 {
        self.ctx.vectors.vertex_count().min(self.layout.max_vector_vertices) as u32
    }

    #[cfg(not(feature = "vectors"))]
    pub fn vector_vertex_count(&self) -> u32 {
        0
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len().min(self.layout.max_events) as u32
    }

    pub fn world_width(&self) -> f32 {
        self.config.world_width
    }

    pub fn world_height(&self) -> f32 {
        self.config.world_height
    }

    // ---- Capacity accessors (read by the host via wasm_bindgen exports) ----

    pub fn max_sdf_instances(&self) -> u32 {
        self.layout.max_sdf_instances as u32
    }

    pub fn max_vector_vertices(&self) -> u32 {
        self.layout.max_vector_vertices as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }
}
