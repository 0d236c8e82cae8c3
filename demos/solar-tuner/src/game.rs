/// Solar Tuner: a sun and eight planets on circular orbits whose radii,
/// speeds and sizes are edited live from the host's control panel.
///
/// Orbits are evaluated in f64 and written to the scene as f32. The scene's
/// X/Z plane is the orbital plane; the renderer looks down Y.

use glam::{DVec3, Vec3};
use orrery_engine::*;

use crate::bodies::{self, Body, BODY_COUNT};
use crate::orbit;
use crate::panel::{self, BindingError, ControllerHandle, HostPanel, PanelBinding};
use crate::params::{ParameterStore, Snapshot};
use crate::persistence::{Acknowledgment, PersistError};

// ── World layout ─────────────────────────────────────────────────────

const WORLD_W: f32 = 800.0;
const WORLD_H: f32 = 450.0;

/// Sun spin per frame, in radians.
const SUN_SPIN_PER_FRAME: f32 = 0.005;

/// Rings span [radius - width, radius].
#[cfg(feature = "vectors")]
const ORBIT_RING_WIDTH: f32 = 0.1;
#[cfg(feature = "vectors")]
const ORBIT_RING_COLOR: VectorColor = VectorColor::new(1.0, 1.0, 1.0, 0.5);

// ── Game event kinds to the host ─────────────────────────────────────

/// `a` = control handle, `b` = value rounded to f32 for display. The exact
/// value is available from `control_value(handle)`; the host sets it on the
/// slider without reporting it back as an edit.
pub const EVENT_CONTROL_VALUE: f32 = 1.0;
/// `a` = acknowledgment code, see [`Acknowledgment::code`].
pub const EVENT_ACKNOWLEDGMENT: f32 = 2.0;

pub struct SolarTuner {
    params: ParameterStore,
    binding: PanelBinding<HostPanel>,
    entities: [Option<EntityId>; BODY_COUNT],
    acks: Vec<Acknowledgment>,
    center: Vec3,
}

impl SolarTuner {
    pub fn new() -> Self {
        let params = ParameterStore::new();
        let binding = PanelBinding::bind(HostPanel::new(), &params);
        Self {
            params,
            binding,
            entities: [None; BODY_COUNT],
            acks: Vec::new(),
            center: Vec3::new(WORLD_W * 0.5, 0.0, WORLD_H * 0.5),
        }
    }

    pub fn params(&self) -> &ParameterStore {
        &self.params
    }

    pub fn panel(&self) -> &HostPanel {
        self.binding.panel()
    }

    pub fn binding(&self) -> &PanelBinding<HostPanel> {
        &self.binding
    }

    pub fn entity(&self, body: Body) -> Option<EntityId> {
        self.entities[body.index()]
    }

    /// Taken before a save starts, so later edits do not leak into it.
    pub fn snapshot(&self) -> Snapshot {
        self.params.snapshot()
    }

    /// Exact current value behind a control.
    pub fn control_value(&self, handle: u32) -> Option<f64> {
        self.binding.panel().value(ControllerHandle(handle))
    }

    pub fn control_layout_json(&self) -> Result<String, serde_json::Error> {
        self.binding.panel().layout_json()
    }

    pub fn finish_save(&mut self, result: Result<(), PersistError>) -> Acknowledgment {
        let ack = match result {
            Ok(()) => Acknowledgment::Saved,
            Err(e) => {
                log::error!("save failed: {e}");
                Acknowledgment::SaveFailed
            }
        };
        self.acks.push(ack);
        ack
    }

    /// Merge a loaded snapshot into the live parameters, refresh the panel and
    /// rebuild sphere sizes. Failures leave the parameters untouched.
    pub fn finish_load(
        &mut self,
        ctx: &mut EngineContext,
        result: Result<Option<Snapshot>, PersistError>,
    ) -> Acknowledgment {
        let ack = match result {
            Ok(Some(snapshot)) => {
                let report = self.params.merge(&snapshot);
                for key in &report.ignored {
                    log::warn!("load: ignoring unknown key {key}");
                }
                if let Err(e) = self.write_back(ctx) {
                    log::error!("load: panel out of sync: {e}");
                }
                log::info!("load: applied {} values", report.applied);
                Acknowledgment::Loaded
            }
            Ok(None) => Acknowledgment::NotFound,
            Err(e) => {
                log::error!("load failed: {e}");
                Acknowledgment::LoadFailed
            }
        };
        self.acks.push(ack);
        ack
    }

    /// Push every parameter into its control and resize every sphere.
    pub fn write_back(&mut self, ctx: &mut EngineContext) -> Result<(), BindingError> {
        self.binding.write_back(&self.params)?;
        for body in Body::ALL {
            self.rebuild_geometry(ctx, body);
        }
        Ok(())
    }

    fn apply_control(&mut self, ctx: &mut EngineContext, handle: ControllerHandle, value: f64) {
        match self.binding.apply_edit(&mut self.params, handle, value) {
            Ok(edit) => {
                log::debug!("control: {:?} {} = {}", edit.kind, edit.body, edit.value);
                panel::record_edit(self.binding.panel_mut(), handle, value);
                if edit.needs_rebuild() {
                    self.rebuild_geometry(ctx, edit.body);
                }
            }
            Err(e) => log::warn!("control: {e}"),
        }
    }

    fn rebuild_geometry(&self, ctx: &mut EngineContext, body: Body) {
        let size = self.params.size(body) as f32;
        if let Some(mesh) = self
            .entity(body)
            .and_then(|id| ctx.scene.get_mut(id))
            .and_then(|e| e.mesh.as_mut())
        {
            mesh.set_radius(size);
        }
    }

    fn recenter(&mut self, ctx: &mut EngineContext, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        self.center = Vec3::new(width * 0.5, 0.0, height * 0.5);
        if let Some(sun) = self.entity(Body::Sun).and_then(|id| ctx.scene.get_mut(id)) {
            sun.pos = self.center;
        }
    }

    /// The sun's current position, or the world center before it exists.
    fn orbit_center(&self, ctx: &EngineContext) -> DVec3 {
        self.entity(Body::Sun)
            .and_then(|id| ctx.scene.get(id))
            .map_or(self.center, |sun| sun.pos)
            .as_dvec3()
    }

    fn revolve_planets(&self, ctx: &mut EngineContext) {
        let time = ctx.clock.elapsed();
        let center = self.orbit_center(ctx);
        for body in Body::PLANETS {
            let (Some(radius), Some(speed)) =
                (self.params.orbit_radius(body), self.params.revolution_speed(body))
            else {
                continue;
            };
            if let Some(e) = self.entity(body).and_then(|id| ctx.scene.get_mut(id)) {
                e.pos = orbit::revolve(time, speed, radius, center, e.pos.as_dvec3()).as_vec3();
            }
        }
    }

    #[cfg(feature = "vectors")]
    fn draw_orbits(&self, ctx: &mut EngineContext) {
        let c = self.orbit_center(ctx);
        let center = glam::Vec2::new(c.x as f32, c.z as f32);
        for body in Body::PLANETS {
            if let Some(radius) = self.params.orbit_radius(body) {
                let r = radius as f32;
                ctx.vectors.stroke_ring(center, r - ORBIT_RING_WIDTH, r, ORBIT_RING_COLOR);
            }
        }
    }

    /// Acknowledgments go first so a full event buffer never hides them.
    fn flush_host_events(&mut self, ctx: &mut EngineContext) {
        for ack in self.acks.drain(..) {
            ctx.emit_event(GameEvent::new(EVENT_ACKNOWLEDGMENT, ack.code() as f32, 0.0, 0.0));
        }
        for (handle, value) in self.binding.panel_mut().take_pending() {
            ctx.emit_event(GameEvent::new(EVENT_CONTROL_VALUE, handle.0 as f32, value as f32, 0.0));
        }
    }

    fn spawn_body(&mut self, ctx: &mut EngineContext, body: Body, pos: Vec3) {
        let id = ctx.next_id();
        let look = bodies::visuals(body);
        let (r, g, b) = look.color;
        let mesh = MeshComponent::sphere(self.params.size(body) as f32, SDFColor::new(r, g, b))
            .with_shininess(look.shininess)
            .with_emissive(look.emissive);
        ctx.scene.spawn(
            Entity::new(id)
                .with_tag(body.name())
                .with_pos(pos)
                .with_mesh(mesh),
        );
        self.entities[body.index()] = Some(id);
    }
}

impl Default for SolarTuner {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for SolarTuner {
    fn config(&self) -> GameConfig {
        GameConfig {
            world_width: WORLD_W,
            world_height: WORLD_H,
            max_sdf_instances: 16,
            max_vector_vertices: 32768,
            max_events: 64,
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.spawn_body(ctx, Body::Sun, self.center);
        let center = self.center.as_dvec3();
        for body in Body::PLANETS {
            let radius = self.params.orbit_radius(body).unwrap_or_default();
            let speed = self.params.revolution_speed(body).unwrap_or_default();
            let pos = orbit::revolve(0.0, speed, radius, center, DVec3::ZERO).as_vec3();
            self.spawn_body(ctx, body, pos);
        }
        log::info!(
            "solar tuner: {} bodies, {} controls",
            ctx.scene.len(),
            self.binding.panel().controls().len()
        );
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        for event in input.iter() {
            match *event {
                InputEvent::Resize { width, height } => self.recenter(ctx, width, height),
            }
        }

        if let Some(sun) = self.entity(Body::Sun).and_then(|id| ctx.scene.get_mut(id)) {
            sun.rotation += SUN_SPIN_PER_FRAME;
        }

        self.revolve_planets(ctx);

        #[cfg(feature = "vectors")]
        self.draw_orbits(ctx);

        self.flush_host_events(ctx);
    }

    fn control(&mut self, ctx: &mut EngineContext, control: u32, value: f64) {
        self.apply_control(ctx, ControllerHandle(control), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use orrery_engine::MemoryStore;

    use crate::params::ParamKind;
    use crate::persistence::{snapshot_path, PersistenceGateway};
    use orrery_web::GameRunner;

    fn started() -> (SolarTuner, EngineContext) {
        let mut game = SolarTuner::new();
        let mut ctx = EngineContext::new();
        game.init(&mut ctx);
        (game, ctx)
    }

    fn frame(game: &mut SolarTuner, ctx: &mut EngineContext, timestamp: f64, input: &InputQueue) {
        ctx.clear_frame_data();
        ctx.clock.advance_to(timestamp);
        game.update(ctx, input);
    }

    fn pos(game: &SolarTuner, ctx: &EngineContext, body: Body) -> Vec3 {
        ctx.scene.get(game.entity(body).unwrap()).unwrap().pos
    }

    fn radius(game: &SolarTuner, ctx: &EngineContext, body: Body) -> f32 {
        let e = ctx.scene.get(game.entity(body).unwrap()).unwrap();
        e.mesh.as_ref().unwrap().radius()
    }

    fn events_of(ctx: &EngineContext, kind: f32) -> Vec<GameEvent> {
        ctx.events.iter().copied().filter(|e| e.kind == kind).collect()
    }

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn init_spawns_every_body_at_default_size() {
        let (game, ctx) = started();
        assert_eq!(ctx.scene.len(), BODY_COUNT);
        assert_eq!(radius(&game, &ctx, Body::Sun), 20.0);
        assert_eq!(radius(&game, &ctx, Body::Jupiter), 10.0);
        assert_eq!(ctx.scene.find_by_tag("neptune").map(|e| e.id), game.entity(Body::Neptune));
    }

    #[test]
    fn earth_starts_on_the_positive_x_axis() {
        let (mut game, mut ctx) = started();
        frame(&mut game, &mut ctx, 0.0, &InputQueue::new());
        let sun = pos(&game, &ctx, Body::Sun);
        assert!(close(pos(&game, &ctx, Body::Earth), sun + Vec3::new(70.0, 0.0, 0.0)));
    }

    #[test]
    fn sun_spins_every_frame() {
        let (mut game, mut ctx) = started();
        let input = InputQueue::new();
        frame(&mut game, &mut ctx, 16.0, &input);
        frame(&mut game, &mut ctx, 32.0, &input);
        let sun = ctx.scene.get(game.entity(Body::Sun).unwrap()).unwrap();
        assert!((sun.rotation - 0.01).abs() < 1e-6);
    }

    #[test]
    fn radius_edit_is_live_immediately() {
        let (mut game, mut ctx) = started();
        let handle = game.binding().handle(ParamKind::OrbitRadius, Body::Mars).unwrap();
        game.control(&mut ctx, handle.0, 150.0);
        assert_eq!(game.params().orbit_radius(Body::Mars), Some(150.0));
        frame(&mut game, &mut ctx, 5000.0, &InputQueue::new());

        let sun = pos(&game, &ctx, Body::Sun);
        let mars = pos(&game, &ctx, Body::Mars);
        assert!(((mars - sun).length() - 150.0).abs() < 1e-2);
        assert_eq!(game.params().orbit_radius(Body::Mars), Some(150.0));
        // A user edit is not echoed back to the panel.
        assert!(events_of(&ctx, EVENT_CONTROL_VALUE).is_empty());
        assert_eq!(game.panel().value(handle), Some(150.0));
    }

    #[test]
    fn size_edit_rebuilds_the_sphere() {
        let (mut game, mut ctx) = started();
        let handle = game.binding().handle(ParamKind::Size, Body::Jupiter).unwrap();
        game.control(&mut ctx, handle.0, 12.5);
        assert_eq!(radius(&game, &ctx, Body::Jupiter), 12.5);
        assert_eq!(radius(&game, &ctx, Body::Earth), 4.0);
    }

    #[test]
    fn unknown_control_is_ignored() {
        let (mut game, mut ctx) = started();
        let before = game.params().clone();
        game.control(&mut ctx, 4096, 1.0);
        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());
        assert_eq!(game.params(), &before);
    }

    #[test]
    fn resize_moves_the_orbit_center() {
        let (mut game, mut ctx) = started();
        let mut input = InputQueue::new();
        input.push(InputEvent::Resize { width: 1000.0, height: 600.0 });
        frame(&mut game, &mut ctx, 1234.0, &input);

        let sun = pos(&game, &ctx, Body::Sun);
        assert_eq!(sun, Vec3::new(500.0, 0.0, 300.0));
        for body in Body::PLANETS {
            let r = game.params().orbit_radius(body).unwrap() as f32;
            assert!(((pos(&game, &ctx, body) - sun).length() - r).abs() < 1e-2, "{body}");
        }
    }

    #[cfg(feature = "vectors")]
    #[test]
    fn one_ring_per_planet_every_frame() {
        let (mut game, mut ctx) = started();
        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());
        let first = ctx.vectors.vertex_count();
        assert!(first > 0);
        frame(&mut game, &mut ctx, 32.0, &InputQueue::new());
        assert_eq!(ctx.vectors.vertex_count(), first);
    }

    #[test]
    fn load_merges_writes_back_and_acknowledges() {
        let (mut game, mut ctx) = started();
        let store = MemoryStore::new();
        store.insert(
            crate::persistence::snapshot_path(),
            serde_json::json!({ "orbitRadii": { "earth": 90 }, "planetSizes": { "earth": 9 } }),
        );
        let gateway = PersistenceGateway::new(store);

        let ack = game.finish_load(&mut ctx, block_on(gateway.load()));
        assert_eq!(ack, Acknowledgment::Loaded);
        assert_eq!(game.params().orbit_radius(Body::Earth), Some(90.0));
        assert_eq!(game.params().orbit_radius(Body::Mars), Some(80.0));
        assert_eq!(radius(&game, &ctx, Body::Earth), 9.0);

        let handle = game.binding().handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        assert_eq!(game.panel().value(handle), Some(90.0));

        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());
        assert_eq!(events_of(&ctx, EVENT_CONTROL_VALUE).len(), 24);
        let acks = events_of(&ctx, EVENT_ACKNOWLEDGMENT);
        assert_eq!(acks.len(), 1);
        assert_eq!(acks[0].a, Acknowledgment::Loaded.code() as f32);

        let sun = pos(&game, &ctx, Body::Sun);
        assert!(((pos(&game, &ctx, Body::Earth) - sun).length() - 90.0).abs() < 1e-2);
    }

    #[test]
    fn missing_document_changes_nothing() {
        let (mut game, mut ctx) = started();
        let before = game.params().clone();
        let gateway = PersistenceGateway::new(MemoryStore::new());
        let ack = game.finish_load(&mut ctx, block_on(gateway.load()));
        assert_eq!(ack, Acknowledgment::NotFound);
        assert_eq!(game.params(), &before);
    }

    #[test]
    fn failed_load_changes_nothing() {
        let (mut game, mut ctx) = started();
        let before = game.params().clone();
        let store = MemoryStore::new();
        store.set_fail_reads(true);
        let gateway = PersistenceGateway::new(store);

        let ack = game.finish_load(&mut ctx, block_on(gateway.load()));
        assert_eq!(ack, Acknowledgment::LoadFailed);
        assert_eq!(game.params(), &before);

        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());
        assert!(events_of(&ctx, EVENT_CONTROL_VALUE).is_empty());
        assert_eq!(events_of(&ctx, EVENT_ACKNOWLEDGMENT).len(), 1);
    }

    #[test]
    fn failed_save_keeps_parameters_and_reports() {
        let (mut game, mut ctx) = started();
        let store = MemoryStore::new();
        store.set_fail_writes(true);
        let gateway = PersistenceGateway::new(store);

        let before = game.params().clone();
        let ack = game.finish_save(block_on(gateway.save(&game.snapshot())));
        assert_eq!(ack, Acknowledgment::SaveFailed);
        assert_eq!(game.params(), &before);
        assert!(gateway.store().is_empty());

        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());
        let acks = events_of(&ctx, EVENT_ACKNOWLEDGMENT);
        assert_eq!(acks[0].a, Acknowledgment::SaveFailed.code() as f32);
    }

    #[test]
    fn saved_session_restores_into_a_fresh_one() {
        let backend = MemoryStore::new();

        let (mut first, mut ctx) = started();
        let handle = first.binding().handle(ParamKind::RevolutionSpeed, Body::Saturn).unwrap();
        first.control(&mut ctx, handle.0, 6.3);
        let saver = PersistenceGateway::new(backend.clone());
        assert_eq!(
            first.finish_save(block_on(saver.save(&first.snapshot()))),
            Acknowledgment::Saved
        );

        let (mut second, mut ctx2) = started();
        let loader = PersistenceGateway::new(backend);
        second.finish_load(&mut ctx2, block_on(loader.load()));
        assert_eq!(second.params(), first.params());
    }

    #[test]
    fn control_layout_is_json() {
        let game = SolarTuner::new();
        let layout: serde_json::Value =
            serde_json::from_str(&game.control_layout_json().unwrap()).unwrap();
        assert_eq!(layout.as_array().unwrap().len(), 24);
    }

    fn shown_value(ctx: &EngineContext, handle: ControllerHandle) -> Vec<f32> {
        events_of(ctx, EVENT_CONTROL_VALUE)
            .iter()
            .filter(|e| e.a == handle.0 as f32)
            .map(|e| e.b)
            .collect()
    }

    fn earth_at_90() -> PersistenceGateway<MemoryStore> {
        let store = MemoryStore::new();
        store.insert(snapshot_path(), serde_json::json!({ "orbitRadii": { "earth": 90 } }));
        PersistenceGateway::new(store)
    }

    #[test]
    fn edit_then_load_before_next_frame_shows_loaded_value() {
        let (mut game, mut ctx) = started();
        let handle = game.binding().handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        game.control(&mut ctx, handle.0, 150.0);
        game.finish_load(&mut ctx, block_on(earth_at_90().load()));
        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());

        assert_eq!(game.params().orbit_radius(Body::Earth), Some(90.0));
        assert_eq!(game.control_value(handle.0), Some(90.0));
        assert_eq!(shown_value(&ctx, handle), vec![90.0]);
    }

    #[test]
    fn load_then_edit_before_next_frame_keeps_the_edit() {
        let (mut game, mut ctx) = started();
        let handle = game.binding().handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        game.finish_load(&mut ctx, block_on(earth_at_90().load()));
        game.control(&mut ctx, handle.0, 150.0);
        frame(&mut game, &mut ctx, 16.0, &InputQueue::new());

        assert_eq!(game.params().orbit_radius(Body::Earth), Some(150.0));
        assert_eq!(game.control_value(handle.0), Some(150.0));
        assert!(shown_value(&ctx, handle).is_empty());
        assert_eq!(events_of(&ctx, EVENT_CONTROL_VALUE).len(), 23);
    }

    #[test]
    fn save_right_after_an_edit_includes_it() {
        let (mut game, mut ctx) = started();
        let handle = game.binding().handle(ParamKind::RevolutionSpeed, Body::Venus).unwrap();
        game.control(&mut ctx, handle.0, 7.7);
        assert_eq!(game.snapshot().revolution_speeds["venus"], 7.7);
    }

    #[test]
    fn loaded_sun_size_rebuilds_without_a_control() {
        let (mut game, mut ctx) = started();
        let store = MemoryStore::new();
        store.insert(snapshot_path(), serde_json::json!({ "planetSizes": { "sun": 12 } }));
        let ack = game.finish_load(&mut ctx, block_on(PersistenceGateway::new(store).load()));
        assert_eq!(ack, Acknowledgment::Loaded);
        assert_eq!(radius(&game, &ctx, Body::Sun), 12.0);
        assert!(game.binding().handle(ParamKind::Size, Body::Sun).is_none());
    }

    #[test]
    fn control_value_is_exact() {
        let (mut game, mut ctx) = started();
        let store = MemoryStore::new();
        store.insert(snapshot_path(), serde_json::json!({ "revolutionSpeeds": { "mars": 1.3 } }));
        game.finish_load(&mut ctx, block_on(PersistenceGateway::new(store).load()));
        let handle = game.binding().handle(ParamKind::RevolutionSpeed, Body::Mars).unwrap();
        assert_eq!(game.control_value(handle.0), Some(1.3));
        assert_eq!(game.control_value(9999), None);
    }

    #[test]
    fn burst_of_loads_keeps_every_acknowledgment_visible() {
        let mut runner = GameRunner::new(SolarTuner::new());
        runner.init();
        let gateway = earth_at_90();
        for _ in 0..3 {
            let result = block_on(gateway.load());
            runner.with_game(|g, ctx| g.finish_load(ctx, result));
        }
        runner.tick(16.0);

        let visible = &runner.context().events[..runner.game_events_len() as usize];
        assert_eq!(visible.len(), runner.context().events.len());
        let acks = visible.iter().filter(|e| e.kind == EVENT_ACKNOWLEDGMENT).count();
        let values = visible.iter().filter(|e| e.kind == EVENT_CONTROL_VALUE).count();
        assert_eq!(acks, 3);
        assert_eq!(values, 24);
        assert_eq!(visible[0].kind, EVENT_ACKNOWLEDGMENT);
    }

    #[test]
    fn runner_control_reaches_the_store_before_the_next_tick() {
        let mut runner = GameRunner::new(SolarTuner::new());
        runner.init();
        let handle = runner
            .game()
            .binding()
            .handle(ParamKind::OrbitRadius, Body::Earth)
            .unwrap();
        runner.control(handle.0, 111.0);
        assert_eq!(runner.game().snapshot().orbit_radii["earth"], 111.0);
    }
}
