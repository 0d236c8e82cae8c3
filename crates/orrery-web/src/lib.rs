pub mod runner;
#[cfg(target_arch = "wasm32")]
pub mod firestore;

pub use runner::GameRunner;
#[cfg(target_arch = "wasm32")]
pub use firestore::FirestoreStore;

/// Generate all `#[wasm_bindgen]` exports for a game.
///
/// Generates:
/// - `thread_local!` storage for the GameRunner
/// - a `with_runner()` helper (also used by game-specific exports such as
///   async save/load completions)
/// - wasm-bindgen exports for init, per-frame tick, host input and the
///   SharedArrayBuffer data accessors
///
/// # Usage
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use orrery_engine::*;
///
/// mod game;
/// use game::MyOrrery;
///
/// orrery_web::export_game!(MyOrrery, "my-orrery");
/// ```
///
/// # Arguments
///
/// - `$game_type`: The game struct type that implements `orrery_engine::Game`
/// - `$game_name`: A string literal used in the initialization log message
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R) -> R {
            RUNNER.with(|cell| {
                let mut borrow = cell.borrow_mut();
                let runner = borrow.as_mut().expect("Game not initialized. Call game_init() first.");
                f(runner)
            })
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let game = <$game_type>::new();
            let runner = $crate::GameRunner::new(game);

            RUNNER.with(|cell| {
                *cell.borrow_mut() = Some(runner);
            });

            with_runner(|r| r.init());
            log::info!("{}: initialized", $game_name);
        }

        /// `timestamp` is the value passed to the host's requestAnimationFrame callback.
        #[wasm_bindgen]
        pub fn game_tick(timestamp: f64) {
            with_runner(|r| r.tick(timestamp));
        }

        #[wasm_bindgen]
        pub fn game_control(control: u32, value: f64) {
            with_runner(|r| r.control(control, value));
        }

        #[wasm_bindgen]
        pub fn game_resize(width: f32, height: f32) {
            with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
        }

        // ---- Data accessors ----

        #[wasm_bindgen]
        pub fn get_header_ptr() -> *const f32 {
            with_runner(|r| r.header_ptr())
        }

        #[wasm_bindgen]
        pub fn get_sdf_instances_ptr() -> *const f32 {
            with_runner(|r| r.sdf_instances_ptr())
        }

        #[wasm_bindgen]
        pub fn get_sdf_instance_count() -> u32 {
            with_runner(|r| r.sdf_instance_count())
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(|r| r.game_events_ptr())
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(|r| r.game_events_len())
        }

        #[wasm_bindgen]
        pub fn get_world_width() -> f32 {
            with_runner(|r| r.world_width())
        }

        #[wasm_bindgen]
        pub fn get_world_height() -> f32 {
            with_runner(|r| r.world_height())
        }

        // ---- Capacity accessors ----

        #[wasm_bindgen]
        pub fn get_max_sdf_instances() -> u32 {
            with_runner(|r| r.max_sdf_instances())
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(|r| r.max_events())
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(|r| r.buffer_total_floats())
        }
    };

    // Variant with vectors feature
    ($game_type:ty, $game_name:literal, vectors) => {
        $crate::export_game!($game_type, $game_name);

        // ---- Vector accessors (only when vectors feature is enabled) ----

        #[wasm_bindgen]
        pub fn get_vector_vertices_ptr() -> *const f32 {
            with_runner(|r| r.vector_vertices_ptr())
        }

        #[wasm_bindgen]
        pub fn get_vector_vertex_count() -> u32 {
            with_runner(|r| r.vector_vertex_count())
        }

        #[wasm_bindgen]
        pub fn get_max_vector_vertices() -> u32 {
            with_runner(|r| r.max_vector_vertices())
        }
    };
}
