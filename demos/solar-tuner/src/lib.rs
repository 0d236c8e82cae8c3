use wasm_bindgen::prelude::*;
use orrery_engine::*;

pub mod bodies;
pub mod game;
pub mod orbit;
pub mod panel;
pub mod params;
pub mod persistence;

use game::SolarTuner;
use persistence::Acknowledgment;

orrery_web::export_game!(SolarTuner, "solar-tuner", vectors);

/// Control specs as a JSON array of `{handle, folder, property, min, max, step, value}`.
#[wasm_bindgen]
pub fn control_layout() -> String {
    with_runner(|r| r.game().control_layout_json()).unwrap_or_else(|e| {
        log::error!("control layout: {e}");
        "[]".to_string()
    })
}

/// Exact current value of a control; NaN for an unknown handle.
#[wasm_bindgen]
pub fn control_value(handle: u32) -> f64 {
    with_runner(|r| r.game().control_value(handle)).unwrap_or(f64::NAN)
}

/// Text for an `EVENT_ACKNOWLEDGMENT` code; empty for unknown codes.
#[wasm_bindgen]
pub fn acknowledgment_message(code: u32) -> String {
    Acknowledgment::from_code(code)
        .map(Acknowledgment::message)
        .unwrap_or_default()
        .to_string()
}

#[cfg(target_arch = "wasm32")]
mod remote {
    use std::cell::RefCell;
    use std::rc::Rc;

    use orrery_engine::FirestoreConfig;
    use orrery_web::FirestoreStore;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use super::with_runner;
    use crate::persistence::{PersistError, PersistenceGateway};

    type Gateway = PersistenceGateway<FirestoreStore>;

    thread_local! {
        static GATEWAY: RefCell<Option<Rc<Gateway>>> = RefCell::new(None);
    }

    fn gateway() -> Option<Rc<Gateway>> {
        GATEWAY.with(|cell| cell.borrow().clone())
    }

    /// Accepts `{projectId, apiKey, database?, endpoint?}`. Returns false when
    /// the JSON is not a valid configuration.
    #[wasm_bindgen]
    pub fn persistence_configure(config_json: &str) -> bool {
        match FirestoreConfig::from_json(config_json) {
            Ok(config) => {
                log::info!("persistence: using project {}", config.project_id);
                let gw = Rc::new(PersistenceGateway::new(FirestoreStore::new(config)));
                GATEWAY.with(|cell| *cell.borrow_mut() = Some(gw));
                true
            }
            Err(e) => {
                log::error!("persistence: invalid configuration: {e}");
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn persistence_save() {
        let snapshot = with_runner(|r| r.game().snapshot());
        let Some(gw) = gateway() else {
            with_runner(|r| r.with_game(|g, _| g.finish_save(Err(PersistError::NotConfigured))));
            return;
        };
        spawn_local(async move {
            let result = gw.save(&snapshot).await;
            with_runner(|r| r.with_game(|g, _| g.finish_save(result)));
        });
    }

    #[wasm_bindgen]
    pub fn persistence_load() {
        let Some(gw) = gateway() else {
            with_runner(|r| r.with_game(|g, ctx| g.finish_load(ctx, Err(PersistError::NotConfigured))));
            return;
        };
        spawn_local(async move {
            let result = gw.load().await;
            with_runner(|r| r.with_game(|g, ctx| g.finish_load(ctx, result)));
        });
    }
}
