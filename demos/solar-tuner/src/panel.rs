/// Binding between the parameter store and the host's control panel.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::bodies::{Body, BODY_COUNT};
use crate::params::{ParamKind, ParameterStore, PARAM_KIND_COUNT};

/// Opaque id of one control, assigned by the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ControllerHandle(pub u32);

/// Everything the host needs to build one slider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlSpec {
    pub folder: &'static str,
    pub property: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
}

impl ControlSpec {
    pub fn new(kind: ParamKind, body: Body, value: f64) -> Self {
        let bounds = kind.bounds();
        Self {
            folder: kind.folder(),
            property: body.name(),
            min: bounds.min,
            max: bounds.max,
            step: bounds.step,
            value,
        }
    }
}

/// Only orbiting bodies get controls. The sun's size is still part of the
/// store and of write-back geometry, but has no slider.
pub fn has_control(body: Body) -> bool {
    !body.is_central()
}

/// The host-side panel collaborator.
pub trait ControlPanel {
    fn add_control(&mut self, spec: ControlSpec) -> ControllerHandle;
    /// Refresh the displayed value of a control without firing an edit.
    fn set_value(&mut self, handle: ControllerHandle, value: f64);
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum BindingError {
    #[error("no control bound for {kind:?} of {body}")]
    MissingControl { kind: ParamKind, body: Body },
    #[error("unknown control handle {0:?}")]
    UnknownHandle(ControllerHandle),
}

/// Result of a user edit that reached the store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppliedEdit {
    pub kind: ParamKind,
    pub body: Body,
    pub value: f64,
}

impl AppliedEdit {
    /// Size edits change a sphere's geometry.
    pub fn needs_rebuild(&self) -> bool {
        self.kind == ParamKind::Size
    }
}

pub struct PanelBinding<P> {
    panel: P,
    handles: [[Option<ControllerHandle>; BODY_COUNT]; PARAM_KIND_COUNT],
    targets: HashMap<ControllerHandle, (ParamKind, Body)>,
}

impl<P: ControlPanel> PanelBinding<P> {
    /// Create one control per (kind, planet) pair, in folder order.
    pub fn bind(mut panel: P, store: &ParameterStore) -> Self {
        let mut handles = [[None; BODY_COUNT]; PARAM_KIND_COUNT];
        let mut targets = HashMap::new();
        for kind in ParamKind::ALL {
            for (body, value) in store.set_of(kind).iter().filter(|(b, _)| has_control(*b)) {
                let handle = panel.add_control(ControlSpec::new(kind, body, value));
                handles[kind.index()][body.index()] = Some(handle);
                targets.insert(handle, (kind, body));
            }
        }
        Self { panel, handles, targets }
    }

    pub fn handle(&self, kind: ParamKind, body: Body) -> Option<ControllerHandle> {
        self.handles[kind.index()][body.index()]
    }

    pub fn target(&self, handle: ControllerHandle) -> Option<(ParamKind, Body)> {
        self.targets.get(&handle).copied()
    }

    /// Write a control edit into the store. Values are taken as-is; the
    /// panel's slider range is the only bound.
    pub fn apply_edit(
        &self,
        store: &mut ParameterStore,
        handle: ControllerHandle,
        value: f64,
    ) -> Result<AppliedEdit, BindingError> {
        let (kind, body) = self
            .target(handle)
            .ok_or(BindingError::UnknownHandle(handle))?;
        store.set(kind, body, value);
        Ok(AppliedEdit { kind, body, value })
    }

    /// Push every current store value into its control. Returns the number
    /// of controls refreshed.
    pub fn write_back(&mut self, store: &ParameterStore) -> Result<usize, BindingError> {
        let mut refreshed = 0;
        for kind in ParamKind::ALL {
            for (body, value) in store.set_of(kind).iter().filter(|(b, _)| has_control(*b)) {
                let handle = self
                    .handle(kind, body)
                    .ok_or(BindingError::MissingControl { kind, body })?;
                self.panel.set_value(handle, value);
                refreshed += 1;
            }
        }
        Ok(refreshed)
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn panel_mut(&mut self) -> &mut P {
        &mut self.panel
    }
}

/// One control as exported to the host.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostControl {
    pub handle: ControllerHandle,
    #[serde(flatten)]
    pub spec: ControlSpec,
}

/// Panel kept inside the module: the host builds its sliders from
/// [`HostPanel::layout_json`] and receives value refreshes as game events.
#[derive(Debug, Default)]
pub struct HostPanel {
    controls: Vec<HostControl>,
    /// Latest refresh per control.
    pending: BTreeMap<ControllerHandle, f64>,
}

impl HostPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn controls(&self) -> &[HostControl] {
        &self.controls
    }

    pub fn value(&self, handle: ControllerHandle) -> Option<f64> {
        self.controls.get(handle.0 as usize).map(|c| c.spec.value)
    }

    pub fn layout_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.controls)
    }

    /// Value refreshes queued since the last call, one per control, in
    /// handle order.
    pub fn take_pending(&mut self) -> Vec<(ControllerHandle, f64)> {
        std::mem::take(&mut self.pending).into_iter().collect()
    }
}

impl ControlPanel for HostPanel {
    fn add_control(&mut self, spec: ControlSpec) -> ControllerHandle {
        let handle = ControllerHandle(self.controls.len() as u32);
        self.controls.push(HostControl { handle, spec });
        handle
    }

    fn set_value(&mut self, handle: ControllerHandle, value: f64) {
        match self.controls.get_mut(handle.0 as usize) {
            Some(control) => {
                control.spec.value = value;
                self.pending.insert(handle, value);
            }
            None => log::warn!("panel: set_value on unknown handle {}", handle.0),
        }
    }
}

/// Host edits are also recorded so the panel stays in step with what the
/// user sees. A refresh still pending for the same control is stale and
/// dropped.
pub(crate) fn record_edit(panel: &mut HostPanel, handle: ControllerHandle, value: f64) {
    if let Some(control) = panel.controls.get_mut(handle.0 as usize) {
        control.spec.value = value;
    }
    panel.pending.remove(&handle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn bound() -> (ParameterStore, PanelBinding<HostPanel>) {
        let store = ParameterStore::new();
        let binding = PanelBinding::bind(HostPanel::new(), &store);
        (store, binding)
    }

    #[test]
    fn one_control_per_applicable_pair() {
        let (_, binding) = bound();
        // 8 speeds + 8 radii + 8 sizes
        assert_eq!(binding.panel().controls().len(), 24);
        assert!(binding.handle(ParamKind::OrbitRadius, Body::Sun).is_none());
        assert!(binding.handle(ParamKind::Size, Body::Sun).is_none());
        assert!(binding.handle(ParamKind::Size, Body::Mercury).is_some());
    }

    #[test]
    fn controls_follow_folder_order_and_bounds() {
        let (_, binding) = bound();
        let controls = binding.panel().controls();
        assert_eq!(controls[0].spec.folder, "Revolution Speeds");
        assert_eq!(controls[0].spec.property, "mercury");
        assert_eq!(controls[8].spec.folder, "Orbit Radii");
        assert_eq!(controls[8].spec.min, 40.0);
        assert_eq!(controls[8].spec.max, 200.0);
        assert_eq!(controls[16].spec.folder, "Planet Sizes");
        assert_eq!(controls[16].spec.property, "mercury");
        assert_eq!(controls[16].spec.min, 1.0);
        assert_eq!(controls[16].spec.max, 15.0);
        assert_eq!(controls[16].spec.step, 0.1);
    }

    #[test]
    fn handle_table_is_bijective() {
        let (store, binding) = bound();
        for kind in ParamKind::ALL {
            for (body, _) in store.set_of(kind).iter().filter(|(b, _)| has_control(*b)) {
                let handle = binding.handle(kind, body).unwrap();
                assert_eq!(binding.target(handle), Some((kind, body)));
            }
        }
    }

    #[test]
    fn edit_updates_store_in_place() {
        let (mut store, binding) = bound();
        let handle = binding.handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        let edit = binding.apply_edit(&mut store, handle, 120.0).unwrap();
        assert_eq!(store.orbit_radius(Body::Earth), Some(120.0));
        assert!(!edit.needs_rebuild());

        let size = binding.handle(ParamKind::Size, Body::Mars).unwrap();
        assert!(binding.apply_edit(&mut store, size, 7.0).unwrap().needs_rebuild());
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let (mut store, binding) = bound();
        let before = store.clone();
        let err = binding.apply_edit(&mut store, ControllerHandle(999), 1.0).unwrap_err();
        assert_eq!(err, BindingError::UnknownHandle(ControllerHandle(999)));
        assert_eq!(store, before);
    }

    #[test]
    fn write_back_mirrors_store() {
        let (mut store, mut binding) = bound();
        store.set(ParamKind::RevolutionSpeed, Body::Venus, 9.5);
        assert_eq!(binding.write_back(&store).unwrap(), 24);
        let handle = binding.handle(ParamKind::RevolutionSpeed, Body::Venus).unwrap();
        assert_eq!(binding.panel().value(handle), Some(9.5));
        assert_eq!(binding.panel_mut().take_pending().len(), 24);
        assert!(binding.panel_mut().take_pending().is_empty());
    }

    #[test]
    fn write_back_is_idempotent() {
        let (mut store, mut binding) = bound();
        store.set(ParamKind::Size, Body::Neptune, 14.0);
        binding.write_back(&store).unwrap();
        let first = binding.panel().controls().to_vec();
        binding.write_back(&store).unwrap();
        assert_eq!(binding.panel().controls(), first.as_slice());
    }

    #[test]
    fn layout_json_lists_every_control() {
        let (_, binding) = bound();
        let json: Value = serde_json::from_str(&binding.panel().layout_json().unwrap()).unwrap();
        let controls = json.as_array().unwrap();
        assert_eq!(controls.len(), 24);
        assert_eq!(controls[2]["handle"], 2);
        assert_eq!(controls[2]["property"], "earth");
        assert_eq!(controls[2]["value"], 2.0);
        assert_eq!(controls[2]["folder"], "Revolution Speeds");
    }

    #[test]
    fn recorded_edit_does_not_queue_a_refresh() {
        let (_, mut binding) = bound();
        let handle = binding.handle(ParamKind::Size, Body::Earth).unwrap();
        record_edit(binding.panel_mut(), handle, 6.5);
        assert_eq!(binding.panel().value(handle), Some(6.5));
        assert!(binding.panel_mut().take_pending().is_empty());
    }

    #[test]
    fn every_slider_default_is_inside_its_range() {
        let (_, binding) = bound();
        for control in binding.panel().controls() {
            let spec = &control.spec;
            assert!(spec.value >= spec.min && spec.value <= spec.max, "{spec:?}");
        }
    }

    #[test]
    fn repeated_write_back_keeps_one_refresh_per_control() {
        let (mut store, mut binding) = bound();
        binding.write_back(&store).unwrap();
        store.set(ParamKind::OrbitRadius, Body::Earth, 90.0);
        binding.write_back(&store).unwrap();
        binding.write_back(&store).unwrap();

        let pending = binding.panel_mut().take_pending();
        assert_eq!(pending.len(), 24);
        let earth = binding.handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        assert_eq!(pending.iter().find(|(h, _)| *h == earth), Some(&(earth, 90.0)));
    }

    #[test]
    fn user_edit_drops_stale_refresh() {
        let (store, mut binding) = bound();
        binding.write_back(&store).unwrap();
        let handle = binding.handle(ParamKind::OrbitRadius, Body::Earth).unwrap();
        record_edit(binding.panel_mut(), handle, 150.0);

        let pending = binding.panel_mut().take_pending();
        assert_eq!(pending.len(), 23);
        assert!(pending.iter().all(|(h, _)| *h != handle));
        assert_eq!(binding.panel().value(handle), Some(150.0));
    }
}
