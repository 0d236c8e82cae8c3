/// The three tunable parameter sets and their persisted snapshot form.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::bodies::{Body, BODY_COUNT};

pub const PARAM_KIND_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    RevolutionSpeed,
    OrbitRadius,
    Size,
}

/// Slider range enforced by the control panel only.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParamBounds {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl ParamKind {
    /// Folder order of the control panel.
    pub const ALL: [ParamKind; PARAM_KIND_COUNT] =
        [ParamKind::RevolutionSpeed, ParamKind::OrbitRadius, ParamKind::Size];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Radius and speed only exist for orbiting bodies.
    pub const fn applies_to(self, body: Body) -> bool {
        matches!(self, ParamKind::Size) || !body.is_central()
    }

    pub const fn bounds(self) -> ParamBounds {
        match self {
            ParamKind::RevolutionSpeed => ParamBounds { min: 0.1, max: 10.0, step: 0.1 },
            ParamKind::OrbitRadius => ParamBounds { min: 40.0, max: 200.0, step: 1.0 },
            ParamKind::Size => ParamBounds { min: 1.0, max: 15.0, step: 0.1 },
        }
    }

    pub const fn folder(self) -> &'static str {
        match self {
            ParamKind::RevolutionSpeed => "Revolution Speeds",
            ParamKind::OrbitRadius => "Orbit Radii",
            ParamKind::Size => "Planet Sizes",
        }
    }

    /// Field name of this set inside the persisted document.
    pub const fn document_key(self) -> &'static str {
        match self {
            ParamKind::RevolutionSpeed => "revolutionSpeeds",
            ParamKind::OrbitRadius => "orbitRadii",
            ParamKind::Size => "planetSizes",
        }
    }

    /// Startup values, indexed by [`Body::index`]. Zero marks "not applicable".
    const fn defaults(self) -> [f64; BODY_COUNT] {
        match self {
            //                               sun   mer  ven  ear  mar  jup   sat   ura   nep
            ParamKind::OrbitRadius => [0.0, 50.0, 60.0, 70.0, 80.0, 100.0, 120.0, 140.0, 160.0],
            ParamKind::RevolutionSpeed => [0.0, 4.0, 3.0, 2.0, 1.8, 1.2, 1.0, 0.7, 0.5],
            ParamKind::Size => [20.0, 2.0, 3.0, 4.0, 3.5, 10.0, 8.0, 6.0, 5.0],
        }
    }
}

/// Body → value for one kind. Keys are fixed: entries that do not apply
/// to a body (the sun's radius and speed) can be neither read nor written.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    kind: ParamKind,
    values: [f64; BODY_COUNT],
}

impl ParameterSet {
    pub fn with_defaults(kind: ParamKind) -> Self {
        Self {
            kind,
            values: kind.defaults(),
        }
    }

    pub fn kind(&self) -> ParamKind {
        self.kind
    }

    pub fn get(&self, body: Body) -> Option<f64> {
        self.kind.applies_to(body).then(|| self.values[body.index()])
    }

    /// Overwrite one entry. No bounds check; returns false for a key the
    /// set does not have.
    pub fn set(&mut self, body: Body, value: f64) -> bool {
        if !self.kind.applies_to(body) {
            return false;
        }
        self.values[body.index()] = value;
        true
    }

    /// Entries in body order.
    pub fn iter(&self) -> impl Iterator<Item = (Body, f64)> + '_ {
        Body::ALL
            .into_iter()
            .filter(move |b| self.kind.applies_to(*b))
            .map(move |b| (b, self.values[b.index()]))
    }
}

/// Outcome of merging a snapshot into the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Entries overwritten.
    pub applied: usize,
    /// `set/name` keys that match no entry and were skipped.
    pub ignored: Vec<String>,
}

/// All three parameter sets, co-indexed by [`Body`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStore {
    sets: [ParameterSet; PARAM_KIND_COUNT],
}

impl ParameterStore {
    pub fn new() -> Self {
        Self {
            sets: ParamKind::ALL.map(ParameterSet::with_defaults),
        }
    }

    pub fn set_of(&self, kind: ParamKind) -> &ParameterSet {
        &self.sets[kind.index()]
    }

    pub fn get(&self, kind: ParamKind, body: Body) -> Option<f64> {
        self.set_of(kind).get(body)
    }

    pub fn set(&mut self, kind: ParamKind, body: Body, value: f64) -> bool {
        self.sets[kind.index()].set(body, value)
    }

    pub fn orbit_radius(&self, body: Body) -> Option<f64> {
        self.get(ParamKind::OrbitRadius, body)
    }

    pub fn revolution_speed(&self, body: Body) -> Option<f64> {
        self.get(ParamKind::RevolutionSpeed, body)
    }

    /// Every body has a size, the sun included.
    pub fn size(&self, body: Body) -> f64 {
        self.sets[ParamKind::Size.index()].values[body.index()]
    }

    pub fn snapshot(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();
        for set in &self.sets {
            let entries = snapshot.entries_mut(set.kind());
            for (body, value) in set.iter() {
                entries.insert(body.name().to_string(), value);
            }
        }
        snapshot
    }

    /// Per-key overwrite from a snapshot. Keys absent from the snapshot keep
    /// their current value; unknown keys are skipped.
    pub fn merge(&mut self, snapshot: &Snapshot) -> MergeReport {
        let mut report = MergeReport::default();
        for kind in ParamKind::ALL {
            for (name, value) in snapshot.entries(kind) {
                let applied = Body::from_name(name)
                    .map(|body| self.set(kind, body, *value))
                    .unwrap_or(false);
                if applied {
                    report.applied += 1;
                } else {
                    report.ignored.push(format!("{}/{}", kind.document_key(), name));
                }
            }
        }
        report
    }
}

impl Default for ParameterStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Persisted form of the store: one name → value map per set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub orbit_radii: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub revolution_speeds: BTreeMap<String, f64>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub planet_sizes: BTreeMap<String, f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeMap<String, f64>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Snapshot {
    pub fn entries(&self, kind: ParamKind) -> &BTreeMap<String, f64> {
        match kind {
            ParamKind::OrbitRadius => &self.orbit_radii,
            ParamKind::RevolutionSpeed => &self.revolution_speeds,
            ParamKind::Size => &self.planet_sizes,
        }
    }

    fn entries_mut(&mut self, kind: ParamKind) -> &mut BTreeMap<String, f64> {
        match kind {
            ParamKind::OrbitRadius => &mut self.orbit_radii,
            ParamKind::RevolutionSpeed => &mut self.revolution_speeds,
            ParamKind::Size => &mut self.planet_sizes,
        }
    }
}
