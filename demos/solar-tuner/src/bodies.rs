/// The simulated bodies and their fixed visual properties.
///
/// Every per-body table in the crate is an array indexed by [`Body::index`],
/// so adding a body is a compile error until every table is extended.

use std::fmt;

pub const BODY_COUNT: usize = 9;
pub const PLANET_COUNT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Earth,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
}

impl Body {
    pub const ALL: [Body; BODY_COUNT] = [
        Body::Sun,
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    /// Orbiting bodies, innermost first.
    pub const PLANETS: [Body; PLANET_COUNT] = [
        Body::Mercury,
        Body::Venus,
        Body::Earth,
        Body::Mars,
        Body::Jupiter,
        Body::Saturn,
        Body::Uranus,
        Body::Neptune,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    /// Lowercase name used as the document key and scene tag.
    pub const fn name(self) -> &'static str {
        match self {
            Body::Sun => "sun",
            Body::Mercury => "mercury",
            Body::Venus => "venus",
            Body::Earth => "earth",
            Body::Mars => "mars",
            Body::Jupiter => "jupiter",
            Body::Saturn => "saturn",
            Body::Uranus => "uranus",
            Body::Neptune => "neptune",
        }
    }

    pub fn from_name(name: &str) -> Option<Body> {
        Body::ALL.into_iter().find(|b| b.name() == name)
    }

    /// The sun is the orbit center; it has a size but no orbit.
    pub const fn is_central(self) -> bool {
        matches!(self, Body::Sun)
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// SDF material for one body. Flat colors stand in for texture maps.
pub struct BodyVisuals {
    pub color: (f32, f32, f32),
    pub emissive: f32,
    pub shininess: f32,
}

/// Visual properties per body (indexed by [`Body::index`]).
pub const VISUALS: [BodyVisuals; BODY_COUNT] = [
    BodyVisuals { color: (1.00, 0.90, 0.50), emissive: 3.5, shininess: 8.0 },  // Sun
    BodyVisuals { color: (0.60, 0.55, 0.50), emissive: 0.0, shininess: 16.0 }, // Mercury
    BodyVisuals { color: (0.90, 0.75, 0.40), emissive: 0.0, shininess: 16.0 }, // Venus
    BodyVisuals { color: (0.20, 0.40, 0.80), emissive: 0.0, shininess: 32.0 }, // Earth
    BodyVisuals { color: (0.80, 0.30, 0.15), emissive: 0.0, shininess: 16.0 }, // Mars
    BodyVisuals { color: (0.80, 0.70, 0.50), emissive: 0.0, shininess: 16.0 }, // Jupiter
    BodyVisuals { color: (0.85, 0.75, 0.50), emissive: 0.0, shininess: 16.0 }, // Saturn
    BodyVisuals { color: (0.50, 0.75, 0.85), emissive: 0.0, shininess: 16.0 }, // Uranus
    BodyVisuals { color: (0.25, 0.35, 0.80), emissive: 0.0, shininess: 16.0 }, // Neptune
];

pub fn visuals(body: Body) -> &'static BodyVisuals {
    &VISUALS[body.index()]
}
