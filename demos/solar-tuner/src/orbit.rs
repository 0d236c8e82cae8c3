/// Circular orbits around a moving center. Pure math, no engine dependencies.
///
/// Uses f64 throughout; only convert to f32 when writing into the scene.

use glam::DVec3;
use std::f64::consts::TAU;

/// Radians per millisecond per unit of revolution speed.
pub const ORBIT_SPEED_MULTIPLIER: f64 = 0.001;

/// Orbit angle in radians at `time` milliseconds.
pub fn orbit_angle(time: f64, speed: f64) -> f64 {
    time * ORBIT_SPEED_MULTIPLIER * speed
}

/// Position of a body on its circular orbit around `center`.
///
/// The orbit lies in the X/Z plane; `body.y` is carried through unchanged.
/// A negative radius is accepted and puts the body half a turn ahead.
pub fn revolve(time: f64, speed: f64, orbit_radius: f64, center: DVec3, body: DVec3) -> DVec3 {
    let angle = orbit_angle(time, speed);
    DVec3::new(
        center.x + orbit_radius * angle.cos(),
        body.y,
        center.z + orbit_radius * angle.sin(),
    )
}

/// Milliseconds per full revolution, `None` when the body does not move.
pub fn orbital_period(speed: f64) -> Option<f64> {
    if speed == 0.0 || !speed.is_finite() {
        return None;
    }
    Some(TAU / (ORBIT_SPEED_MULTIPLIER * speed.abs()))
}
