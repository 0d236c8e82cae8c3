/// SharedArrayBuffer layout.
/// Must stay in sync with the host's `protocol.ts`.
///
/// Layout (all values in f32 / 4 bytes):
/// ```text
/// [Header: 12 floats]
/// [SDF instances: max_sdf_instances × 12 floats]
/// [Vector vertices: max_vector_vertices × 6 floats]
/// [Events: max_events × 4 floats]
/// ```
///
/// Capacities are written once into the header at init.
/// The host reads them from the header to compute offsets dynamically.

use crate::api::game::GameConfig;

/// Number of floats in the header section.
pub const HEADER_FLOATS: usize = 12;

/// Header field indices.
pub const HEADER_LOCK: usize = 0;
pub const HEADER_FRAME_COUNTER: usize = 1;
pub const HEADER_PROTOCOL_VERSION: usize = 2;
pub const HEADER_WORLD_WIDTH: usize = 3;
pub const HEADER_WORLD_HEIGHT: usize = 4;
pub const HEADER_MAX_SDF_INSTANCES: usize = 5;
pub const HEADER_SDF_INSTANCE_COUNT: usize = 6;
pub const HEADER_MAX_VECTOR_VERTICES: usize = 7;
pub const HEADER_VECTOR_VERTEX_COUNT: usize = 8;
pub const HEADER_MAX_EVENTS: usize = 9;
pub const HEADER_EVENT_COUNT: usize = 10;
pub const HEADER_SIM_TIME: usize = 11;

/// Protocol version written into the header.
pub const PROTOCOL_VERSION: f32 = 1.0;

/// Floats per SDF instance: x, y, radius, rotation, r, g, b, shininess, emissive, pad×3.
pub const SDF_INSTANCE_FLOATS: usize = 12;

/// Floats per vector vertex: x, y, r, g, b, a (wire format, never changes).
pub const VECTOR_VERTEX_FLOATS: usize = 6;

/// Floats per game event: kind, a, b, c (wire format, never changes).
pub const EVENT_FLOATS: usize = 4;

/// Runtime-computed buffer layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolLayout {
    pub max_sdf_instances: usize,
    pub max_vector_vertices: usize,
    pub max_events: usize,

    /// Section sizes in floats.
    pub sdf_data_floats: usize,
    pub vector_data_floats: usize,
    pub event_data_floats: usize,

    /// Section offsets in floats.
    pub sdf_data_offset: usize,
    pub vector_data_offset: usize,
    pub event_data_offset: usize,

    /// Total buffer size in floats.
    pub buffer_total_floats: usize,
    /// Total buffer size in bytes.
    pub buffer_total_bytes: usize,
}

impl ProtocolLayout {
    /// Compute layout from raw capacity values.
    pub fn new(max_sdf_instances: usize, max_vector_vertices: usize, max_events: usize) -> Self {
        let sdf_data_floats = max_sdf_instances * SDF_INSTANCE_FLOATS;
        let vector_data_floats = max_vector_vertices * VECTOR_VERTEX_FLOATS;
        let event_data_floats = max_events * EVENT_FLOATS;

        let sdf_data_offset = HEADER_FLOATS;
        let vector_data_offset = sdf_data_offset + sdf_data_floats;
        let event_data_offset = vector_data_offset + vector_data_floats;

        let buffer_total_floats = event_data_offset + event_data_floats;

        Self {
            max_sdf_instances,
            max_vector_vertices,
            max_events,
            sdf_data_floats,
            vector_data_floats,
            event_data_floats,
            sdf_data_offset,
            vector_data_offset,
            event_data_offset,
            buffer_total_floats,
            buffer_total_bytes: buffer_total_floats * 4,
        }
    }

    /// Compute layout from a GameConfig.
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.max_sdf_instances,
            config.max_vector_vertices,
            config.max_events,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::GameEvent;
    use crate::renderer::sdf_instance::SDFInstance;

    #[test]
    fn wire_sizes_match_structs() {
        assert_eq!(SDF_INSTANCE_FLOATS, SDFInstance::FLOATS);
        assert_eq!(EVENT_FLOATS, GameEvent::FLOATS);
    }

    #[test]
    fn default_config_layout() {
        let layout = ProtocolLayout::from_config(&GameConfig::default());
        assert_eq!(layout.max_sdf_instances, 128);
        assert_eq!(layout.sdf_data_offset, HEADER_FLOATS);
        assert_eq!(layout.vector_data_offset, HEADER_FLOATS + 128 * 12);
        assert_eq!(layout.event_data_offset, HEADER_FLOATS + 128 * 12 + 16384 * 6);
        assert_eq!(layout.buffer_total_floats, HEADER_FLOATS + 128 * 12 + 16384 * 6 + 32 * 4);
        assert_eq!(layout.buffer_total_bytes, layout.buffer_total_floats * 4);
    }

    #[test]
    fn offsets_are_contiguous() {
        let layout = ProtocolLayout::new(16, 200, 10);
        assert_eq!(layout.vector_data_offset, layout.sdf_data_offset + layout.sdf_data_floats);
        assert_eq!(layout.event_data_offset, layout.vector_data_offset + layout.vector_data_floats);
        assert_eq!(layout.buffer_total_floats, layout.event_data_offset + layout.event_data_floats);
    }
}
