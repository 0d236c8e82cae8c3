use crate::components::entity::Entity;
use crate::renderer::sdf_instance::{SDFBuffer, SDFInstance};

/// Build the SDF instance buffer from entities with mesh components.
///
/// Top-down projection: world X → screen x, world Z → screen y. The
/// out-of-plane Y coordinate does not reach the screen.
pub fn build_sdf_buffer<'a>(
    entities: impl Iterator<Item = &'a Entity>,
    buffer: &mut SDFBuffer,
) {
    buffer.clear();
    for entity in entities {
        if !entity.active {
            continue;
        }
        let Some(mesh) = &entity.mesh else {
            continue;
        };
        buffer.push(SDFInstance {
            x: entity.pos.x,
            y: entity.pos.z,
            radius: mesh.radius(),
            rotation: entity.rotation,
            r: mesh.color.r,
            g: mesh.color.g,
            b: mesh.color.b,
            shininess: mesh.shininess,
            emissive: mesh.emissive,
            _pad0: 0.0,
            _pad1: 0.0,
            _pad2: 0.0,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::EntityId;
    use crate::components::mesh::{MeshComponent, SDFColor};
    use glam::Vec3;

    #[test]
    fn projects_xz_onto_screen() {
        let entity = Entity::new(EntityId(1))
            .with_pos(Vec3::new(50.0, 9.0, 75.0))
            .with_rotation(0.25)
            .with_mesh(
                MeshComponent::sphere(15.0, SDFColor::new(1.0, 0.0, 0.0))
                    .with_shininess(64.0)
                    .with_emissive(0.5),
            );

        let entities = vec![entity];
        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(entities.iter(), &mut buffer);

        assert_eq!(buffer.instance_count(), 1);
        let inst = buffer.instances()[0];
        assert_eq!(inst.x, 50.0);
        assert_eq!(inst.y, 75.0);
        assert_eq!(inst.radius, 15.0);
        assert_eq!(inst.rotation, 0.25);
        assert_eq!(inst.r, 1.0);
        assert_eq!(inst.shininess, 64.0);
        assert_eq!(inst.emissive, 0.5);
    }

    #[test]
    fn skips_inactive_and_meshless() {
        let e1 = Entity::new(EntityId(1));
        let mut e2 = Entity::new(EntityId(2)).with_mesh(MeshComponent::default());
        e2.active = false;
        let e3 = Entity::new(EntityId(3)).with_mesh(MeshComponent::default());

        let entities = vec![e1, e2, e3];
        let mut buffer = SDFBuffer::new();
        build_sdf_buffer(entities.iter(), &mut buffer);

        assert_eq!(buffer.instance_count(), 1);
    }
}
