//! Scene
//!
//! The comparison scene: one shadow caster standing on a floor in front of
//! two walls, a perspective viewer camera, and the light with its
//! orthographic shadow camera.
//!
//! Geometry is referenced by index into [`Scene::meshes`]; the renderer
//! uploads each mesh once and draws every [`Drawable`] with its own world
//! transform and diffuse color.

pub mod camera;
pub mod light;

use glam::{Mat4, Vec3, Vec4};

use crate::renderer::settings::RenderSettings;
use crate::resources::MeshData;
use crate::resources::primitives::{PlaneOptions, SphereOptions, create_plane, create_sphere};

pub use camera::{Camera, Projection};
pub use light::{Light, LightSet};

/// Half the edge length of each wall.
pub const WALL_HALF_LENGTH: f32 = 512.0;
/// Uniform scale applied to the caster.
pub const CASTER_SCALE: f32 = 100.0;

pub const CAMERA_FOV_DEGREES: f32 = 30.0;
pub const CAMERA_NEAR: f32 = 1.0;
pub const CAMERA_FAR: f32 = 2000.0;

const LIGHT_NEAR: f32 = 1.0;
const LIGHT_FAR: f32 = 2500.0;

/// Index into [`Scene::meshes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(pub usize);

/// One draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    pub mesh: MeshId,
    pub world: Mat4,
    pub diffuse: Vec4,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub meshes: Vec<MeshData>,
    pub drawables: Vec<Drawable>,
    pub lights: LightSet,
    /// The viewer.
    pub camera: Camera,
    /// The active light's shadow camera.
    pub light_camera: Camera,
}

impl Scene {
    /// Builds the scene used to compare the shadow algorithms.
    #[must_use]
    pub fn comparison_scene(settings: &RenderSettings) -> Self {
        let caster = MeshId(0);
        let wall = MeshId(1);
        let meshes = vec![
            create_sphere(&SphereOptions {
                radius: 1.0,
                width_segments: 48,
                height_segments: 24,
            }),
            create_plane(&PlaneOptions {
                width: WALL_HALF_LENGTH * 2.0,
                depth: WALL_HALF_LENGTH * 2.0,
                width_segments: 1,
                depth_segments: 1,
            }),
        ];

        let caster_world = Mat4::from_translation(Vec3::new(0.0, CASTER_SCALE, 0.0))
            * Mat4::from_scale(Vec3::splat(CASTER_SCALE));
        let back_wall = Mat4::from_translation(Vec3::new(0.0, WALL_HALF_LENGTH, -WALL_HALF_LENGTH))
            * Mat4::from_rotation_x(90_f32.to_radians());
        let left_wall = Mat4::from_translation(Vec3::new(-WALL_HALF_LENGTH, WALL_HALF_LENGTH, 0.0))
            * Mat4::from_rotation_z(-90_f32.to_radians());

        let drawables = vec![
            Drawable {
                mesh: caster,
                world: caster_world,
                diffuse: Vec4::ONE,
            },
            Drawable {
                mesh: wall,
                world: Mat4::IDENTITY,
                diffuse: Vec4::new(0.27, 0.49, 0.81, 1.0),
            },
            Drawable {
                mesh: wall,
                world: back_wall,
                diffuse: Vec4::new(0.32, 0.81, 0.29, 1.0),
            },
            Drawable {
                mesh: wall,
                world: left_wall,
                diffuse: Vec4::new(0.83, 0.35, 0.29, 1.0),
            },
        ];

        let mut lights = LightSet::new();
        lights.add_light(
            Light::new(Vec4::new(500.0, 500.0, 500.0, 0.0), Vec3::new(-1.0, -1.0, 0.0)).with_colors(
                Vec4::ONE,
                Vec4::new(0.9, 0.9, 0.9, 1.0),
                Vec4::new(0.9, 0.9, 0.9, 1.0),
            ),
        );

        let aspect = settings.frame_width as f32 / settings.frame_height.max(1) as f32;
        let mut camera =
            Camera::new_perspective(CAMERA_FOV_DEGREES, aspect, CAMERA_NEAR, CAMERA_FAR);
        camera.look_at(Vec3::new(600.0, 400.0, 600.0), Vec3::new(0.0, 100.0, 0.0), Vec3::Y);

        let extent = settings.shadow_map_size as f32;
        let light_camera = Camera::new_orthographic(extent, extent, LIGHT_NEAR, LIGHT_FAR);

        let mut scene = Self {
            meshes,
            drawables,
            lights,
            camera,
            light_camera,
        };
        scene.update_light_camera();
        scene
    }

    /// Places the shadow camera at the active light, looking along its
    /// direction with +Y up.
    pub fn update_light_camera(&mut self) {
        if let Some(light) = self.lights.active() {
            self.light_camera.look_to(light.eye(), light.direction, Vec3::Y);
        }
    }

    /// Selects the active light and re-places the shadow camera on it.
    /// Out-of-range indices leave both unchanged.
    pub fn set_active_light(&mut self, index: usize) -> bool {
        let changed = self.lights.set_active(index);
        if changed {
            self.update_light_camera();
        }
        changed
    }

    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&MeshData> {
        self.meshes.get(id.0)
    }
}
