//! The tennis court: fixed objects, three players and their interactive state.

use glam::{Mat4, Vec3};

use crate::camera::{Camera, CameraConfig};
use crate::characters::{DEFAULT_ARM_ROTATION, Player, RacketRig, net, slot};
use crate::config::AppConfig;
use crate::controls::Intent;
use crate::frame::{FramePlan, PassPlan, ShadowSettings, Topology};
use crate::hierarchy::PartTree;
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Geometry;
use crate::resources::{ResourceStore, TextureId, load_texture};
use crate::transform::Transform;
use crate::visual::{PartShapes, VisualObject, draw_composite};

/// Upper-arm pitch limits in degrees.
const ARM_X_RANGE: (f32, f32) = (-100.0, 0.0);
/// Upper-arm roll limits in degrees.
const ARM_Z_RANGE: (f32, f32) = (-90.0, 20.0);
/// Players never shrink below this uniform scale.
const MIN_PLAYER_SCALE: f32 = 0.05;

const RACKET_LINE_THICKNESS: f32 = 2.0;
const RACKET_POINT_SIZE: f32 = 3.0;

/// Placement and pose of one player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Racket {
    pub position: Vec3,
    /// Euler degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    pub arm_rotation: Vec3,
}

impl Racket {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale: Vec3::splat(0.8),
            arm_rotation: DEFAULT_ARM_ROTATION,
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Transform::new()
            .position(self.position)
            .rotation(self.rotation)
            .scale(self.scale)
            .matrix()
    }

    /// Adds `degrees` to the arm rotation, keeping it inside the joint limits.
    pub fn bend_arm(&mut self, degrees: Vec3) {
        let arm = self.arm_rotation + degrees;
        self.arm_rotation = Vec3::new(
            arm.x.clamp(ARM_X_RANGE.0, ARM_X_RANGE.1),
            arm.y,
            arm.z.clamp(ARM_Z_RANGE.0, ARM_Z_RANGE.1),
        );
    }
}

/// Toggles and selections driven by the keyboard.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneState {
    pub selected: Player,
    pub racket_topology: Topology,
    pub shadows: bool,
    pub textures: bool,
    pub light_movement: bool,
    pub show_shadow_map: bool,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            selected: Player::Augusto,
            racket_topology: Topology::Triangles,
            shadows: true,
            textures: true,
            light_movement: true,
            show_shadow_map: false,
        }
    }
}

struct PlayerEntry {
    rig: RacketRig,
    racket: Racket,
    home: Racket,
    palette: Vec<Material>,
}

impl PlayerEntry {
    fn new(player: Player, home: Racket, palette: Vec<Material>) -> Self {
        let mut rig = RacketRig::build(player);
        rig.set_pose(home.matrix(), home.arm_rotation);
        Self {
            rig,
            racket: home,
            home,
            palette,
        }
    }

    fn pose(&mut self) {
        self.rig.set_pose(self.racket.matrix(), self.racket.arm_rotation);
    }
}

/// Everything visible in the demo plus the state input acts on.
pub struct Scene {
    pub camera: Camera,
    pub light: Light,
    pub state: SceneState,
    camera_config: CameraConfig,
    world: VisualObject,
    light_cube: VisualObject,
    grid: VisualObject,
    axes: [VisualObject; 3],
    ground: VisualObject,
    screen: VisualObject,
    part_cube: VisualObject,
    ball: VisualObject,
    net: PartTree,
    net_palette: Vec<Material>,
    players: Vec<PlayerEntry>,
    depth_material: Material,
    shadow_bias: f32,
    clear_color: wgpu::Color,
}

fn racket_material(color: Vec3, shininess: u32) -> Material {
    Material::lit(color)
        .shininess(shininess)
        .line_thickness(RACKET_LINE_THICKNESS)
        .point_size(RACKET_POINT_SIZE)
}

fn augusto_palette(letter: Material, ball: Material) -> Vec<Material> {
    let mut palette = vec![Material::default(); slot::PALETTE_LEN];
    palette[slot::SKIN] = racket_material(Vec3::new(0.58, 0.38, 0.24), 2);
    palette[slot::HANDLE] = racket_material(Vec3::splat(0.2), 64);
    palette[slot::PRIMARY] = racket_material(Vec3::new(0.1, 0.2, 0.9), 64);
    palette[slot::SECONDARY] = racket_material(Vec3::new(0.1, 0.9, 0.2), 64);
    palette[slot::STRINGS] = racket_material(Vec3::splat(0.94), 64).alpha(0.95);
    palette[slot::LETTER] = letter;
    palette[slot::BALL] = ball;
    palette
}

/// Gabrielle and Jack share one cube material recoloured per piece.
fn plain_palette(skin: Vec3, body: Vec3, letter: Material, ball: Material) -> Vec<Material> {
    let mut palette = vec![Material::default(); slot::PALETTE_LEN];
    palette[slot::SKIN] = Material::lit(skin);
    palette[slot::HANDLE] = Material::lit(body);
    palette[slot::PRIMARY] = Material::lit(body);
    palette[slot::SECONDARY] = Material::lit(body);
    palette[slot::STRINGS] = Material::lit(Vec3::ONE);
    palette[slot::LETTER] = letter;
    palette[slot::BALL] = ball;
    palette
}

impl Scene {
    /// Uploads every mesh and texture the scene draws and places the
    /// players at their home positions.
    pub fn new(store: &mut impl ResourceStore, config: &AppConfig) -> Self {
        let camera = Camera::new(&config.camera, config.width, config.height);
        let light = Light::new(&config.light);

        let clay = load_texture(store, &config.ground_texture);
        let fuzz = load_texture(store, &config.ball_texture);

        let centered = Geometry::cube(Vec3::ZERO);
        let centered_mesh = store.add_mesh("centered cube", &centered);

        let world = VisualObject::from_mesh(
            centered_mesh,
            centered.vertex_count(),
            Material::unlit(Vec3::new(0.53, 0.81, 0.92)),
        )
        .with_transform(Transform::new().uniform_scale(200.0));

        let light_cube = VisualObject::from_mesh(
            centered_mesh,
            centered.vertex_count(),
            Material::unlit(light.color),
        )
        .with_transform(Transform::from_position(light.position()));

        let grid = VisualObject::new(
            store,
            "grid",
            &Geometry::grid(78, 36, 1.0),
            Material::grid(Vec3::ONE, 0.4),
        )
        .with_transform(Transform::new().rotation(Vec3::new(90.0, 0.0, 0.0)));

        // Lifted off the origin so the axes never z-fight with the grid.
        let origin = Vec3::splat(0.01);
        let axes = [Vec3::X, Vec3::Y, Vec3::Z].map(|axis| {
            VisualObject::new(
                store,
                "axis",
                &Geometry::line(origin, origin + axis * 5.0),
                Material::unlit(axis).line_thickness(3.0),
            )
        });

        let ground = VisualObject::new(
            store,
            "ground",
            &Geometry::plane(1.0),
            Material::lit(Vec3::ONE).texture(clay, 1.0).shininess(1),
        )
        .with_transform(
            Transform::from_position(Vec3::new(0.0, -0.1, 0.0)).scale(Vec3::new(42.0, 20.0, 20.0)),
        );

        let screen = VisualObject::new(store, "screen", &Geometry::screen_quad(), Material::screen())
            .with_transform(
                Transform::from_position(Vec3::new(0.65, -0.65, 0.0)).uniform_scale(0.3),
            );

        let part_cube = VisualObject::new(
            store,
            "part cube",
            &Geometry::cube(Vec3::new(0.0, 0.5, 0.0)),
            Material::default(),
        );
        let ball_material = Material::lit(Vec3::ONE).texture(fuzz, 1.0).shininess(1);
        let ball = VisualObject::new(
            store,
            "tennis ball",
            &Geometry::icosphere(1.0, 3),
            ball_material.clone(),
        );

        let pink = Vec3::new(1.0, 0.714, 0.757);
        let players = vec![
            PlayerEntry::new(
                Player::Augusto,
                Racket::at(Vec3::ZERO),
                augusto_palette(
                    Material::lit(Vec3::new(0.15, 0.92, 0.17)).shininess(4),
                    ball_material.clone(),
                ),
            ),
            PlayerEntry::new(
                Player::Gabrielle,
                Racket::at(Vec3::new(10.0, 0.0, 0.0)),
                plain_palette(
                    Vec3::new(0.871, 0.722, 0.529),
                    pink,
                    Material::lit(pink),
                    ball_material.clone(),
                ),
            ),
            PlayerEntry::new(
                Player::Jack,
                Racket::at(Vec3::new(-10.0, 0.0, 0.0)),
                plain_palette(
                    Vec3::new(1.0, 0.894, 0.769),
                    Vec3::new(0.0, 0.5, 0.5),
                    Material::lit(pink).shininess(128),
                    ball_material,
                ),
            ),
        ];

        let mut net_palette = vec![Material::default(); slot::NET_PALETTE_LEN];
        net_palette[slot::NET_POST] = Material::lit(Vec3::new(0.51, 0.53, 0.53)).shininess(4);
        net_palette[slot::NET_MESH] = Material::lit(Vec3::splat(0.96)).shininess(128);

        log::info!("scene ready with {} players", players.len());

        Self {
            camera,
            light,
            state: SceneState::default(),
            camera_config: config.camera.clone(),
            world,
            light_cube,
            grid,
            axes,
            ground,
            screen,
            part_cube,
            ball,
            net: net(),
            net_palette,
            players,
            depth_material: Material::shadow_mapper(),
            shadow_bias: config.shadow_bias,
            clear_color: config.clear_color,
        }
    }

    pub fn racket(&self, player: Player) -> &Racket {
        &self.players[player.index()].racket
    }

    fn selected_mut(&mut self) -> &mut PlayerEntry {
        &mut self.players[self.state.selected.index()]
    }

    /// Applies one intent. [`Intent::Quit`] is left to the caller.
    pub fn apply(&mut self, intent: Intent) {
        match intent {
            Intent::SelectPlayer(player) => {
                self.state.selected = player;
                let position = self.players[player.index()].racket.position;
                self.camera.focus(position);
            }
            Intent::RacketTopology(topology) => self.state.racket_topology = topology,
            Intent::ToggleShadows => {
                self.state.shadows = !self.state.shadows;
                log::debug!("shadows {}", on_off(self.state.shadows));
            }
            Intent::ToggleTextures => {
                self.state.textures = !self.state.textures;
                log::debug!("textures {}", on_off(self.state.textures));
            }
            Intent::ToggleLightMovement => {
                self.state.light_movement = !self.state.light_movement;
                log::debug!("light movement {}", on_off(self.state.light_movement));
            }
            Intent::ToggleShadowMapView => {
                self.state.show_shadow_map = !self.state.show_shadow_map;
            }
            Intent::ResetPlayer => {
                let entry = self.selected_mut();
                entry.racket = entry.home;
                entry.pose();
            }
            Intent::MovePlayer(delta) => {
                let entry = self.selected_mut();
                entry.racket.position += delta;
                entry.pose();
            }
            Intent::RotatePlayer(degrees) => {
                let entry = self.selected_mut();
                entry.racket.rotation += degrees;
                entry.pose();
            }
            Intent::ScalePlayer(delta) => {
                let entry = self.selected_mut();
                entry.racket.scale = (entry.racket.scale + Vec3::splat(delta)).max(Vec3::splat(MIN_PLAYER_SCALE));
                entry.pose();
            }
            Intent::RotateArm(degrees) => {
                let entry = self.selected_mut();
                entry.racket.bend_arm(degrees);
                entry.pose();
            }
            Intent::MoveCamera(direction, distance) => self.camera.translate(direction, distance),
            Intent::TiltCamera(degrees) => self.camera.tilt(degrees),
            Intent::PanCamera(degrees) => self.camera.pan(degrees),
            Intent::OrbitCamera { azimuth, elevation } => self.camera.orbit(azimuth, elevation),
            Intent::ResetCamera => self.camera.reset(),
            Intent::Quit => {}
        }
    }

    /// Moves the light along its path when light movement is on.
    pub fn advance(&mut self, time: f32) {
        if self.state.light_movement {
            self.light.animate(time);
        }
        self.light_cube.transform.position = self.light.position();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_viewport_size(width, height);
    }

    pub fn camera_config(&self) -> &CameraConfig {
        &self.camera_config
    }

    /// Records this frame: the depth pass from the light when shadows are
    /// on, then the colour pass from the camera.
    pub fn plan_frame(&self) -> FramePlan {
        let light = self.light.params();
        let light_view_projection = self.light.view_projection();

        let depth = self.state.shadows.then(|| {
            let mut pass = PassPlan::new(light_view_projection, self.light.position(), light);
            self.draw_casters(&mut pass, Some(&self.depth_material));
            pass
        });

        let mut color = PassPlan::new(self.camera.view_projection(), self.camera.position(), light);
        self.world.draw(&mut color, Topology::Triangles, None);
        self.light_cube.draw(&mut color, Topology::Triangles, None);
        self.grid.draw(&mut color, Topology::Lines, None);
        for axis in &self.axes {
            axis.draw(&mut color, Topology::Lines, None);
        }
        self.draw_casters(&mut color, None);
        if self.state.shadows && self.state.show_shadow_map {
            self.screen.draw(&mut color, Topology::Triangles, None);
        }

        FramePlan {
            depth,
            color,
            light_view_projection,
            shadow: ShadowSettings {
                enabled: self.state.shadows,
                bias: self.shadow_bias,
                map_size: self.light.shadow_map_size(),
                depth_range: self.light.depth_range(),
            },
            clear_color: self.clear_color,
        }
    }

    /// Net, players and ground: everything that casts a shadow.
    fn draw_casters(&self, pass: &mut PassPlan, override_material: Option<&Material>) {
        let shapes = PartShapes {
            cube: &self.part_cube,
            sphere: &self.ball,
        };
        draw_composite(
            pass,
            &self.net,
            shapes,
            &self.net_palette,
            Topology::Triangles,
            override_material,
        );

        let strip_textures = override_material.is_none() && !self.state.textures;
        for entry in &self.players {
            if strip_textures {
                let mut palette = entry.palette.clone();
                palette[slot::BALL] = untextured(&palette[slot::BALL]);
                draw_composite(pass, &entry.rig.tree, shapes, &palette, self.state.racket_topology, None);
            } else {
                draw_composite(
                    pass,
                    &entry.rig.tree,
                    shapes,
                    &entry.palette,
                    self.state.racket_topology,
                    override_material,
                );
            }
        }

        let bare_ground = strip_textures.then(|| untextured(&self.ground.material));
        self.ground
            .draw(pass, Topology::Triangles, override_material.or(bare_ground.as_ref()));
    }
}

/// The same material with its texture switched off.
fn untextured(material: &Material) -> Material {
    material.clone().texture(TextureId::NONE, 0.0)
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::HeadlessStore;

    fn scene() -> Scene {
        Scene::new(&mut HeadlessStore::new(), &AppConfig::default())
    }

    #[test]
    fn selecting_a_player_focuses_the_camera() {
        let mut scene = scene();
        scene.apply(Intent::SelectPlayer(Player::Gabrielle));
        assert_eq!(scene.state.selected, Player::Gabrielle);
        assert_eq!(scene.camera.target(), Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(scene.camera.position(), Vec3::new(10.0, 25.0, 30.0));
    }

    #[test]
    fn arm_rotation_is_clamped() {
        let mut scene = scene();
        scene.apply(Intent::RotateArm(Vec3::new(90.0, 0.0, -200.0)));
        assert_eq!(scene.racket(Player::Augusto).arm_rotation, Vec3::new(0.0, 0.0, -90.0));
        scene.apply(Intent::RotateArm(Vec3::new(-500.0, 0.0, 500.0)));
        assert_eq!(scene.racket(Player::Augusto).arm_rotation, Vec3::new(-100.0, 0.0, 20.0));
    }

    #[test]
    fn reset_restores_only_the_selected_player() {
        let mut scene = scene();
        scene.apply(Intent::MovePlayer(Vec3::X));
        scene.apply(Intent::SelectPlayer(Player::Jack));
        scene.apply(Intent::MovePlayer(Vec3::Y));
        scene.apply(Intent::RotateArm(Vec3::new(-10.0, 0.0, 0.0)));
        scene.apply(Intent::ResetPlayer);

        assert_eq!(*scene.racket(Player::Jack), Racket::at(Vec3::new(-10.0, 0.0, 0.0)));
        assert_eq!(scene.racket(Player::Augusto).position, Vec3::X);
    }

    #[test]
    fn toggles_flip_state() {
        let mut scene = scene();
        let before = scene.state;
        for intent in [
            Intent::ToggleShadows,
            Intent::ToggleTextures,
            Intent::ToggleLightMovement,
            Intent::ToggleShadowMapView,
        ] {
            scene.apply(intent);
        }
        assert_eq!(scene.state.shadows, !before.shadows);
        assert_eq!(scene.state.textures, !before.textures);
        assert_eq!(scene.state.light_movement, !before.light_movement);
        assert_eq!(scene.state.show_shadow_map, !before.show_shadow_map);
    }

    #[test]
    fn scale_never_reaches_zero() {
        let mut scene = scene();
        scene.apply(Intent::ScalePlayer(-10.0));
        assert_eq!(scene.racket(Player::Augusto).scale, Vec3::splat(MIN_PLAYER_SCALE));
    }

    #[test]
    fn frozen_light_stays_put() {
        let mut scene = scene();
        scene.state.light_movement = false;
        let before = scene.light.position();
        scene.advance(3.0);
        assert_eq!(scene.light.position(), before);

        scene.state.light_movement = true;
        scene.advance(3.0);
        assert_eq!(scene.light.position(), scene.light.orbit_position(3.0));
    }
}
