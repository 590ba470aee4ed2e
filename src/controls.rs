//! Keyboard and mouse bindings.
//!
//! Input is polled once per frame and turned into [`Intent`]s. The scene
//! applies them in order; nothing else mutates scene state in response to
//! input.

use glam::Vec3;
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::camera::{CameraConfig, CameraMove};
use crate::characters::Player;
use crate::frame::Topology;
use crate::input::Input;

/// Player translation speed in units per second.
pub const PLAYER_MOVE_SPEED: f32 = 10.0;
/// Player rotation speed in degrees per second.
pub const PLAYER_TURN_SPEED: f32 = 20.0;
/// Uniform scale change per second.
pub const PLAYER_SCALE_SPEED: f32 = 1.0;
/// Upper-arm rotation speed in degrees per second.
///
/// Scaled by frame time, so the arm turns at the same rate at any frame
/// rate. At 60 fps this is one degree per frame.
pub const ARM_TURN_SPEED: f32 = 60.0;

/// Camera travel per pixel of left-button drag.
const DRAG_DISTANCE: f32 = 0.1;
/// Camera rotation in degrees per pixel of middle/right drag.
const DRAG_DEGREES: f32 = 0.2;

/// A state change requested by the user.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Intent {
    /// Select a player and focus the camera on it.
    SelectPlayer(Player),
    RacketTopology(Topology),
    ToggleShadows,
    ToggleTextures,
    ToggleLightMovement,
    ToggleShadowMapView,
    /// Restore the selected player's default placement and pose.
    ResetPlayer,
    MovePlayer(Vec3),
    /// Euler degrees added to the selected player's rotation.
    RotatePlayer(Vec3),
    ScalePlayer(f32),
    /// Euler degrees added to the selected player's upper arm.
    RotateArm(Vec3),
    MoveCamera(CameraMove, f32),
    TiltCamera(f32),
    PanCamera(f32),
    OrbitCamera { azimuth: f32, elevation: f32 },
    ResetCamera,
    Quit,
}

const PLAYER_KEYS: [(KeyCode, Player); 3] = [
    (KeyCode::Digit1, Player::Augusto),
    (KeyCode::Digit2, Player::Gabrielle),
    (KeyCode::Digit3, Player::Jack),
];

/// Wireframe is a connected strip through the rig's vertices. A line list
/// would pair triangle vertices into unrelated segments.
const TOPOLOGY_KEYS: [(KeyCode, Topology); 3] = [
    (KeyCode::KeyP, Topology::Points),
    (KeyCode::KeyL, Topology::LineStrip),
    (KeyCode::KeyT, Topology::Triangles),
];

const TOGGLE_KEYS: [(KeyCode, Intent); 5] = [
    (KeyCode::KeyB, Intent::ToggleShadows),
    (KeyCode::KeyX, Intent::ToggleTextures),
    (KeyCode::KeyZ, Intent::ToggleLightMovement),
    (KeyCode::KeyM, Intent::ToggleShadowMapView),
    (KeyCode::Tab, Intent::ResetPlayer),
];

const CAMERA_KEYS: [(KeyCode, CameraMove); 6] = [
    (KeyCode::Numpad7, CameraMove::Up),
    (KeyCode::Numpad9, CameraMove::Down),
    (KeyCode::Numpad4, CameraMove::Left),
    (KeyCode::Numpad6, CameraMove::Right),
    (KeyCode::Numpad8, CameraMove::Forward),
    (KeyCode::Numpad2, CameraMove::Backward),
];

/// +1 when `positive` is held, -1 when `negative` is, 0 for both or neither.
fn axis(input: &Input, positive: KeyCode, negative: KeyCode) -> f32 {
    input.key_down(positive) as i32 as f32 - input.key_down(negative) as i32 as f32
}

/// Translates this frame's input into intents. Continuous changes are
/// scaled by `dt` seconds.
pub fn collect_intents(input: &Input, camera: &CameraConfig, dt: f32) -> Vec<Intent> {
    let mut intents = Vec::new();

    if input.key_pressed(KeyCode::Escape) {
        intents.push(Intent::Quit);
    }

    for (key, player) in PLAYER_KEYS {
        if input.key_down(key) {
            intents.push(Intent::SelectPlayer(player));
        }
    }
    for (key, topology) in TOPOLOGY_KEYS {
        if input.key_down(key) {
            intents.push(Intent::RacketTopology(topology));
        }
    }
    for (key, intent) in TOGGLE_KEYS {
        if input.key_released(key) {
            intents.push(intent);
        }
    }

    player_intents(input, dt, &mut intents);

    if input.key_down(KeyCode::ShiftRight) {
        let arm = Vec3::new(
            axis(input, KeyCode::ArrowUp, KeyCode::ArrowDown),
            0.0,
            axis(input, KeyCode::ArrowRight, KeyCode::ArrowLeft),
        );
        if arm != Vec3::ZERO {
            intents.push(Intent::RotateArm(arm * ARM_TURN_SPEED * dt));
        }
    } else {
        let azimuth = axis(input, KeyCode::ArrowRight, KeyCode::ArrowLeft);
        let elevation = axis(input, KeyCode::ArrowUp, KeyCode::ArrowDown);
        if azimuth != 0.0 || elevation != 0.0 {
            let step = camera.orbit_speed * dt;
            intents.push(Intent::OrbitCamera {
                azimuth: azimuth * step,
                elevation: elevation * step,
            });
        }
    }

    for (key, direction) in CAMERA_KEYS {
        if input.key_down(key) {
            intents.push(Intent::MoveCamera(direction, camera.move_speed * dt));
        }
    }
    if input.key_down(KeyCode::Home) || input.key_down(KeyCode::Numpad5) {
        intents.push(Intent::ResetCamera);
    }

    let drag = input.mouse_delta();
    if drag != glam::Vec2::ZERO {
        if input.mouse_down(MouseButton::Left) {
            intents.push(Intent::MoveCamera(CameraMove::Along, -drag.y * DRAG_DISTANCE));
        }
        if input.mouse_down(MouseButton::Middle) {
            intents.push(Intent::TiltCamera(-drag.y * DRAG_DEGREES));
        }
        if input.mouse_down(MouseButton::Right) {
            intents.push(Intent::PanCamera(-drag.x * DRAG_DEGREES));
        }
    }

    intents
}

/// W/S/A/D move the player with shift held and rotate it without.
fn player_intents(input: &Input, dt: f32, intents: &mut Vec<Intent>) {
    if input.shift_down() {
        let movement = Vec3::new(
            axis(input, KeyCode::KeyS, KeyCode::KeyW),
            axis(input, KeyCode::KeyD, KeyCode::KeyA),
            0.0,
        );
        if movement != Vec3::ZERO {
            intents.push(Intent::MovePlayer(movement * PLAYER_MOVE_SPEED * dt));
        }
    } else {
        let rotation = Vec3::new(
            axis(input, KeyCode::KeyE, KeyCode::KeyQ),
            axis(input, KeyCode::KeyA, KeyCode::KeyD),
            axis(input, KeyCode::KeyW, KeyCode::KeyS),
        );
        if rotation != Vec3::ZERO {
            intents.push(Intent::RotatePlayer(rotation * PLAYER_TURN_SPEED * dt));
        }
    }

    let scale = axis(input, KeyCode::KeyU, KeyCode::KeyJ);
    if scale != 0.0 {
        intents.push(Intent::ScalePlayer(scale * PLAYER_SCALE_SPEED * dt));
    }
}
