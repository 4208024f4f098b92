//! Platform-agnostic input handling
use std::collections::HashSet;

use glam::Vec2;

/// Pixels of joystick drag that count as full deflection.
pub const JOYSTICK_RADIUS_PX: f32 = 60.0;

/// Platform-independent input events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    // Keyboard events
    KeyDown(String),
    KeyUp(String),

    // Mouse events
    MouseMove { dx: f32, dy: f32 },
    MouseButton { button: MouseButton, is_down: bool },

    // Touch events
    /// Drag offset in pixels from where the joystick touch started.
    TouchJoystick { dx: f32, dy: f32 },
    TouchJoystickReleased,
    /// Swipe delta in pixels since the previous touch sample.
    TouchLook { dx: f32, dy: f32 },
    Button { button: HudButton, is_down: bool },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
    PointerLockChanged { locked: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

impl MouseButton {
    pub fn from_web_button(button: i16) -> Self {
        match button {
            1 => MouseButton::Middle,
            2 => MouseButton::Right,
            _ => MouseButton::Left,
        }
    }
}

/// On-screen touch buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudButton {
    Shoot,
    Aim,
    Reload,
    Jump,
    Sprint,
}

/// Key mapping configuration
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub jump: String,
    pub sprint: String,
    pub reload: String,
    pub shoot: String,
    pub aim: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            jump: " ".to_string(),
            sprint: "Shift".to_string(),
            reload: "r".to_string(),
            shoot: "f".to_string(),
            aim: "q".to_string(),
        }
    }
}

impl KeyBindings {
    fn matches(binding: &str, key: &str) -> bool {
        binding == key || (binding.len() == 1 && binding.eq_ignore_ascii_case(key))
    }

    fn is_jump(&self, key: &str) -> bool {
        Self::matches(&self.jump, key) || key == "Space"
    }

    fn is_reload(&self, key: &str) -> bool {
        Self::matches(&self.reload, key)
    }

    fn is_shoot(&self, key: &str) -> bool {
        Self::matches(&self.shoot, key)
    }
}

/// Raw device state accumulated between ticks.
///
/// Held state (keys, buttons, joystick) persists until released. Look deltas
/// and press edges accumulate until the next [`InputState::snapshot`].
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    held_buttons: HashSet<HudButton>,
    pub look_delta: (f32, f32),
    pub pointer_locked: bool,
    joystick: Vec2,
    left_click: bool,
    right_click: bool,
    shoot_edge: bool,
    jump_edge: bool,
    reload_edge: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent, bindings: &KeyBindings) {
        match event {
            InputEvent::KeyDown(key) => {
                let fresh = self.pressed_keys.insert(key.clone());
                if fresh {
                    self.jump_edge |= bindings.is_jump(key);
                    self.reload_edge |= bindings.is_reload(key);
                    self.shoot_edge |= bindings.is_shoot(key);
                }
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(key.as_str());
            }
            InputEvent::MouseMove { dx, dy } => {
                if self.pointer_locked {
                    self.look_delta.0 += dx;
                    self.look_delta.1 += dy;
                }
            }
            InputEvent::MouseButton { button, is_down } => match button {
                MouseButton::Left => {
                    self.shoot_edge |= *is_down && !self.left_click;
                    self.left_click = *is_down;
                }
                MouseButton::Right => self.right_click = *is_down,
                MouseButton::Middle => {}
            },
            InputEvent::TouchJoystick { dx, dy } => {
                self.joystick = (Vec2::new(*dx, *dy) / JOYSTICK_RADIUS_PX)
                    .clamp(Vec2::NEG_ONE, Vec2::ONE);
            }
            InputEvent::TouchJoystickReleased => {
                self.joystick = Vec2::ZERO;
            }
            InputEvent::TouchLook { dx, dy } => {
                self.look_delta.0 += dx;
                self.look_delta.1 += dy;
            }
            InputEvent::Button { button, is_down } => {
                let fresh = if *is_down {
                    self.held_buttons.insert(*button)
                } else {
                    self.held_buttons.remove(button);
                    false
                };
                if fresh {
                    match button {
                        HudButton::Shoot => self.shoot_edge = true,
                        HudButton::Jump => self.jump_edge = true,
                        HudButton::Reload => self.reload_edge = true,
                        HudButton::Aim | HudButton::Sprint => {}
                    }
                }
            }
            InputEvent::FocusLost => {
                self.clear_held();
            }
            InputEvent::VisibilityChanged { visible } => {
                if !visible {
                    self.clear_held();
                }
            }
            InputEvent::PointerLockChanged { locked } => {
                self.pointer_locked = *locked;
                if !locked {
                    self.left_click = false;
                    self.right_click = false;
                }
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    fn is_bound_held(&self, binding: &str) -> bool {
        self.pressed_keys
            .iter()
            .any(|key| KeyBindings::matches(binding, key))
    }

    fn is_button_held(&self, button: HudButton) -> bool {
        self.held_buttons.contains(&button)
    }

    /// Drop everything held. Pending edges and look deltas are dropped too.
    pub fn clear_held(&mut self) {
        self.pressed_keys.clear();
        self.held_buttons.clear();
        self.joystick = Vec2::ZERO;
        self.left_click = false;
        self.right_click = false;
        self.shoot_edge = false;
        self.jump_edge = false;
        self.reload_edge = false;
        self.look_delta = (0.0, 0.0);
    }

    pub fn consume_look(&mut self) -> (f32, f32) {
        let result = self.look_delta;
        self.look_delta = (0.0, 0.0);
        result
    }

    /// Build this tick's snapshot and reset the edges and look delta.
    pub fn snapshot(&mut self, bindings: &KeyBindings, look_sensitivity: f32) -> InputSnapshot {
        let mut movement = self.joystick;
        if self.is_bound_held(&bindings.forward) || self.is_key_pressed("ArrowUp") {
            movement.y -= 1.0;
        }
        if self.is_bound_held(&bindings.backward) || self.is_key_pressed("ArrowDown") {
            movement.y += 1.0;
        }
        if self.is_bound_held(&bindings.left) || self.is_key_pressed("ArrowLeft") {
            movement.x -= 1.0;
        }
        if self.is_bound_held(&bindings.right) || self.is_key_pressed("ArrowRight") {
            movement.x += 1.0;
        }

        let (dx, dy) = self.consume_look();
        let snapshot = InputSnapshot::empty()
            .with_move(movement.x, movement.y)
            .with_look(-dx * look_sensitivity, -dy * look_sensitivity)
            .with_shoot_pressed(self.shoot_edge)
            .with_jump_pressed(self.jump_edge)
            .with_reload_pressed(self.reload_edge)
            .with_aim_held(
                self.right_click
                    || self.is_button_held(HudButton::Aim)
                    || self.is_bound_held(&bindings.aim),
            )
            .with_sprint_held(
                self.is_button_held(HudButton::Sprint) || self.is_bound_held(&bindings.sprint),
            );

        self.shoot_edge = false;
        self.jump_edge = false;
        self.reload_edge = false;
        snapshot
    }
}

/// Everything the simulation needs from input devices for one tick.
///
/// Movement axes are clamped to [-1, 1]; `move_y` of -1 is full forward.
/// Look deltas are in radians and already carry the sign convention of the
/// camera: positive yaw turns left, positive pitch looks up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    move_x: f32,
    move_y: f32,
    look_yaw: f32,
    look_pitch: f32,
    shoot_pressed: bool,
    jump_pressed: bool,
    aim_held: bool,
    sprint_held: bool,
    reload_pressed: bool,
}

fn clamp_axis(value: f32) -> f32 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn move_x(&self) -> f32 {
        self.move_x
    }

    pub fn move_y(&self) -> f32 {
        self.move_y
    }

    pub fn look_yaw(&self) -> f32 {
        self.look_yaw
    }

    pub fn look_pitch(&self) -> f32 {
        self.look_pitch
    }

    pub fn shoot_pressed(&self) -> bool {
        self.shoot_pressed
    }

    pub fn jump_pressed(&self) -> bool {
        self.jump_pressed
    }

    pub fn aim_held(&self) -> bool {
        self.aim_held
    }

    pub fn sprint_held(&self) -> bool {
        self.sprint_held
    }

    pub fn reload_pressed(&self) -> bool {
        self.reload_pressed
    }

    pub fn with_move(mut self, move_x: f32, move_y: f32) -> Self {
        self.move_x = clamp_axis(move_x);
        self.move_y = clamp_axis(move_y);
        self
    }

    pub fn with_look(mut self, yaw: f32, pitch: f32) -> Self {
        self.look_yaw = finite_or_zero(yaw);
        self.look_pitch = finite_or_zero(pitch);
        self
    }

    pub fn with_shoot_pressed(mut self, shoot_pressed: bool) -> Self {
        self.shoot_pressed = shoot_pressed;
        self
    }

    pub fn with_jump_pressed(mut self, jump_pressed: bool) -> Self {
        self.jump_pressed = jump_pressed;
        self
    }

    pub fn with_aim_held(mut self, aim_held: bool) -> Self {
        self.aim_held = aim_held;
        self
    }

    pub fn with_sprint_held(mut self, sprint_held: bool) -> Self {
        self.sprint_held = sprint_held;
        self
    }

    pub fn with_reload_pressed(mut self, reload_pressed: bool) -> Self {
        self.reload_pressed = reload_pressed;
        self
    }

    /// Copy with every gameplay action removed, keeping only look.
    pub fn look_only(&self) -> Self {
        Self::empty().with_look(self.look_yaw, self.look_pitch)
    }
}
