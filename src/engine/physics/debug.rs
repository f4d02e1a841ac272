use glam::Vec2;

use super::collider::ColliderShape;
use super::world::PhysicsWorld;

/// Line-list vertex for debug drawing, laid out for direct GPU upload
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DebugVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

const DYNAMIC_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 0.8]; // Green for dynamic
const STATIC_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.8]; // Gray for static

/// Segments used to approximate a circle outline
const CIRCLE_SEGMENTS: usize = 16;

/// Extracts collider outlines from a physics world as line-list geometry.
///
/// The output is renderer-agnostic: `vertices` and `indices` can be handed
/// to any line-list pipeline. Boxes are four edges (colliders do not rotate
/// with their body), circles are segment loops. Rebuild once per rendered
/// frame.
pub struct DebugLines {
    vertices: Vec<DebugVertex>,
    indices: Vec<u16>,
    enabled: bool,
}

impl DebugLines {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            enabled: false, // Disabled by default
        }
    }

    /// Enable or disable geometry extraction
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Rebuild the line geometry from the current world state. While
    /// disabled this only clears any previous geometry.
    pub fn rebuild(&mut self, world: &PhysicsWorld) {
        self.vertices.clear();
        self.indices.clear();
        if !self.enabled {
            return;
        }

        for (_, collider) in world.colliders() {
            let Some(body) = world.get_rigid_body(collider.body()) else {
                continue;
            };
            let color = if body.is_static() {
                STATIC_COLOR
            } else {
                DYNAMIC_COLOR
            };
            let center = collider.world_position(body.position());

            match collider.shape() {
                ColliderShape::Circle { radius } => self.push_circle(center, radius, color),
                ColliderShape::Box { size } => self.push_box(center, size * 0.5, color),
            }
        }
    }

    pub fn vertices(&self) -> &[DebugVertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u16] {
        &self.indices
    }

    fn push_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        let start = self.vertices.len() as u16;

        for i in 0..CIRCLE_SEGMENTS {
            let angle = (i as f32 / CIRCLE_SEGMENTS as f32) * std::f32::consts::TAU;
            let point = center + Vec2::new(angle.cos(), angle.sin()) * radius;
            self.vertices.push(DebugVertex {
                position: point.to_array(),
                color,
            });

            let next = (i + 1) % CIRCLE_SEGMENTS;
            self.indices.push(start + i as u16);
            self.indices.push(start + next as u16);
        }
    }

    fn push_box(&mut self, center: Vec2, half: Vec2, color: [f32; 4]) {
        let start = self.vertices.len() as u16;

        let corners = [
            center + Vec2::new(-half.x, -half.y),
            center + Vec2::new(half.x, -half.y),
            center + Vec2::new(half.x, half.y),
            center + Vec2::new(-half.x, half.y),
        ];
        for corner in corners {
            self.vertices.push(DebugVertex {
                position: corner.to_array(),
                color,
            });
        }

        for i in 0..4u16 {
            self.indices.push(start + i);
            self.indices.push(start + (i + 1) % 4);
        }
    }
}

impl Default for DebugLines {
    fn default() -> Self {
        Self::new()
    }
}
