//! Retained scene abstraction
//!
//! The engine doesn't draw anything itself. It keeps a retained scene graph
//! in step with the simulation through [`Scene`], and asks the embedding page
//! about its container through [`Host`]. [`SceneSync`] remembers which node
//! belongs to which simulation object.

use std::collections::HashMap;

use glam::Vec2;

use crate::consts::*;
use crate::sim::{EntityKind, ParticleKind, World};

/// Handle to a node owned by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

/// Container size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Render layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Background,
    /// Clipped to the completed part of the road
    Revealed,
    Track,
    Vehicle,
    Effects,
    Hud,
}

/// Primitive shapes. `color` is a palette index resolved by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect { size: Vec2, color: u32 },
    Circle { radius: f32, color: u32 },
    Text { text: String, size: f32 },
}

/// Palette indices
pub mod palette {
    pub const ROAD: u32 = 0;
    pub const ROAD_DONE: u32 = 1;
    pub const VEHICLE: u32 = 2;
    pub const STAR: u32 = 3;
    pub const OBSTACLE: u32 = 4;
    pub const SMOKE: u32 = 5;
    pub const FIRE: u32 = 6;
    pub const PLANE: u32 = 7;
}

/// Placement of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub pos: Vec2,
    pub scale: Vec2,
    /// Radians
    pub rotation: f32,
    pub opacity: f32,
}

impl Transform {
    pub fn at(pos: Vec2) -> Self {
        Self {
            pos,
            scale: Vec2::ONE,
            rotation: 0.0,
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }
}

/// Retained 2D renderer
pub trait Scene {
    fn create(&mut self, layer: Layer, shape: Shape) -> NodeId;
    fn destroy(&mut self, node: NodeId);
    fn set_transform(&mut self, node: NodeId, transform: Transform);
    fn set_text(&mut self, node: NodeId, text: &str);
    fn clip_layer(&mut self, layer: Layer, rect: Rect);
    /// Start or stop per-frame callbacks
    fn set_frame_loop(&mut self, running: bool);
}

/// Embedding environment
pub trait Host {
    /// Current container size, None when there is no surface to draw on
    fn container_size(&self) -> Option<Size>;
    /// Attach or detach resize notifications
    fn observe_resize(&mut self, observe: bool);
}

/// HUD text slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudSlot {
    Stars,
    Hits,
    Speed,
}

/// Bookkeeping between simulation ids and scene nodes
#[derive(Debug, Default)]
pub struct SceneSync {
    road: Option<NodeId>,
    revealed: Option<NodeId>,
    vehicle: Option<NodeId>,
    flyover: Option<(u32, NodeId)>,
    entities: HashMap<u32, NodeId>,
    particles: HashMap<u32, (NodeId, ParticleKind)>,
    markers: HashMap<u32, NodeId>,
    hud: HashMap<HudSlot, (NodeId, String)>,
    reveal_x: Option<f32>,
}

impl SceneSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes currently held
    pub fn node_count(&self) -> usize {
        [self.road, self.revealed, self.vehicle].iter().flatten().count()
            + usize::from(self.flyover.is_some())
            + self.entities.len()
            + self.particles.len()
            + self.markers.len()
            + self.hud.len()
    }

    /// Create the static nodes (road, vehicle, HUD)
    pub fn build(&mut self, scene: &mut impl Scene, world: &World) {
        self.release(scene);
        let layout = world.layout;
        let road_size = Vec2::new(layout.width, layout.height - layout.ground_y);
        let road_center = Vec2::new(layout.width / 2.0, (layout.ground_y + layout.height) / 2.0);

        let road = scene.create(
            Layer::Background,
            Shape::Rect {
                size: road_size,
                color: palette::ROAD,
            },
        );
        scene.set_transform(road, Transform::at(road_center));
        self.road = Some(road);

        let revealed = scene.create(
            Layer::Revealed,
            Shape::Rect {
                size: road_size,
                color: palette::ROAD_DONE,
            },
        );
        scene.set_transform(revealed, Transform::at(road_center));
        self.revealed = Some(revealed);

        self.vehicle = Some(scene.create(
            Layer::Vehicle,
            Shape::Rect {
                size: Vec2::new(VEHICLE_WIDTH, VEHICLE_HEIGHT),
                color: palette::VEHICLE,
            },
        ));

        for (i, slot) in [HudSlot::Stars, HudSlot::Hits, HudSlot::Speed]
            .into_iter()
            .enumerate()
        {
            let node = scene.create(
                Layer::Hud,
                Shape::Text {
                    text: String::new(),
                    size: 16.0,
                },
            );
            scene.set_transform(node, Transform::at(Vec2::new(16.0, 24.0 + i as f32 * 22.0)));
            self.hud.insert(slot, (node, String::new()));
        }

        self.sync(scene, world);
    }

    /// Bring the scene in line with the world
    pub fn sync(&mut self, scene: &mut impl Scene, world: &World) {
        if let Some(vehicle) = self.vehicle {
            let v = &world.vehicle;
            scene.set_transform(
                vehicle,
                Transform {
                    pos: v.pos,
                    scale: v.scale,
                    rotation: if v.rotated { std::f32::consts::FRAC_PI_2 } else { 0.0 },
                    opacity: v.opacity(),
                },
            );
        }

        let reveal_x = world.progress.reveal_x();
        if self.reveal_x != Some(reveal_x) {
            scene.clip_layer(
                Layer::Revealed,
                Rect {
                    x: 0.0,
                    y: 0.0,
                    width: reveal_x,
                    height: world.layout.height,
                },
            );
            self.reveal_x = Some(reveal_x);
        }

        self.sync_entities(scene, world);
        self.sync_particles(scene, world);
        self.sync_markers(scene, world);
        self.sync_flyover(scene, world);
        self.sync_hud(scene, world);
    }

    fn sync_entities(&mut self, scene: &mut impl Scene, world: &World) {
        let live: Vec<_> = world.track.entities().iter().filter(|e| e.live).collect();
        self.entities.retain(|id, node| {
            let keep = live.iter().any(|e| e.id == *id);
            if !keep {
                scene.destroy(*node);
            }
            keep
        });
        for entity in live {
            let node = *self.entities.entry(entity.id).or_insert_with(|| {
                let color = match entity.kind {
                    EntityKind::Collectible => palette::STAR,
                    EntityKind::Obstacle => palette::OBSTACLE,
                };
                scene.create(
                    Layer::Track,
                    Shape::Rect {
                        size: Vec2::splat(ENTITY_SIZE),
                        color,
                    },
                )
            });
            scene.set_transform(node, Transform::at(entity.pos));
        }
    }

    fn sync_particles(&mut self, scene: &mut impl Scene, world: &World) {
        let particles = world.particles.particles();
        self.particles.retain(|id, (node, kind)| {
            // Recreate when fire has cooled into smoke
            let keep = particles.iter().any(|p| p.id == *id && p.kind == *kind);
            if !keep {
                scene.destroy(*node);
            }
            keep
        });
        for particle in particles {
            let (node, _) = *self.particles.entry(particle.id).or_insert_with(|| {
                let color = match particle.kind {
                    ParticleKind::Smoke => palette::SMOKE,
                    ParticleKind::Fire => palette::FIRE,
                };
                let node = scene.create(
                    Layer::Effects,
                    Shape::Circle {
                        radius: particle.radius,
                        color,
                    },
                );
                (node, particle.kind)
            });
            scene.set_transform(
                node,
                Transform::at(particle.pos).with_opacity(particle.opacity),
            );
        }
    }

    fn sync_markers(&mut self, scene: &mut impl Scene, world: &World) {
        self.markers.retain(|id, node| {
            let keep = world.markers.iter().any(|m| m.id == *id);
            if !keep {
                scene.destroy(*node);
            }
            keep
        });
        for marker in &world.markers {
            let node = *self.markers.entry(marker.id).or_insert_with(|| {
                scene.create(
                    Layer::Effects,
                    Shape::Text {
                        text: marker.kind.text().to_string(),
                        size: 18.0,
                    },
                )
            });
            scene.set_transform(node, Transform::at(marker.pos).with_opacity(marker.opacity()));
        }
    }

    fn sync_flyover(&mut self, scene: &mut impl Scene, world: &World) {
        let current = world.flyover.as_ref().map(|f| f.id);
        if let Some((id, node)) = self.flyover {
            if current != Some(id) {
                scene.destroy(node);
                self.flyover = None;
            }
        }
        if let Some(flyover) = world.flyover.as_ref() {
            let node = match self.flyover {
                Some((_, node)) => node,
                None => {
                    let node = scene.create(
                        Layer::Effects,
                        Shape::Rect {
                            size: Vec2::new(48.0, 16.0),
                            color: palette::PLANE,
                        },
                    );
                    self.flyover = Some((flyover.id, node));
                    node
                }
            };
            scene.set_transform(node, Transform::at(flyover.pos));
        }
    }

    fn sync_hud(&mut self, scene: &mut impl Scene, world: &World) {
        let hud = world.hud();
        let texts = [
            (HudSlot::Stars, hud.stars.as_str()),
            (HudSlot::Hits, hud.hits.as_str()),
            (HudSlot::Speed, hud.speed),
        ];
        for (slot, text) in texts {
            if let Some((node, shown)) = self.hud.get_mut(&slot) {
                // Only touch the node when the text actually changed
                if shown.as_str() != text {
                    scene.set_text(*node, text);
                    *shown = text.to_string();
                }
            }
        }
    }

    /// Destroy every node this sync created
    pub fn release(&mut self, scene: &mut impl Scene) {
        let singles = [self.road.take(), self.revealed.take(), self.vehicle.take()];
        for node in singles.into_iter().flatten() {
            scene.destroy(node);
        }
        if let Some((_, node)) = self.flyover.take() {
            scene.destroy(node);
        }
        for (_, node) in self.entities.drain() {
            scene.destroy(node);
        }
        for (_, (node, _)) in self.particles.drain() {
            scene.destroy(node);
        }
        for (_, node) in self.markers.drain() {
            scene.destroy(node);
        }
        for (_, (node, _)) in self.hud.drain() {
            scene.destroy(node);
        }
        self.reveal_x = None;
    }
}

#[derive(Debug, Clone)]
struct HeadlessNode {
    layer: Layer,
    transform: Transform,
    text: Option<String>,
}

/// In-memory scene for tests and the native demo
#[derive(Debug, Default)]
pub struct HeadlessScene {
    nodes: HashMap<NodeId, HeadlessNode>,
    clips: HashMap<Layer, Rect>,
    next_id: u32,
    frame_loop: bool,
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_in(&self, layer: Layer) -> usize {
        self.nodes.values().filter(|n| n.layer == layer).count()
    }

    /// Current placement of every node in `layer`
    pub fn transforms_in(&self, layer: Layer) -> Vec<Transform> {
        self.nodes
            .values()
            .filter(|n| n.layer == layer)
            .map(|n| n.transform)
            .collect()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.nodes
            .values()
            .filter_map(|n| n.text.as_deref())
            .collect()
    }

    pub fn clip(&self, layer: Layer) -> Option<Rect> {
        self.clips.get(&layer).copied()
    }

    pub fn frame_loop_running(&self) -> bool {
        self.frame_loop
    }
}

impl Scene for HeadlessScene {
    fn create(&mut self, layer: Layer, shape: Shape) -> NodeId {
        self.next_id += 1;
        let id = NodeId(self.next_id);
        let text = match &shape {
            Shape::Text { text, .. } => Some(text.clone()),
            _ => None,
        };
        self.nodes.insert(
            id,
            HeadlessNode {
                layer,
                transform: Transform::at(Vec2::ZERO),
                text,
            },
        );
        id
    }

    fn destroy(&mut self, node: NodeId) {
        if self.nodes.remove(&node).is_none() {
            log::warn!("Destroying unknown node {:?}", node);
        }
    }

    fn set_transform(&mut self, node: NodeId, transform: Transform) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.transform = transform;
        }
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(n) = self.nodes.get_mut(&node) {
            n.text = Some(text.to_string());
        }
    }

    fn clip_layer(&mut self, layer: Layer, rect: Rect) {
        self.clips.insert(layer, rect);
    }

    fn set_frame_loop(&mut self, running: bool) {
        self.frame_loop = running;
    }
}

/// Host with a fixed, settable container size
#[derive(Debug, Default)]
pub struct StaticHost {
    pub size: Option<Size>,
    observing: bool,
}

impl StaticHost {
    pub fn new(size: Option<Size>) -> Self {
        Self {
            size,
            observing: false,
        }
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }
}

impl Host for StaticHost {
    fn container_size(&self) -> Option<Size> {
        self.size
    }

    fn observe_resize(&mut self, observe: bool) {
        self.observing = observe;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::sim::{EntityKind, Layout, tick};

    fn world() -> World {
        World::new(&Settings::default(), Layout::new(800.0, 400.0).unwrap())
    }

    #[test]
    fn test_build_and_release() {
        let world = world();
        let mut scene = HeadlessScene::new();
        let mut sync = SceneSync::new();

        sync.build(&mut scene, &world);
        // road, revealed road, vehicle, three HUD labels
        assert_eq!(scene.node_count(), 6);
        assert_eq!(sync.node_count(), 6);
        assert!(scene.texts().contains(&"0/50"));

        sync.release(&mut scene);
        assert_eq!(scene.node_count(), 0);
        assert_eq!(sync.node_count(), 0);
    }

    #[test]
    fn test_entities_follow_world() {
        let mut world = world();
        let mut scene = HeadlessScene::new();
        let mut sync = SceneSync::new();
        sync.build(&mut scene, &world);

        world.spawn(EntityKind::Collectible);
        world.spawn(EntityKind::Obstacle);
        sync.sync(&mut scene, &world);
        assert_eq!(scene.nodes_in(Layer::Track), 2);
        let spawn_x = world.layout.spawn_x();
        assert!(scene.transforms_in(Layer::Track).iter().all(|t| t.pos.x == spawn_x));

        tick(&mut world, 0.1);
        sync.sync(&mut scene, &world);
        assert!(scene.transforms_in(Layer::Track).iter().all(|t| t.pos.x < spawn_x));

        world.track.clear();
        sync.sync(&mut scene, &world);
        assert_eq!(scene.nodes_in(Layer::Track), 0);
    }

    #[test]
    fn test_reveal_clip_tracks_progress() {
        let mut world = world();
        let mut scene = HeadlessScene::new();
        let mut sync = SceneSync::new();
        sync.build(&mut scene, &world);
        assert_eq!(scene.clip(Layer::Revealed).map(|r| r.width), Some(0.0));

        let pos = world.vehicle.pos;
        for _ in 0..25 {
            world.collect_star(pos);
        }
        tick(&mut world, SIM_DT);
        sync.sync(&mut scene, &world);
        assert_eq!(scene.clip(Layer::Revealed).map(|r| r.width), Some(400.0));
        assert!(scene.texts().contains(&"25/50"));
    }
}
