mod forces;
mod quadtree;

use eframe::egui::Vec2;

use super::layout::{Layout, clamp_to_bounds};
use forces::{
    CollisionParams, accumulate_charge_for_node, accumulate_collision_pairs, separation_fallback,
};
use quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.9;

const NODE_CHARGE: f32 = -40.0;
const NODE_COLLISION_BUFFER: f32 = 14.0;
const NODE_COLLISION_ITERATIONS: usize = 2;
const NODE_CLUSTER_PULL: f32 = 0.32;
const NODE_RADIAL_STRENGTH: f32 = 0.18;
const NODE_CLUSTER_SPRING: f32 = 0.008;
const NODE_CLUSTER_EXCESS_PULL: f32 = 0.02;
const NODE_CLUSTER_SOFT_LIMIT: f32 = 0.75;
const NODE_ALPHA_DECAY: f32 = 0.075;
const NODE_VELOCITY_DECAY: f32 = 0.42;
const DRAG_ALPHA_TARGET: f32 = 0.18;
const REHEAT_ALPHA: f32 = 0.6;

const CLUSTER_CHARGE: f32 = -320.0;
const CLUSTER_LINK_DISTANCE: f32 = 220.0;
const CLUSTER_LINK_STRENGTH: f32 = 0.25;
const CLUSTER_ANCHOR_STRENGTH: f32 = 0.12;
const CLUSTER_COLLISION_BUFFER: f32 = 90.0;
const CLUSTER_COLLISION_STRENGTH: f32 = 0.75;
const CLUSTER_ALPHA_START: f32 = 0.9;
const CLUSTER_ALPHA_DECAY: f32 = 0.08;
const CLUSTER_VELOCITY_DECAY: f32 = 0.4;

const ALPHA_MIN: f32 = 0.001;

/// Cooling schedule shared by both simulations: every tick `value` moves a
/// fixed fraction of the way toward `target`, and the simulation rests once
/// `value` drops below `min`. A target above `min` keeps it, or brings it
/// back, awake.
#[derive(Clone, Copy, Debug)]
pub struct Alpha {
    pub value: f32,
    pub target: f32,
    decay: f32,
    min: f32,
}

impl Alpha {
    fn new(value: f32, decay: f32) -> Self {
        Self {
            value,
            target: 0.0,
            decay,
            min: ALPHA_MIN,
        }
    }

    fn advance(&mut self) -> f32 {
        self.value += (self.target - self.value) * self.decay;
        self.value
    }

    pub fn is_cool(&self) -> bool {
        self.value < self.min && self.target < self.min
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationMode {
    Running,
    Frozen,
    /// A drag is in progress and is feeding energy into the layout.
    Perturbed,
}

struct NodeScratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
    corrections: Vec<Vec2>,
    collision_radii: Vec<f32>,
    cluster_centers: Vec<Vec2>,
}

pub struct NodeSimulation {
    mode: SimulationMode,
    alpha: Alpha,
    scratch: NodeScratch,
}

impl NodeSimulation {
    pub fn new(frozen: bool) -> Self {
        Self {
            mode: if frozen {
                SimulationMode::Frozen
            } else {
                SimulationMode::Running
            },
            alpha: Alpha::new(1.0, NODE_ALPHA_DECAY),
            scratch: NodeScratch {
                positions: Vec::new(),
                predicted: Vec::new(),
                velocities: Vec::new(),
                corrections: Vec::new(),
                collision_radii: Vec::new(),
                cluster_centers: Vec::new(),
            },
        }
    }

    pub fn mode(&self) -> SimulationMode {
        self.mode
    }

    pub fn alpha(&self) -> Alpha {
        self.alpha
    }

    pub fn is_resting(&self) -> bool {
        match self.mode {
            SimulationMode::Frozen => true,
            SimulationMode::Running | SimulationMode::Perturbed => self.alpha.is_cool(),
        }
    }

    pub fn set_frozen(&mut self, frozen: bool, dragging: bool) {
        match (frozen, self.mode) {
            (true, _) => {
                self.alpha.target = 0.0;
                self.mode = SimulationMode::Frozen;
            }
            (false, SimulationMode::Frozen) => {
                self.alpha.value = REHEAT_ALPHA;
                if dragging {
                    self.alpha.target = DRAG_ALPHA_TARGET;
                    self.mode = SimulationMode::Perturbed;
                } else {
                    self.mode = SimulationMode::Running;
                }
            }
            (false, _) => {}
        }
    }

    pub fn begin_drag(&mut self) {
        if self.mode == SimulationMode::Frozen {
            return;
        }
        self.alpha.target = DRAG_ALPHA_TARGET;
        self.mode = SimulationMode::Perturbed;
    }

    pub fn end_drag(&mut self) {
        if self.mode == SimulationMode::Perturbed {
            self.alpha.target = 0.0;
            self.mode = SimulationMode::Running;
        }
    }

    pub fn stop(&mut self) {
        self.alpha.value = 0.0;
        self.alpha.target = 0.0;
    }

    /// Advances the node layout by one tick. Returns whether any node moved.
    pub fn step(&mut self, layout: &mut Layout) -> bool {
        if self.mode == SimulationMode::Frozen || self.alpha.is_cool() {
            if self.alpha.is_cool() {
                for node in &mut layout.nodes {
                    node.velocity = Vec2::ZERO;
                }
            }
            return apply_pins(layout);
        }

        let node_count = layout.nodes.len();
        if node_count == 0 {
            return false;
        }

        let alpha = self.alpha.advance();
        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.velocities.clear();
        scratch.collision_radii.clear();
        for node in &layout.nodes {
            scratch.positions.push(node.world_pos);
            scratch.velocities.push(node.velocity);
            scratch.collision_radii.push(node.radius + NODE_COLLISION_BUFFER);
        }
        scratch.cluster_centers.clear();
        scratch
            .cluster_centers
            .extend(layout.clusters.iter().map(|cluster| cluster.center));

        let positions = &scratch.positions;
        let velocities = &mut scratch.velocities;
        let view_center = layout.center();

        if node_count > 1
            && let Some(tree) = QuadNode::build(positions, &scratch.collision_radii)
        {
            for (index, velocity) in velocities.iter_mut().enumerate() {
                accumulate_charge_for_node(
                    &tree,
                    index,
                    positions,
                    NODE_CHARGE * alpha,
                    BARNES_HUT_THETA,
                    velocity,
                );
            }
        }

        for (index, node) in layout.nodes.iter().enumerate() {
            let position = positions[index];
            let Some(&cluster_center) = scratch.cluster_centers.get(node.cluster) else {
                continue;
            };

            velocities[index] += (cluster_center - position) * (NODE_CLUSTER_PULL * alpha);

            let from_view_center = position - view_center;
            let radial_distance = from_view_center.length().max(1e-6);
            let radial = (layout.orbit_radius - radial_distance) * NODE_RADIAL_STRENGTH * alpha
                / radial_distance;
            velocities[index] += from_view_center * radial;

            if node.pin.is_none() {
                let cluster_radius = layout.clusters[node.cluster].radius;
                velocities[index] += cluster_spring(position, cluster_center, cluster_radius);
            }
        }

        for _ in 0..NODE_COLLISION_ITERATIONS {
            scratch.predicted.clear();
            scratch.predicted.extend(
                positions
                    .iter()
                    .zip(velocities.iter())
                    .map(|(position, velocity)| *position + *velocity),
            );
            scratch.corrections.clear();
            scratch.corrections.resize(node_count, Vec2::ZERO);

            let Some(tree) = QuadNode::build(&scratch.predicted, &scratch.collision_radii) else {
                break;
            };
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                &scratch.predicted,
                &scratch.collision_radii,
                CollisionParams { strength: 1.0 },
                &mut scratch.corrections,
            );
            for (velocity, correction) in velocities.iter_mut().zip(scratch.corrections.iter()) {
                *velocity += *correction;
            }
        }

        let size = layout.size;
        let retain = 1.0 - NODE_VELOCITY_DECAY;
        let mut any_motion = false;
        for (index, node) in layout.nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.world_pos = pin;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = velocities[index] * retain;
            let unclamped = node.world_pos + velocity;
            let mut next = clamp_to_bounds(unclamped, node.radius, size);
            if next.x != unclamped.x {
                velocity.x = 0.0;
            }
            if next.y != unclamped.y {
                velocity.y = 0.0;
            }
            if !next.x.is_finite() || !next.y.is_finite() {
                next = clamp_to_bounds(scratch.cluster_centers[node.cluster], node.radius, size);
                velocity = Vec2::ZERO;
            }

            if velocity.length_sq() > 0.000_001 {
                any_motion = true;
            }
            node.velocity = velocity;
            node.world_pos = next;
        }

        any_motion
    }
}

/// Soft containment: a gentle pull toward the cluster center that stiffens
/// once a node strays past the soft limit of the cluster radius.
fn cluster_spring(position: Vec2, center: Vec2, cluster_radius: f32) -> Vec2 {
    let offset = position - center;
    let distance = offset.length();
    let mut delta = -offset * NODE_CLUSTER_SPRING;

    let soft_limit = cluster_radius * NODE_CLUSTER_SOFT_LIMIT;
    if distance > soft_limit && distance > 0.0 {
        delta -= offset / distance * ((distance - soft_limit) * NODE_CLUSTER_EXCESS_PULL);
    }
    delta
}

fn apply_pins(layout: &mut Layout) -> bool {
    let mut moved = false;
    for node in &mut layout.nodes {
        if let Some(pin) = node.pin {
            moved |= node.world_pos != pin;
            node.world_pos = pin;
            node.velocity = Vec2::ZERO;
        }
    }
    moved
}

pub struct ClusterSimulation {
    alpha: Alpha,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
}

impl Default for ClusterSimulation {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterSimulation {
    pub fn new() -> Self {
        Self {
            alpha: Alpha::new(CLUSTER_ALPHA_START, CLUSTER_ALPHA_DECAY),
            positions: Vec::new(),
            velocities: Vec::new(),
        }
    }

    pub fn is_resting(&self) -> bool {
        self.alpha.is_cool()
    }

    pub fn stop(&mut self) {
        self.alpha.value = 0.0;
    }

    /// Moves cluster centers one tick. Returns whether any center moved.
    pub fn step(&mut self, layout: &mut Layout) -> bool {
        let cluster_count = layout.clusters.len();
        if cluster_count == 0 || self.alpha.is_cool() {
            for cluster in &mut layout.clusters {
                cluster.velocity = Vec2::ZERO;
            }
            return false;
        }

        let alpha = self.alpha.advance();
        self.positions.clear();
        self.velocities.clear();
        for cluster in &layout.clusters {
            self.positions.push(cluster.center);
            self.velocities.push(cluster.velocity);
        }
        let positions = &self.positions;
        let velocities = &mut self.velocities;

        for i in 0..cluster_count {
            for j in (i + 1)..cluster_count {
                let delta = positions[j] - positions[i];
                let distance_sq = delta.length_sq();
                let push = if distance_sq > f32::EPSILON {
                    delta * (CLUSTER_CHARGE * alpha / distance_sq.max(1.0))
                } else {
                    -separation_fallback(i, j) * (CLUSTER_CHARGE.abs() * alpha)
                };
                velocities[i] += push;
                velocities[j] -= push;
            }
        }

        for &(source, target) in &layout.ring_links {
            if source == target || source >= cluster_count || target >= cluster_count {
                continue;
            }
            let delta = positions[target] - positions[source];
            let distance = delta.length();
            if distance <= 0.0001 {
                continue;
            }
            let stretch = (distance - CLUSTER_LINK_DISTANCE) / distance
                * (alpha * CLUSTER_LINK_STRENGTH);
            let correction = delta * (stretch * 0.5);
            velocities[target] -= correction;
            velocities[source] += correction;
        }

        for (index, cluster) in layout.clusters.iter().enumerate() {
            velocities[index] += (cluster.anchor - positions[index]) * (CLUSTER_ANCHOR_STRENGTH * alpha);
        }

        let mut corrections = vec![Vec2::ZERO; cluster_count];
        for i in 0..cluster_count {
            for j in (i + 1)..cluster_count {
                let reach = layout.clusters[i].radius
                    + layout.clusters[j].radius
                    + 2.0 * CLUSTER_COLLISION_BUFFER;
                let delta = (positions[i] + velocities[i]) - (positions[j] + velocities[j]);
                let distance = delta.length();
                if distance >= reach {
                    continue;
                }
                let direction = if distance > 0.0001 {
                    delta / distance
                } else {
                    separation_fallback(i, j)
                };
                let push = direction * ((reach - distance) * CLUSTER_COLLISION_STRENGTH * 0.5);
                corrections[i] += push;
                corrections[j] -= push;
            }
        }

        let retain = 1.0 - CLUSTER_VELOCITY_DECAY;
        let mut any_motion = false;
        for (index, cluster) in layout.clusters.iter_mut().enumerate() {
            let velocity = (velocities[index] + corrections[index]) * retain;
            if velocity.length_sq() > 0.000_001 {
                any_motion = true;
            }
            cluster.velocity = velocity;
            cluster.center += velocity;
        }

        any_motion
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use eframe::egui::vec2;

    use super::*;
    use crate::map::entity::Entity;
    use crate::map::layout::{BOUNDARY_MARGIN, build_layout};

    /// Cluster centers stop moving by this tick; before it they may still
    /// feed energy into the nodes.
    const SETTLING_WARM_UP_TICKS: usize = 90;
    const SETTLING_ENERGY_TOLERANCE: f32 = 0.05;
    const SETTLING_ENERGY_FLOOR: f32 = 1e-2;

    fn roster(count: usize, tags: &[&str]) -> Vec<Entity> {
        (0..count)
            .map(|index| {
                Entity::new(format!("e{index}"), format!("Entity {index}"))
                    .with_tags([tags[index % tags.len()], "Docker"])
                    .with_count(index % 5)
            })
            .collect()
    }

    fn kinetic_energy(layout: &Layout) -> f32 {
        layout
            .nodes
            .iter()
            .map(|node| node.velocity.length_sq())
            .sum()
    }

    fn run(layout: &mut Layout, nodes: &mut NodeSimulation, ticks: usize) {
        let mut clusters = ClusterSimulation::new();
        for _ in 0..ticks {
            clusters.step(layout);
            nodes.step(layout);
        }
    }

    #[test]
    fn alpha_cools_below_minimum() {
        let mut alpha = Alpha::new(1.0, NODE_ALPHA_DECAY);
        let mut ticks = 0;
        while !alpha.is_cool() {
            alpha.advance();
            ticks += 1;
        }
        assert!(ticks < 150, "took {ticks} ticks");
    }

    #[test]
    fn drag_target_keeps_alpha_warm() {
        let mut simulation = NodeSimulation::new(false);
        simulation.begin_drag();
        for _ in 0..400 {
            simulation.alpha.advance();
        }
        assert_eq!(simulation.mode(), SimulationMode::Perturbed);
        assert!(!simulation.is_resting());

        simulation.end_drag();
        assert_eq!(simulation.mode(), SimulationMode::Running);
        assert_eq!(simulation.alpha().target, 0.0);
    }

    #[test]
    fn freeze_during_drag_survives_release() {
        let mut simulation = NodeSimulation::new(false);
        simulation.begin_drag();
        simulation.set_frozen(true, true);
        simulation.end_drag();
        assert_eq!(simulation.mode(), SimulationMode::Frozen);

        simulation.set_frozen(false, false);
        assert_eq!(simulation.mode(), SimulationMode::Running);
        assert_eq!(simulation.alpha().value, REHEAT_ALPHA);
    }

    #[test]
    fn nodes_settle_without_overlap() {
        let mut layout = build_layout(
            roster(24, &["Rust", "React", "ML", "Python", "Docker"]),
            vec2(1200.0, 900.0),
            &HashSet::new(),
        );
        let mut simulation = NodeSimulation::new(false);
        run(&mut layout, &mut simulation, 150);

        assert!(simulation.is_resting());
        assert!(kinetic_energy(&layout) < 1e-6);
        for i in 0..layout.nodes.len() {
            for j in (i + 1)..layout.nodes.len() {
                let (a, b) = (&layout.nodes[i], &layout.nodes[j]);
                let distance = (a.world_pos - b.world_pos).length();
                assert!(
                    distance >= a.radius + b.radius - 0.5,
                    "nodes {i} and {j} overlap: {distance}"
                );
            }
        }
    }

    #[test]
    fn every_tick_respects_the_boundary() {
        let mut layout = build_layout(
            roster(30, &["Go", "Vue", "AI", "Node", "Java"]),
            vec2(900.0, 700.0),
            &HashSet::new(),
        );
        let mut nodes = NodeSimulation::new(false);
        let mut clusters = ClusterSimulation::new();
        for _ in 0..120 {
            clusters.step(&mut layout);
            nodes.step(&mut layout);
            for node in &layout.nodes {
                let low = node.radius + BOUNDARY_MARGIN - 1e-3;
                assert!(node.world_pos.x >= low && node.world_pos.y >= low);
                assert!(node.world_pos.x <= layout.size.x - low);
                assert!(node.world_pos.y <= layout.size.y - low);
            }
        }
    }

    #[test]
    fn energy_never_grows_once_cluster_centers_rest() {
        let mut layout = build_layout(
            roster(20, &["Rust", "ML"]),
            vec2(1000.0, 800.0),
            &HashSet::new(),
        );
        let mut nodes = NodeSimulation::new(false);
        let mut clusters = ClusterSimulation::new();
        let mut energy = Vec::new();
        let mut clusters_rest_at = None;
        for tick in 0..150 {
            clusters.step(&mut layout);
            nodes.step(&mut layout);
            energy.push(kinetic_energy(&layout));
            if clusters_rest_at.is_none() && clusters.is_resting() {
                clusters_rest_at = Some(tick);
            }
        }

        let warm_up = clusters_rest_at.unwrap_or_else(|| panic!("cluster centers never rested"));
        assert!(warm_up <= SETTLING_WARM_UP_TICKS, "clusters rested at tick {warm_up}");
        for tick in warm_up..energy.len() - 1 {
            let (before, after) = (energy[tick], energy[tick + 1]);
            assert!(
                after <= before * (1.0 + SETTLING_ENERGY_TOLERANCE) + SETTLING_ENERGY_FLOOR,
                "energy rose from {before} to {after} at tick {}",
                tick + 1
            );
        }
        assert!(energy[149] < 1e-6);
    }

    #[test]
    fn drag_after_settling_reheats_and_moves_neighbours() {
        let mut layout = build_layout(
            roster(20, &["Rust", "ML"]),
            vec2(1000.0, 800.0),
            &HashSet::new(),
        );
        let mut simulation = NodeSimulation::new(false);
        run(&mut layout, &mut simulation, 300);
        assert!(simulation.is_resting());
        let settled = layout.nodes.iter().map(|node| node.world_pos).collect::<Vec<_>>();

        simulation.begin_drag();
        assert!(!simulation.is_resting());
        layout.nodes[0].pin = Some(settled[2]);
        assert!(simulation.step(&mut layout));
        let reheated = simulation.alpha().value;
        assert!(reheated > ALPHA_MIN * 10.0, "alpha only reached {reheated}");

        for _ in 0..30 {
            simulation.step(&mut layout);
        }
        assert!((layout.nodes[2].world_pos - settled[2]).length() > 1.0);
    }

    #[test]
    fn frozen_simulation_only_moves_pinned_nodes() {
        let mut layout = build_layout(roster(6, &["Rust"]), vec2(800.0, 600.0), &HashSet::new());
        let mut simulation = NodeSimulation::new(true);
        let before = layout.nodes.iter().map(|node| node.world_pos).collect::<Vec<_>>();

        layout.nodes[2].pin = Some(vec2(100.0, 120.0));
        assert!(simulation.step(&mut layout));

        for (index, node) in layout.nodes.iter().enumerate() {
            if index == 2 {
                assert_eq!(node.world_pos, vec2(100.0, 120.0));
            } else {
                assert_eq!(node.world_pos, before[index]);
            }
        }
    }

    #[test]
    fn cluster_centers_spread_apart() {
        let mut layout = build_layout(
            roster(10, &["Rust", "ML", "React"]),
            vec2(1200.0, 900.0),
            &HashSet::new(),
        );
        let mut clusters = ClusterSimulation::new();
        for _ in 0..200 {
            clusters.step(&mut layout);
        }

        assert!(clusters.is_resting());
        let a = layout.clusters[0].center;
        let b = layout.clusters[1].center;
        assert!((a - b).length() > CLUSTER_LINK_DISTANCE);
        assert!(layout.clusters.iter().all(|cluster| cluster.center.x.is_finite()));
    }

    #[test]
    fn empty_layout_is_inert() {
        let mut layout = build_layout(Vec::new(), vec2(640.0, 480.0), &HashSet::new());
        let mut nodes = NodeSimulation::new(false);
        let mut clusters = ClusterSimulation::new();
        assert!(!clusters.step(&mut layout));
        assert!(!nodes.step(&mut layout));
    }
}
