use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const MIN_DISTANCE_SQ: f32 = 1.0;

/// Deterministic stand-in direction for coincident bodies.
pub(super) fn separation_fallback(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

/// Velocity change on a body at `point` from `mass` bodies at `source`.
/// Magnitude falls off with distance; negative strength repels.
fn charge_between(point: Vec2, source: Vec2, strength: f32, mass: f32, fallback: Vec2) -> Vec2 {
    let delta = source - point;
    let distance_sq = delta.length_sq();
    if distance_sq <= f32::EPSILON {
        return -fallback * (strength.abs() * mass);
    }
    delta * (strength * mass / distance_sq.max(MIN_DISTANCE_SQ))
}

pub(super) fn accumulate_charge_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    delta_velocity: &mut Vec2,
) {
    if node.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if node.is_leaf() {
        for &other_index in &node.indices {
            if other_index == index {
                continue;
            }
            *delta_velocity += charge_between(
                point,
                positions[other_index],
                strength,
                1.0,
                separation_fallback(other_index, index),
            );
        }
        return;
    }

    let distance = (node.center_of_mass - point).length().max(1.0);
    let can_approximate = !node.bounds.contains(point)
        && (node.bounds.side_length() / distance) < theta
        && node.mass > 1.0;

    if can_approximate {
        *delta_velocity += charge_between(
            point,
            node.center_of_mass,
            strength,
            node.mass,
            Vec2::ZERO,
        );
        return;
    }

    for child in node.children() {
        accumulate_charge_for_node(child, index, positions, strength, theta, delta_velocity);
    }
}

#[derive(Clone, Copy)]
pub(super) struct CollisionParams {
    pub(super) strength: f32,
}

/// Accumulates overlap corrections between every pair of bodies whose
/// predicted circles intersect. Heavier (larger) bodies move less.
pub(super) fn accumulate_collision_pairs(
    node_a: &QuadNode,
    node_b: &QuadNode,
    same_node: bool,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    corrections: &mut [Vec2],
) {
    if node_a.bounds.gap_to(node_b.bounds) > node_a.max_radius + node_b.max_radius {
        return;
    }

    if node_a.is_leaf() && node_b.is_leaf() {
        if same_node {
            for (offset, &from) in node_a.indices.iter().enumerate() {
                for &to in &node_a.indices[offset + 1..] {
                    resolve_pair(from, to, predicted, radii, params, corrections);
                }
            }
        } else {
            for &from in &node_a.indices {
                for &to in &node_b.indices {
                    resolve_pair(from, to, predicted, radii, params, corrections);
                }
            }
        }
        return;
    }

    if same_node {
        let children = node_a.children().collect::<Vec<_>>();
        for (offset, child_a) in children.iter().enumerate() {
            accumulate_collision_pairs(
                child_a, child_a, true, predicted, radii, params, corrections,
            );
            for child_b in &children[offset + 1..] {
                accumulate_collision_pairs(
                    child_a, child_b, false, predicted, radii, params, corrections,
                );
            }
        }
        return;
    }

    let split_a = if node_a.is_leaf() {
        false
    } else if node_b.is_leaf() {
        true
    } else {
        node_a.bounds.half_extent >= node_b.bounds.half_extent
    };

    if split_a {
        for child in node_a.children() {
            accumulate_collision_pairs(child, node_b, false, predicted, radii, params, corrections);
        }
    } else {
        for child in node_b.children() {
            accumulate_collision_pairs(node_a, child, false, predicted, radii, params, corrections);
        }
    }
}

fn resolve_pair(
    from: usize,
    to: usize,
    predicted: &[Vec2],
    radii: &[f32],
    params: CollisionParams,
    corrections: &mut [Vec2],
) {
    let reach = radii[from] + radii[to];
    let delta = predicted[from] - predicted[to];
    let distance_sq = delta.length_sq();
    if distance_sq >= reach * reach {
        return;
    }

    let distance = distance_sq.sqrt();
    let (direction, distance) = if distance > 0.0001 {
        (delta / distance, distance)
    } else {
        (separation_fallback(from, to), 0.0)
    };

    let push = direction * ((reach - distance) * params.strength);
    let from_sq = radii[from] * radii[from];
    let to_sq = radii[to] * radii[to];
    let total = (from_sq + to_sq).max(f32::EPSILON);

    corrections[from] += push * (to_sq / total);
    corrections[to] -= push * (from_sq / total);
}
