use eframe::egui::Vec2;

use super::quadtree::QuadNode;

fn repulsion_between(point: Vec2, other: Vec2, mass_product: f32, scaling_ratio: f32) -> Vec2 {
    let delta = point - other;
    let distance_sq = delta.length_sq();
    if distance_sq <= f32::EPSILON {
        return Vec2::ZERO;
    }
    delta * (scaling_ratio * mass_product / distance_sq)
}

pub(super) fn accumulate_exact_repulsion(
    positions: &[Vec2],
    masses: &[f32],
    scaling_ratio: f32,
    forces: &mut [Vec2],
) {
    let node_count = positions.len();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let force = repulsion_between(
                positions[i],
                positions[j],
                masses[i] * masses[j],
                scaling_ratio,
            );
            forces[i] += force;
            forces[j] -= force;
        }
    }
}

pub(super) fn accumulate_repulsion_for_node(
    node: &QuadNode,
    index: usize,
    positions: &[Vec2],
    masses: &[f32],
    scaling_ratio: f32,
    theta: f32,
    force: &mut Vec2,
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
            *force += repulsion_between(
                point,
                positions[other_index],
                masses[index] * masses[other_index],
                scaling_ratio,
            );
        }
        return;
    }

    let delta = point - node.center_of_mass;
    let distance_sq = delta.length_sq().max(0.0001);
    let distance = distance_sq.sqrt();
    let can_approximate =
        !node.bounds.contains(point) && (node.bounds.side_length() / distance) < theta;

    if can_approximate {
        *force += delta * (scaling_ratio * masses[index] * node.mass / distance_sq);
        return;
    }

    for child in node.children.iter().flatten() {
        accumulate_repulsion_for_node(
            child,
            index,
            positions,
            masses,
            scaling_ratio,
            theta,
            force,
        );
    }
}

pub(super) fn accumulate_gravity(
    positions: &[Vec2],
    masses: &[f32],
    gravity: f32,
    forces: &mut [Vec2],
) {
    for ((position, mass), force) in positions.iter().zip(masses).zip(forces.iter_mut()) {
        let distance = position.length();
        if distance > 0.0 {
            *force -= *position * (gravity * mass / distance);
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct AttractionParams {
    pub(super) edge_weight_influence: f32,
    pub(super) lin_log: bool,
    pub(super) distributed: bool,
    pub(super) compensation: f32,
}

pub(super) fn accumulate_attraction(
    positions: &[Vec2],
    masses: &[f32],
    edges: &[(usize, usize, f32)],
    params: AttractionParams,
    forces: &mut [Vec2],
) {
    let node_count = positions.len();
    let coefficient = if params.distributed {
        params.compensation
    } else {
        1.0
    };

    for &(from, to, weight) in edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let influence = if params.edge_weight_influence == 0.0 {
            1.0
        } else if params.edge_weight_influence == 1.0 {
            weight
        } else {
            weight.max(0.0).powf(params.edge_weight_influence)
        };

        let delta = positions[from] - positions[to];
        let distance = delta.length();
        if distance <= 0.0 {
            continue;
        }

        let mut factor = if params.lin_log {
            -coefficient * influence * (1.0 + distance).ln() / distance
        } else {
            -coefficient * influence
        };
        if params.distributed {
            factor /= masses[from];
        }

        forces[from] += delta * factor;
        forces[to] -= delta * factor;
    }
}
