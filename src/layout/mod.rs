mod forces;
mod quadtree;

use std::time::{Duration, Instant};

use eframe::egui::Vec2;
use thiserror::Error;

use forces::{
    AttractionParams, accumulate_attraction, accumulate_exact_repulsion, accumulate_gravity,
    accumulate_repulsion_for_node,
};
use quadtree::QuadNode;

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("layout diverged at iteration {iteration}")]
    Diverged { iteration: usize },
    #[error("{masses} masses supplied for {positions} positions")]
    MassMismatch { positions: usize, masses: usize },
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutConfig {
    pub gravity: f32,
    pub scaling_ratio: f32,
    pub large_graph_threshold: usize,
    pub barnes_hut_threshold: usize,
    pub barnes_hut_theta: f32,
    pub edge_weight_influence: f32,
    pub full_slow_down: f32,
    pub cached_slow_down: f32,
    pub min_iterations: usize,
    pub max_iterations: usize,
    /// Full budget is `iteration_base - node_count`, clamped to the bounds above.
    pub iteration_base: usize,
    pub cached_iteration_cap: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            gravity: 1.0,
            scaling_ratio: 10.0,
            large_graph_threshold: 100,
            barnes_hut_threshold: 30,
            barnes_hut_theta: 0.5,
            edge_weight_influence: 0.5,
            full_slow_down: 10.0,
            cached_slow_down: 5.0,
            min_iterations: 50,
            max_iterations: 100,
            iteration_base: 150,
            cached_iteration_cap: 20,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ForceAtlas2Settings {
    pub gravity: f32,
    pub scaling_ratio: f32,
    pub barnes_hut_optimize: bool,
    pub barnes_hut_theta: f32,
    pub edge_weight_influence: f32,
    pub lin_log_mode: bool,
    pub outbound_attraction_distribution: bool,
    pub slow_down: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LayoutPlan {
    pub iterations: usize,
    pub mostly_cached: bool,
    pub settings: ForceAtlas2Settings,
}

impl LayoutPlan {
    pub fn for_graph(node_count: usize, mostly_cached: bool, config: &LayoutConfig) -> Self {
        let full_budget = config
            .iteration_base
            .saturating_sub(node_count)
            .clamp(config.min_iterations, config.max_iterations);

        let (iterations, slow_down) = if mostly_cached {
            (
                full_budget.min(config.cached_iteration_cap),
                config.cached_slow_down,
            )
        } else {
            (full_budget, config.full_slow_down)
        };

        let scaling_ratio = if node_count > config.large_graph_threshold {
            config.scaling_ratio * 2.0
        } else {
            config.scaling_ratio
        };

        Self {
            iterations,
            mostly_cached,
            settings: ForceAtlas2Settings {
                gravity: config.gravity,
                scaling_ratio,
                barnes_hut_optimize: node_count > config.barnes_hut_threshold,
                barnes_hut_theta: config.barnes_hut_theta,
                edge_weight_influence: config.edge_weight_influence,
                lin_log_mode: true,
                outbound_attraction_distribution: true,
                slow_down,
            },
        }
    }
}

#[derive(Clone, Debug)]
pub struct LayoutJob {
    pub positions: Vec<Vec2>,
    pub masses: Vec<f32>,
    /// `(from, to, weight)` index pairs into `positions`.
    pub edges: Vec<(usize, usize, f32)>,
    pub plan: LayoutPlan,
}

#[derive(Clone, Debug)]
pub struct LayoutOutcome {
    pub positions: Vec<Vec2>,
    pub iterations: usize,
    pub elapsed: Duration,
}

impl LayoutJob {
    pub fn run(self) -> Result<LayoutOutcome, LayoutError> {
        let started = Instant::now();
        let Self {
            mut positions,
            masses,
            edges,
            plan,
        } = self;

        if masses.len() != positions.len() {
            return Err(LayoutError::MassMismatch {
                positions: positions.len(),
                masses: masses.len(),
            });
        }

        let node_count = positions.len();
        if node_count < 2 {
            return Ok(LayoutOutcome {
                positions,
                iterations: 0,
                elapsed: started.elapsed(),
            });
        }

        let settings = &plan.settings;
        let compensation = masses.iter().sum::<f32>() / node_count as f32;
        let attraction = AttractionParams {
            edge_weight_influence: settings.edge_weight_influence,
            lin_log: settings.lin_log_mode,
            distributed: settings.outbound_attraction_distribution,
            compensation,
        };

        let mut forces = vec![Vec2::ZERO; node_count];
        let mut previous = vec![Vec2::ZERO; node_count];

        for iteration in 0..plan.iterations {
            std::mem::swap(&mut forces, &mut previous);
            forces.fill(Vec2::ZERO);

            let tree = if settings.barnes_hut_optimize {
                QuadNode::build(&positions, &masses)
            } else {
                None
            };
            match &tree {
                Some(tree) => {
                    for (index, force) in forces.iter_mut().enumerate() {
                        accumulate_repulsion_for_node(
                            tree,
                            index,
                            &positions,
                            &masses,
                            settings.scaling_ratio,
                            settings.barnes_hut_theta,
                            force,
                        );
                    }
                }
                None => {
                    accumulate_exact_repulsion(
                        &positions,
                        &masses,
                        settings.scaling_ratio,
                        &mut forces,
                    );
                }
            }

            accumulate_gravity(&positions, &masses, settings.gravity, &mut forces);
            accumulate_attraction(&positions, &masses, &edges, attraction, &mut forces);

            for index in 0..node_count {
                let force = forces[index];
                let old = previous[index];
                let swinging = masses[index] * (old - force).length();
                let traction = (old + force).length() * 0.5;
                let speed = (0.1 * (1.0 + traction).ln()) / (1.0 + swinging.sqrt());
                positions[index] += force * (speed / settings.slow_down);
            }

            if positions
                .iter()
                .any(|position| !position.x.is_finite() || !position.y.is_finite())
            {
                return Err(LayoutError::Diverged { iteration });
            }
        }

        Ok(LayoutOutcome {
            positions,
            iterations: plan.iterations,
            elapsed: started.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn full_budget_shrinks_with_node_count() {
        let config = LayoutConfig::default();
        assert_eq!(LayoutPlan::for_graph(10, false, &config).iterations, 100);
        assert_eq!(LayoutPlan::for_graph(75, false, &config).iterations, 75);
        assert_eq!(LayoutPlan::for_graph(400, false, &config).iterations, 50);
    }

    #[test]
    fn mostly_cached_graphs_run_fewer_gentler_iterations() {
        let config = LayoutConfig::default();
        let cached = LayoutPlan::for_graph(40, true, &config);
        assert!(cached.mostly_cached);
        assert_eq!(cached.iterations, 20);
        assert_eq!(cached.settings.slow_down, config.cached_slow_down);

        let fresh = LayoutPlan::for_graph(40, false, &config);
        assert!(!fresh.mostly_cached);
        assert_eq!(fresh.iterations, 100);
        assert_eq!(fresh.settings.slow_down, config.full_slow_down);
    }

    #[test]
    fn node_count_branches_scaling_and_barnes_hut() {
        let config = LayoutConfig::default();
        let small = LayoutPlan::for_graph(30, false, &config).settings;
        assert!(!small.barnes_hut_optimize);
        assert_eq!(small.scaling_ratio, 10.0);

        let medium = LayoutPlan::for_graph(31, false, &config).settings;
        assert!(medium.barnes_hut_optimize);
        assert_eq!(medium.scaling_ratio, 10.0);

        let large = LayoutPlan::for_graph(101, false, &config).settings;
        assert_eq!(large.scaling_ratio, 20.0);
        assert!(large.lin_log_mode && large.outbound_attraction_distribution);
        assert_eq!(large.edge_weight_influence, 0.5);
    }

    #[test]
    fn connected_pair_ends_closer_than_unconnected_node() {
        let positions = vec![vec2(-40.0, 0.0), vec2(40.0, 0.0), vec2(0.0, 45.0)];
        let job = LayoutJob {
            positions,
            masses: vec![2.0, 2.0, 1.0],
            edges: vec![(0, 1, 9.0)],
            plan: LayoutPlan::for_graph(3, false, &LayoutConfig::default()),
        };
        let outcome = job.run().expect("layout converges");
        assert_eq!(outcome.iterations, 100);
        let pair = (outcome.positions[0] - outcome.positions[1]).length();
        assert!(pair < 80.0, "pair distance {pair}");
        assert!(outcome
            .positions
            .iter()
            .all(|position| position.x.is_finite() && position.y.is_finite()));
    }

    #[test]
    fn barnes_hut_run_stays_finite() {
        let positions = (0..60)
            .map(|index| {
                let angle = index as f32 * 0.7;
                vec2(angle.cos() * (10.0 + index as f32), angle.sin() * (10.0 + index as f32))
            })
            .collect::<Vec<_>>();
        let edges = (1..60).map(|index| (index - 1, index, 1.0)).collect();
        let job = LayoutJob {
            masses: vec![3.0; positions.len()],
            positions,
            edges,
            plan: LayoutPlan::for_graph(60, false, &LayoutConfig::default()),
        };
        let outcome = job.run().expect("layout converges");
        assert_eq!(outcome.iterations, 90);
    }

    #[test]
    fn mismatched_masses_are_rejected() {
        let job = LayoutJob {
            positions: vec![Vec2::ZERO; 3],
            masses: vec![1.0; 2],
            edges: Vec::new(),
            plan: LayoutPlan::for_graph(3, false, &LayoutConfig::default()),
        };
        assert_eq!(
            job.run().expect_err("lengths differ"),
            LayoutError::MassMismatch {
                positions: 3,
                masses: 2
            }
        );
    }

    #[test]
    fn tiny_graphs_skip_iterations() {
        let job = LayoutJob {
            positions: vec![vec2(3.0, 4.0)],
            masses: vec![1.0],
            edges: Vec::new(),
            plan: LayoutPlan::for_graph(1, false, &LayoutConfig::default()),
        };
        let outcome = job.run().expect("single node");
        assert_eq!(outcome.positions, vec![vec2(3.0, 4.0)]);
        assert_eq!(outcome.iterations, 0);
    }
}
