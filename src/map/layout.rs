use std::collections::{HashMap, HashSet};
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{Color32, Vec2, vec2};
use tracing::{debug, warn};

use super::cluster::{ClusterLabel, assign_cluster_for_tags, primary_tag, primary_tag_color};
use super::entity::Entity;
use super::pack::{Circle, enclosing_circle, pack_siblings};

pub const NODE_BASE_RADIUS: f32 = 24.0;
pub const NODE_COUNT_FACTOR: f32 = 3.0;
pub const NODE_COUNT_CAP: f32 = 12.0;
pub const BOUNDARY_MARGIN: f32 = 24.0;

const ORBIT_RADIUS_FACTOR: f32 = 0.32;
const CLUSTER_BASE_RADIUS: f32 = 110.0;
const CLUSTER_RADIUS_PER_SQRT_MEMBER: f32 = 18.0;
const PACK_PADDING: f32 = 6.0;
const ENCLOSURE_PADDING: f32 = 18.0;

pub struct MapNode {
    pub entity: usize,
    pub primary_tag: String,
    pub cluster: usize,
    pub radius: f32,
    pub color: Color32,
    pub highlighted: bool,
    pub world_pos: Vec2,
    pub velocity: Vec2,
    pub pin: Option<Vec2>,
}

pub struct MapCluster {
    pub label: ClusterLabel,
    pub members: Vec<usize>,
    pub anchor: Vec2,
    pub center: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

impl MapCluster {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn caption(&self) -> String {
        format!("{} • {}", self.label.label(), self.member_count())
    }
}

/// Arena of everything derived from one entity list and viewport size.
pub struct Layout {
    pub entities: Vec<Entity>,
    pub nodes: Vec<MapNode>,
    pub clusters: Vec<MapCluster>,
    pub ring_links: Vec<(usize, usize)>,
    pub index_by_id: HashMap<String, usize>,
    pub size: Vec2,
    pub orbit_radius: f32,
}

impl Layout {
    pub fn center(&self) -> Vec2 {
        self.size * 0.5
    }

    pub fn cluster_index(&self, label: ClusterLabel) -> Option<usize> {
        self.clusters.iter().position(|cluster| cluster.label == label)
    }

    pub fn entity(&self, node: usize) -> Option<&Entity> {
        self.nodes
            .get(node)
            .and_then(|node| self.entities.get(node.entity))
    }
}

pub fn node_radius(count: usize) -> f32 {
    NODE_BASE_RADIUS + (count as f32 * NODE_COUNT_FACTOR).min(NODE_COUNT_CAP)
}

fn cluster_base_radius(member_count: usize) -> f32 {
    CLUSTER_BASE_RADIUS + (member_count as f32).sqrt() * CLUSTER_RADIUS_PER_SQRT_MEMBER
}

/// Clamps one axis into `[radius + margin, extent - radius - margin]`; a
/// viewport too small for the node collapses to its midpoint.
pub fn clamp_axis(value: f32, radius: f32, extent: f32) -> f32 {
    let low = radius + BOUNDARY_MARGIN;
    let high = extent - radius - BOUNDARY_MARGIN;
    if low > high {
        return extent * 0.5;
    }
    value.clamp(low, high)
}

pub fn clamp_to_bounds(position: Vec2, radius: f32, size: Vec2) -> Vec2 {
    vec2(
        clamp_axis(position.x, radius, size.x),
        clamp_axis(position.y, radius, size.y),
    )
}

pub fn build_layout(entities: Vec<Entity>, size: Vec2, highlighted_ids: &HashSet<String>) -> Layout {
    let mut index_by_id = HashMap::with_capacity(entities.len());
    for (index, entity) in entities.iter().enumerate() {
        if index_by_id.insert(entity.id.clone(), index).is_some() {
            warn!(id = %entity.id, "duplicate entity id; the last occurrence wins lookups");
        }
    }

    let mut clusters: Vec<MapCluster> = Vec::new();
    let mut nodes = Vec::with_capacity(entities.len());
    for (index, entity) in entities.iter().enumerate() {
        let primary = primary_tag(&entity.tags).to_owned();
        let label = assign_cluster_for_tags(&entity.tags);
        let cluster = match clusters.iter().position(|cluster| cluster.label == label) {
            Some(existing) => existing,
            None => {
                clusters.push(MapCluster {
                    label,
                    members: Vec::new(),
                    anchor: Vec2::ZERO,
                    center: Vec2::ZERO,
                    velocity: Vec2::ZERO,
                    radius: 0.0,
                });
                clusters.len() - 1
            }
        };
        clusters[cluster].members.push(index);

        nodes.push(MapNode {
            entity: index,
            primary_tag: primary,
            cluster,
            radius: node_radius(entity.count),
            color: primary_tag_color(&entity.tags),
            highlighted: entity.highlighted || highlighted_ids.contains(&entity.id),
            world_pos: Vec2::ZERO,
            velocity: Vec2::ZERO,
            pin: None,
        });
    }

    let center = size * 0.5;
    let cluster_count = clusters.len();
    let orbit_radius = if cluster_count > 1 {
        size.x.min(size.y) * ORBIT_RADIUS_FACTOR
    } else {
        0.0
    };

    for (index, cluster) in clusters.iter_mut().enumerate() {
        let angle = (index as f32 / cluster_count.max(1) as f32) * TAU - FRAC_PI_2;
        cluster.anchor = center + vec2(angle.cos(), angle.sin()) * orbit_radius;
        cluster.center = cluster.anchor;
        cluster.radius = cluster_base_radius(cluster.member_count());
    }

    seed_clusters(&mut clusters, &mut nodes, size);

    let ring_links = if cluster_count > 1 {
        (0..cluster_count)
            .map(|index| (index, (index + 1) % cluster_count))
            .collect()
    } else {
        Vec::new()
    };

    debug!(
        nodes = nodes.len(),
        clusters = cluster_count,
        width = size.x,
        height = size.y,
        "seeded layout"
    );

    Layout {
        entities,
        nodes,
        clusters,
        ring_links,
        index_by_id,
        size,
        orbit_radius,
    }
}

fn seed_clusters(clusters: &mut [MapCluster], nodes: &mut [MapNode], size: Vec2) {
    for cluster in clusters.iter_mut() {
        let radii = cluster
            .members
            .iter()
            .map(|&member| nodes[member].radius + PACK_PADDING)
            .collect::<Vec<_>>();
        let offsets = pack_siblings(&radii);

        let packed = offsets
            .iter()
            .zip(radii.iter())
            .map(|(&offset, &radius)| Circle {
                center: offset,
                radius,
            })
            .collect::<Vec<_>>();
        if let Some(enclosure) = enclosing_circle(&packed) {
            let enclosing_radius = enclosure.center.length() + enclosure.radius;
            cluster.radius = cluster.radius.max(enclosing_radius + ENCLOSURE_PADDING);
        }

        for (&member, &offset) in cluster.members.iter().zip(offsets.iter()) {
            let node = &mut nodes[member];
            node.world_pos = clamp_to_bounds(cluster.anchor + offset, node.radius, size);
            node.velocity = Vec2::ZERO;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entity(id: &str, tags: &[&str], count: usize) -> Entity {
        Entity::new(id, id).with_tags(tags.iter().copied()).with_count(count)
    }

    #[test]
    fn radius_grows_with_count_and_caps() {
        assert_eq!(node_radius(0), 24.0);
        assert_eq!(node_radius(2), 30.0);
        assert_eq!(node_radius(4), 36.0);
        assert_eq!(node_radius(40), 36.0);
    }

    #[test]
    fn clusters_follow_first_appearance_and_form_a_ring() {
        let layout = build_layout(
            vec![
                entity("a", &["Rust"], 1),
                entity("b", &["ML"], 1),
                entity("c", &["Go"], 1),
                entity("d", &[], 0),
            ],
            vec2(1000.0, 800.0),
            &HashSet::new(),
        );

        let labels = layout
            .clusters
            .iter()
            .map(|cluster| cluster.label)
            .collect::<Vec<_>>();
        assert_eq!(
            labels,
            vec![
                ClusterLabel::RustSystems,
                ClusterLabel::AiMl,
                ClusterLabel::General
            ]
        );
        assert_eq!(layout.clusters[0].members, vec![0, 2]);
        assert_eq!(layout.ring_links, vec![(0, 1), (1, 2), (2, 0)]);
        assert_eq!(layout.nodes[3].primary_tag, "General");

        let first_anchor = layout.clusters[0].anchor;
        assert!((first_anchor.x - 500.0).abs() < 1e-3);
        assert!((first_anchor.y - (400.0 - 800.0 * 0.32)).abs() < 1e-3);
    }

    #[test]
    fn cluster_radius_encloses_packed_members() {
        let entities = (0..12)
            .map(|index| entity(&format!("n{index}"), &["React"], index))
            .collect::<Vec<_>>();
        let layout = build_layout(entities, vec2(2000.0, 2000.0), &HashSet::new());
        let cluster = &layout.clusters[0];

        for &member in &cluster.members {
            let node = &layout.nodes[member];
            let reach = (node.world_pos - cluster.anchor).length() + node.radius + PACK_PADDING;
            assert!(reach + ENCLOSURE_PADDING <= cluster.radius + 1e-2);
        }
    }

    #[test]
    fn single_cluster_sits_on_the_center() {
        let layout = build_layout(
            vec![entity("solo", &["Rust"], 3)],
            vec2(800.0, 600.0),
            &HashSet::new(),
        );
        assert_eq!(layout.orbit_radius, 0.0);
        assert!(layout.ring_links.is_empty());
        assert!((layout.nodes[0].world_pos - vec2(400.0, 300.0)).length() < 1e-3);
    }

    #[test]
    fn duplicate_ids_keep_the_last_index() {
        let layout = build_layout(
            vec![entity("dup", &["Go"], 0), entity("dup", &["Go"], 0)],
            vec2(600.0, 600.0),
            &HashSet::new(),
        );
        assert_eq!(layout.nodes.len(), 2);
        assert_eq!(layout.index_by_id.get("dup"), Some(&1));
    }

    #[test]
    fn highlight_set_marks_nodes() {
        let highlighted = HashSet::from(["b".to_owned()]);
        let layout = build_layout(
            vec![entity("a", &["Go"], 0), entity("b", &["Go"], 0)],
            vec2(600.0, 600.0),
            &highlighted,
        );
        assert!(!layout.nodes[0].highlighted);
        assert!(layout.nodes[1].highlighted);
    }

    #[test]
    fn clamp_collapses_in_tiny_viewports() {
        assert_eq!(clamp_axis(5.0, 30.0, 40.0), 20.0);
        assert_eq!(clamp_axis(-100.0, 10.0, 400.0), 34.0);
        assert_eq!(clamp_axis(1000.0, 10.0, 400.0), 366.0);
    }
}
