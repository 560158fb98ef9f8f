use eframe::egui::{Pos2, Vec2, vec2};

use super::cluster::ClusterLabel;
use super::layout::Layout;
use super::similarity::{MAX_SIMILARITY_LINKS, SimilarityLink, top_similar};
use super::viewport::ViewTransform;

pub const HOVER_RADIUS_BOOST: f32 = 4.0;
pub const TOOLTIP_OFFSET: Vec2 = vec2(15.0, -15.0);
const TOOLTIP_TAG_LIMIT: usize = 3;

const DIMMED_NODE_OPACITY: f32 = 0.15;
const DIMMED_HALO_OPACITY: f32 = 0.12;
const ISOLATED_HALO_OPACITY: f32 = 0.5;
const IDLE_HALO_OPACITY: f32 = 0.4;

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub node: usize,
    pub anchor: Pos2,
    pub title: String,
    pub subtitle: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HoverState {
    pub node: usize,
    pub links: Vec<SimilarityLink>,
    pub tooltip: Tooltip,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub node: usize,
    pub pin: Vec2,
}

/// What lies under the pointer. Nodes win over the halo behind them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hit {
    Node(usize),
    Halo(usize),
    Background,
}

/// Hover, isolation and drag are tracked independently: a drag may run
/// while a node is hovered and a cluster is isolated.
#[derive(Debug, Default)]
pub struct Interaction {
    hover: Option<HoverState>,
    isolated: Option<ClusterLabel>,
    drag: Option<DragState>,
}

impl Interaction {
    pub fn hover(&self) -> Option<&HoverState> {
        self.hover.as_ref()
    }

    pub fn hovered_node(&self) -> Option<usize> {
        self.hover.as_ref().map(|hover| hover.node)
    }

    pub fn isolated(&self) -> Option<ClusterLabel> {
        self.isolated
    }

    pub fn drag(&self) -> Option<DragState> {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Replaces any current hover with `node`, rebuilding its tooltip and
    /// similarity links.
    pub fn hover_enter(&mut self, layout: &Layout, node: usize, pointer: Pos2) {
        self.hover_leave();
        let Some(map_node) = layout.nodes.get(node) else {
            return;
        };
        let Some(entity) = layout.entities.get(map_node.entity) else {
            return;
        };

        self.hover = Some(HoverState {
            node,
            links: top_similar(&layout.entities, map_node.entity, MAX_SIMILARITY_LINKS),
            tooltip: Tooltip {
                node,
                anchor: pointer + TOOLTIP_OFFSET,
                title: entity.name.clone(),
                subtitle: entity.subtitle.clone(),
                tags: entity.tags.iter().take(TOOLTIP_TAG_LIMIT).cloned().collect(),
            },
        });
    }

    pub fn hover_move(&mut self, pointer: Pos2) {
        if let Some(hover) = &mut self.hover {
            hover.tooltip.anchor = pointer + TOOLTIP_OFFSET;
        }
    }

    pub fn hover_leave(&mut self) {
        self.hover = None;
    }

    pub fn toggle_isolation(&mut self, label: ClusterLabel) {
        self.isolated = if self.isolated == Some(label) {
            None
        } else {
            Some(label)
        };
    }

    pub fn clear_isolation(&mut self) {
        self.isolated = None;
    }

    /// Pins `node` where it currently sits.
    pub fn begin_drag(&mut self, layout: &mut Layout, node: usize) -> bool {
        self.end_drag(layout);
        let Some(map_node) = layout.nodes.get_mut(node) else {
            return false;
        };
        let pin = map_node.world_pos;
        map_node.pin = Some(pin);
        self.drag = Some(DragState { node, pin });
        true
    }

    pub fn drag_to(&mut self, layout: &mut Layout, world: Vec2) {
        let Some(drag) = &mut self.drag else {
            return;
        };
        if !world.x.is_finite() || !world.y.is_finite() {
            return;
        }
        drag.pin = world;
        if let Some(node) = layout.nodes.get_mut(drag.node) {
            node.pin = Some(world);
        }
    }

    /// Releases the pin. Returns whether a drag was active.
    pub fn end_drag(&mut self, layout: &mut Layout) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        if let Some(node) = layout.nodes.get_mut(drag.node) {
            node.pin = None;
        }
        true
    }

    pub fn reset(&mut self) {
        self.hover = None;
        self.isolated = None;
        self.drag = None;
    }

    pub fn display_radius(&self, layout: &Layout, node: usize) -> f32 {
        let base = layout.nodes.get(node).map_or(0.0, |node| node.radius);
        if self.hovered_node() == Some(node) {
            base + HOVER_RADIUS_BOOST
        } else {
            base
        }
    }

    /// Isolation factor for a node, before the zoom ramp is applied.
    pub fn node_isolation_opacity(&self, layout: &Layout, node: usize) -> f32 {
        match (self.isolated, layout.nodes.get(node)) {
            (Some(label), Some(map_node)) if layout.clusters[map_node.cluster].label != label => {
                DIMMED_NODE_OPACITY
            }
            _ => 1.0,
        }
    }

    pub fn halo_opacity(&self, label: ClusterLabel) -> f32 {
        match self.isolated {
            None => IDLE_HALO_OPACITY,
            Some(isolated) if isolated == label => ISOLATED_HALO_OPACITY,
            Some(_) => DIMMED_HALO_OPACITY,
        }
    }

    pub fn hit_test(&self, layout: &Layout, transform: ViewTransform, pointer: Pos2) -> Hit {
        let world = transform.screen_to_world(pointer);

        let node_hit = layout
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (node.world_pos - world).length();
                (distance <= self.display_radius(layout, index)).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((index, _)) = node_hit {
            return Hit::Node(index);
        }

        layout
            .clusters
            .iter()
            .enumerate()
            .filter_map(|(index, cluster)| {
                let distance = (cluster.center - world).length();
                (distance <= cluster.radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(Hit::Background, |(index, _)| Hit::Halo(index))
    }
}
