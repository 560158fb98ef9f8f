use std::collections::HashSet;

use eframe::egui::{Color32, Pos2, Vec2, vec2};
use tracing::{debug, info, warn};

use super::cluster::ClusterLabel;
use super::entity::Entity;
use super::interaction::{Hit, Interaction, Tooltip};
use super::layout::{Layout, build_layout};
use super::physics::{ClusterSimulation, NodeSimulation, SimulationMode};
use super::viewport::{AUTO_FIT_DELAY_SECS, ViewTransform, Viewport};
use crate::util::initials;

#[derive(Clone, Debug, Default)]
pub struct MapOptions {
    pub frozen: bool,
    pub highlighted_ids: HashSet<String>,
    pub selected_id: Option<String>,
}

pub type NodeSelectedCallback = Box<dyn FnMut(&Entity)>;

#[derive(Default)]
pub struct MapCallbacks {
    pub on_node_selected: Option<NodeSelectedCallback>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeSprite {
    pub node: usize,
    pub id: String,
    pub initials: String,
    pub tag: String,
    pub center: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub opacity: f32,
    pub highlighted: bool,
    pub selected: bool,
    pub hovered: bool,
    pub pinned: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HaloSprite {
    pub label: ClusterLabel,
    pub caption: String,
    pub center: Pos2,
    pub radius: f32,
    pub color: Color32,
    pub opacity: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinkSprite {
    pub from: Pos2,
    pub to: Pos2,
    pub score: f32,
}

/// Everything needed to paint one frame, in canvas-local screen space.
#[derive(Clone, Debug, PartialEq)]
pub struct MapFrame {
    pub transform: ViewTransform,
    pub node_opacity: f32,
    pub pill_opacity: f32,
    pub links_visible: bool,
    pub halos: Vec<HaloSprite>,
    pub ring_links: Vec<(Pos2, Pos2)>,
    pub similarity_links: Vec<LinkSprite>,
    pub nodes: Vec<NodeSprite>,
    pub tooltip: Option<Tooltip>,
}

struct MapScene {
    layout: Layout,
    nodes: NodeSimulation,
    clusters: ClusterSimulation,
    viewport: Viewport,
    interaction: Interaction,
    first_tick_at: Option<f64>,
}

impl MapScene {
    fn is_resting(&self) -> bool {
        self.clusters.is_resting() && self.nodes.is_resting()
    }
}

enum MapState {
    Live(Box<MapScene>),
    /// Waiting for a non-zero viewport.
    Deferred,
    Disposed,
}

/// Owner of one laid-out map. All simulation, camera and interaction state
/// lives here and is torn down synchronously by [`TalentMap::dispose`].
pub struct TalentMap {
    entities: Vec<Entity>,
    size: Vec2,
    options: MapOptions,
    callbacks: MapCallbacks,
    state: MapState,
}

impl TalentMap {
    pub fn render(
        entities: Vec<Entity>,
        width: f32,
        height: f32,
        options: MapOptions,
        callbacks: MapCallbacks,
    ) -> Self {
        let mut map = Self {
            entities,
            size: vec2(width, height),
            options,
            callbacks,
            state: MapState::Deferred,
        };
        map.rebuild();
        map
    }

    /// Tears the current layout down, then lays out `entities` from scratch.
    pub fn rerender(&mut self, entities: Vec<Entity>) {
        self.dispose();
        self.entities = entities;
        self.rebuild();
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        let size = vec2(width, height);
        if size == self.size {
            return;
        }
        self.size = size;
        if !matches!(self.state, MapState::Disposed) {
            self.teardown();
            self.rebuild();
        }
    }

    /// Stops both simulations and drops hover, drag and camera state.
    /// Safe to call any number of times.
    pub fn dispose(&mut self) {
        if matches!(self.state, MapState::Disposed) {
            return;
        }
        self.teardown();
        self.state = MapState::Disposed;
        info!(entities = self.entities.len(), "talent map disposed");
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, MapState::Disposed)
    }

    pub fn is_deferred(&self) -> bool {
        matches!(self.state, MapState::Deferred)
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn options(&self) -> &MapOptions {
        &self.options
    }

    pub fn set_callbacks(&mut self, callbacks: MapCallbacks) {
        self.callbacks = callbacks;
    }

    pub fn set_frozen(&mut self, frozen: bool) {
        self.options.frozen = frozen;
        if let MapState::Live(scene) = &mut self.state {
            let dragging = scene.interaction.is_dragging();
            scene.nodes.set_frozen(frozen, dragging);
            debug!(frozen, dragging, "simulation freeze toggled");
        }
    }

    pub fn set_selected(&mut self, selected_id: Option<String>) {
        self.options.selected_id = selected_id;
    }

    pub fn set_highlighted(&mut self, highlighted_ids: HashSet<String>) {
        if highlighted_ids == self.options.highlighted_ids {
            return;
        }
        self.options.highlighted_ids = highlighted_ids;
        if matches!(self.state, MapState::Live(_)) {
            self.teardown();
            self.rebuild();
        }
    }

    pub fn layout(&self) -> Option<&Layout> {
        self.scene().map(|scene| &scene.layout)
    }

    pub fn interaction(&self) -> Option<&Interaction> {
        self.scene().map(|scene| &scene.interaction)
    }

    pub fn transform(&self) -> Option<ViewTransform> {
        self.scene().map(|scene| scene.viewport.transform())
    }

    pub fn simulation_mode(&self) -> Option<SimulationMode> {
        self.scene().map(|scene| scene.nodes.mode())
    }

    /// Advances both simulations and any camera transition. Returns whether
    /// another frame should be scheduled.
    pub fn tick(&mut self, now: f64) -> bool {
        let Some(scene) = self.scene_mut() else {
            return false;
        };

        if scene.first_tick_at.is_none() {
            scene.first_tick_at = Some(now);
            scene.viewport.schedule_auto_fit(now + AUTO_FIT_DELAY_SECS);
        }
        if scene.viewport.take_due_auto_fit(now) {
            scene.viewport.auto_fit(&scene.layout.clusters, now);
        }

        let clusters_moved = scene.clusters.step(&mut scene.layout);
        let nodes_moved = scene.nodes.step(&mut scene.layout);
        let camera_moved = scene.viewport.advance(now);

        clusters_moved
            || nodes_moved
            || camera_moved
            || scene.viewport.is_animating()
            || scene.viewport.has_pending_auto_fit()
            || !scene.is_resting()
    }

    /// Whether both simulations have cooled. Deferred and disposed maps rest.
    pub fn is_resting(&self) -> bool {
        self.scene().is_none_or(MapScene::is_resting)
    }

    pub fn auto_fit_to_clusters(&mut self, now: f64) -> bool {
        match self.scene_mut() {
            Some(scene) => scene.viewport.auto_fit(&scene.layout.clusters, now),
            None => false,
        }
    }

    pub fn smooth_zoom_to(&mut self, target_scale: f32, now: f64, duration: f64) {
        if let Some(scene) = self.scene_mut() {
            scene.viewport.smooth_zoom_to(target_scale, now, duration);
        }
    }

    pub fn zoom_at(&mut self, pointer: Pos2, factor: f32) {
        if let Some(scene) = self.scene_mut() {
            scene.viewport.zoom_at(pointer, factor);
        }
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        if let Some(scene) = self.scene_mut() {
            scene.viewport.pan_by(delta);
        }
    }

    pub fn hit_test(&self, pointer: Pos2) -> Hit {
        match self.scene() {
            Some(scene) => {
                scene
                    .interaction
                    .hit_test(&scene.layout, scene.viewport.transform(), pointer)
            }
            None => Hit::Background,
        }
    }

    pub fn pointer_moved(&mut self, pointer: Pos2) {
        let hit = self.hit_test(pointer);
        let Some(scene) = self.scene_mut() else {
            return;
        };

        if scene.interaction.is_dragging() {
            let world = scene.viewport.transform().screen_to_world(pointer);
            scene.interaction.drag_to(&mut scene.layout, world);
        }

        match hit {
            Hit::Node(node) if scene.interaction.hovered_node() == Some(node) => {
                scene.interaction.hover_move(pointer);
            }
            Hit::Node(node) => scene.interaction.hover_enter(&scene.layout, node, pointer),
            Hit::Halo(_) | Hit::Background => scene.interaction.hover_leave(),
        }
    }

    pub fn pointer_left(&mut self) {
        self.leave_node();
    }

    pub fn click(&mut self, pointer: Pos2) {
        match self.hit_test(pointer) {
            Hit::Node(node) => self.click_node(node),
            Hit::Halo(cluster) => {
                let label = self
                    .layout()
                    .and_then(|layout| layout.clusters.get(cluster))
                    .map(|cluster| cluster.label);
                if let Some(label) = label {
                    self.click_cluster(label);
                }
            }
            Hit::Background => self.click_background(),
        }
    }

    /// Starts dragging the node under `pointer`, if any.
    pub fn drag_start(&mut self, pointer: Pos2) -> bool {
        match self.hit_test(pointer) {
            Hit::Node(node) => self.begin_drag(node),
            Hit::Halo(_) | Hit::Background => false,
        }
    }

    pub fn drag_move(&mut self, pointer: Pos2) {
        let Some(world) = self
            .scene()
            .map(|scene| scene.viewport.transform().screen_to_world(pointer))
        else {
            return;
        };
        self.drag_to(world);
    }

    pub fn drag_end(&mut self) {
        self.end_drag();
    }

    pub fn hover_node(&mut self, node: usize, pointer: Pos2) {
        if let Some(scene) = self.scene_mut() {
            scene.interaction.hover_enter(&scene.layout, node, pointer);
        }
    }

    pub fn leave_node(&mut self) {
        if let Some(scene) = self.scene_mut() {
            scene.interaction.hover_leave();
        }
    }

    /// Reports the node's entity to the selection callback.
    pub fn click_node(&mut self, node: usize) {
        let MapState::Live(scene) = &self.state else {
            return;
        };
        let Some(entity) = scene.layout.entity(node) else {
            return;
        };
        debug!(id = %entity.id, "node selected");
        if let Some(on_node_selected) = self.callbacks.on_node_selected.as_mut() {
            on_node_selected(entity);
        }
    }

    pub fn click_cluster(&mut self, label: ClusterLabel) {
        if let Some(scene) = self.scene_mut() {
            scene.interaction.toggle_isolation(label);
        }
    }

    pub fn click_background(&mut self) {
        if let Some(scene) = self.scene_mut() {
            scene.interaction.clear_isolation();
        }
    }

    pub fn begin_drag(&mut self, node: usize) -> bool {
        let Some(scene) = self.scene_mut() else {
            return false;
        };
        if !scene.interaction.begin_drag(&mut scene.layout, node) {
            return false;
        }
        scene.nodes.begin_drag();
        true
    }

    pub fn drag_to(&mut self, world: Vec2) {
        if let Some(scene) = self.scene_mut() {
            scene.interaction.drag_to(&mut scene.layout, world);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(scene) = self.scene_mut()
            && scene.interaction.end_drag(&mut scene.layout)
        {
            scene.nodes.end_drag();
        }
    }

    /// Snapshot of the current frame; `None` while deferred or disposed.
    pub fn frame(&self) -> Option<MapFrame> {
        let scene = self.scene()?;
        let layout = &scene.layout;
        let interaction = &scene.interaction;
        let transform = scene.viewport.transform();
        let node_opacity = transform.node_opacity();
        let hovered = interaction.hovered_node();

        let halos = layout
            .clusters
            .iter()
            .map(|cluster| HaloSprite {
                label: cluster.label,
                caption: cluster.caption(),
                center: transform.world_to_screen(cluster.center),
                radius: cluster.radius * transform.scale,
                color: cluster.label.color(),
                opacity: interaction.halo_opacity(cluster.label),
            })
            .collect();

        let ring_links = layout
            .ring_links
            .iter()
            .filter_map(|&(source, target)| {
                let source = layout.clusters.get(source)?;
                let target = layout.clusters.get(target)?;
                Some((
                    transform.world_to_screen(source.center),
                    transform.world_to_screen(target.center),
                ))
            })
            .collect();

        let similarity_links = interaction
            .hover()
            .map(|hover| {
                hover
                    .links
                    .iter()
                    .filter_map(|link| {
                        let source = layout.nodes.get(link.source)?;
                        let target = layout.nodes.get(link.target)?;
                        Some(LinkSprite {
                            from: transform.world_to_screen(source.world_pos),
                            to: transform.world_to_screen(target.world_pos),
                            score: link.score,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();

        let selected_id = self.options.selected_id.as_deref();
        let nodes = layout
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let entity = layout.entities.get(node.entity)?;
                Some(NodeSprite {
                    node: index,
                    id: entity.id.clone(),
                    initials: initials(&entity.name),
                    tag: node.primary_tag.clone(),
                    center: transform.world_to_screen(node.world_pos),
                    radius: interaction.display_radius(layout, index) * transform.scale,
                    color: node.color,
                    opacity: node_opacity * interaction.node_isolation_opacity(layout, index),
                    highlighted: node.highlighted,
                    selected: selected_id == Some(entity.id.as_str()),
                    hovered: hovered == Some(index),
                    pinned: node.pin.is_some(),
                })
            })
            .collect();

        Some(MapFrame {
            transform,
            node_opacity,
            pill_opacity: transform.pill_opacity(),
            links_visible: transform.links_visible(),
            halos,
            ring_links,
            similarity_links,
            nodes,
            tooltip: interaction.hover().map(|hover| hover.tooltip.clone()),
        })
    }

    fn scene(&self) -> Option<&MapScene> {
        match &self.state {
            MapState::Live(scene) => Some(&**scene),
            MapState::Deferred | MapState::Disposed => None,
        }
    }

    fn scene_mut(&mut self) -> Option<&mut MapScene> {
        match &mut self.state {
            MapState::Live(scene) => Some(&mut **scene),
            MapState::Deferred | MapState::Disposed => None,
        }
    }

    fn teardown(&mut self) {
        if let MapState::Live(scene) = &mut self.state {
            scene.interaction.reset();
            scene.viewport.cancel();
            scene.nodes.stop();
            scene.clusters.stop();
        }
        self.state = MapState::Deferred;
    }

    fn rebuild(&mut self) {
        let size = self.size;
        if !(size.x > 0.0 && size.y > 0.0 && size.x.is_finite() && size.y.is_finite()) {
            warn!(
                width = size.x,
                height = size.y,
                "viewport has no area; layout deferred"
            );
            self.state = MapState::Deferred;
            return;
        }

        let layout = build_layout(self.entities.clone(), size, &self.options.highlighted_ids);
        info!(
            nodes = layout.nodes.len(),
            clusters = layout.clusters.len(),
            frozen = self.options.frozen,
            "talent map laid out"
        );
        self.state = MapState::Live(Box::new(MapScene {
            layout,
            nodes: NodeSimulation::new(self.options.frozen),
            clusters: ClusterSimulation::new(),
            viewport: Viewport::new(size),
            interaction: Interaction::default(),
            first_tick_at: None,
        }));
    }
}

impl Drop for TalentMap {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::map::layout::BOUNDARY_MARGIN;
    use crate::map::viewport::{MAX_SCALE, MIN_SCALE};

    const FRAME_SECS: f64 = 1.0 / 60.0;

    fn candidate(id: &str, tags: &[&str], count: usize) -> Entity {
        Entity::new(id, format!("Candidate {id}"))
            .with_subtitle("Lagos")
            .with_tags(tags.iter().copied())
            .with_count(count)
    }

    fn twenty_candidates() -> Vec<Entity> {
        let primaries = ["ML", "React", "Rust", "Python", "Design"];
        (0..20)
            .map(|index| {
                candidate(
                    &format!("c{index}"),
                    &[primaries[index % 5], "Docker", "AWS", "GraphQL", "Linux"],
                    index % 4,
                )
            })
            .collect()
    }

    fn recording_callbacks() -> (MapCallbacks, Rc<RefCell<Vec<String>>>) {
        let selected = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&selected);
        let callbacks = MapCallbacks {
            on_node_selected: Some(Box::new(move |entity: &Entity| {
                sink.borrow_mut().push(entity.id.clone());
            })),
        };
        (callbacks, selected)
    }

    fn positions(map: &TalentMap) -> Vec<Vec2> {
        map.layout()
            .map(|layout| layout.nodes.iter().map(|node| node.world_pos).collect())
            .unwrap_or_default()
    }

    fn run(map: &mut TalentMap, ticks: usize) {
        for _ in 0..ticks {
            map.tick(0.0);
        }
    }

    #[test]
    fn twenty_candidates_fit_every_halo_after_auto_fit() {
        let size = vec2(1200.0, 900.0);
        let mut map = TalentMap::render(
            twenty_candidates(),
            size.x,
            size.y,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        run(&mut map, 200);
        assert_eq!(map.layout().map(|layout| layout.clusters.len()), Some(5));

        assert!(map.auto_fit_to_clusters(100.0));
        map.tick(101.0);

        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert!((MIN_SCALE..=MAX_SCALE).contains(&frame.transform.scale));
        for halo in &frame.halos {
            assert!(halo.center.x - halo.radius >= -0.5, "{halo:?}");
            assert!(halo.center.y - halo.radius >= -0.5, "{halo:?}");
            assert!(halo.center.x + halo.radius <= size.x + 0.5, "{halo:?}");
            assert!(halo.center.y + halo.radius <= size.y + 0.5, "{halo:?}");
        }
    }

    #[test]
    fn auto_fit_fires_once_shortly_after_the_first_tick() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        map.tick(10.0);
        assert_eq!(map.transform(), Some(ViewTransform::IDENTITY));

        let mut now = 10.0;
        while now < 10.0 + AUTO_FIT_DELAY_SECS + 0.6 {
            now += FRAME_SECS;
            map.tick(now);
        }
        let fitted = map.transform().unwrap_or_default();
        assert_ne!(fitted, ViewTransform::IDENTITY);
        assert!(fitted.scale <= 1.6);

        // The fit is the last camera move; nothing zooms in after it.
        map.tick(now + 1.0);
        assert_eq!(map.transform(), Some(fitted));
    }

    #[test]
    fn single_candidate_settles_at_the_center() {
        let mut map = TalentMap::render(
            vec![candidate("solo", &["Go", "Rust"], 2)],
            800.0,
            600.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        run(&mut map, 150);

        let position = positions(&map)[0];
        assert!((position - vec2(400.0, 300.0)).length() < 5.0, "{position:?}");
    }

    #[test]
    fn unpinned_nodes_stay_inside_the_viewport() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            900.0,
            640.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        for _ in 0..120 {
            map.tick(0.0);
            let Some(layout) = map.layout() else {
                panic!("layout vanished");
            };
            for node in &layout.nodes {
                let low = node.radius + BOUNDARY_MARGIN - 1e-3;
                assert!(node.world_pos.x >= low && node.world_pos.x <= 900.0 - low);
                assert!(node.world_pos.y >= low && node.world_pos.y <= 640.0 - low);
            }
        }
    }

    #[test]
    fn hover_shows_five_links_and_leave_clears_them() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        map.hover_node(0, Pos2::new(50.0, 60.0));

        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert_eq!(frame.similarity_links.len(), 5);
        assert!(
            frame
                .similarity_links
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score)
        );
        assert_eq!(frame.tooltip.as_ref().map(|tooltip| tooltip.node), Some(0));
        assert!(frame.nodes[0].hovered);

        map.leave_node();
        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert!(frame.similarity_links.is_empty());
        assert!(frame.tooltip.is_none());
        assert!(!frame.nodes[0].hovered);
    }

    #[test]
    fn pointer_hover_follows_hit_testing() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        let center = positions(&map)[3].to_pos2();

        map.pointer_moved(center);
        assert_eq!(map.interaction().and_then(Interaction::hovered_node), Some(3));

        map.pointer_moved(center + vec2(1.0, 0.0));
        let anchor = map
            .interaction()
            .and_then(|interaction| interaction.hover())
            .map(|hover| hover.tooltip.anchor);
        assert_eq!(anchor, Some(center + vec2(16.0, -15.0)));

        map.pointer_left();
        assert_eq!(map.interaction().and_then(Interaction::hovered_node), None);
    }

    #[test]
    fn node_click_reports_the_entity_exactly_once() {
        let (callbacks, selected) = recording_callbacks();
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            callbacks,
        );
        let before = positions(&map);

        map.click_node(4);
        assert_eq!(*selected.borrow(), vec!["c4".to_owned()]);
        assert_eq!(positions(&map), before);

        let center = before[7].to_pos2();
        map.click(center);
        assert_eq!(*selected.borrow(), vec!["c4".to_owned(), "c7".to_owned()]);
    }

    #[test]
    fn halo_clicks_toggle_isolation_and_background_clears_it() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        map.click_cluster(ClusterLabel::AiMl);

        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        let member = frame.nodes[0].opacity;
        let outsider = frame.nodes[1].opacity;
        assert!(member > outsider && outsider > 0.0);

        map.click_cluster(ClusterLabel::AiMl);
        assert_eq!(map.interaction().and_then(Interaction::isolated), None);

        map.click_cluster(ClusterLabel::Junior);
        map.click(Pos2::new(-5000.0, -5000.0));
        assert_eq!(map.interaction().and_then(Interaction::isolated), None);
    }

    #[test]
    fn freezing_halts_motion_and_unfreezing_resumes_in_place() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        run(&mut map, 10);

        map.set_frozen(true);
        let frozen_at = positions(&map);
        run(&mut map, 5);
        assert_eq!(positions(&map), frozen_at);

        map.set_frozen(false);
        map.tick(0.0);
        let resumed = positions(&map);
        assert_ne!(resumed, frozen_at);
        assert!(
            resumed
                .iter()
                .zip(frozen_at.iter())
                .all(|(after, before)| (*after - *before).length() < 60.0)
        );
    }

    #[test]
    fn pinned_node_follows_the_pointer_exactly() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        assert!(map.begin_drag(5));
        assert_eq!(map.simulation_mode(), Some(SimulationMode::Perturbed));

        for step in 0..30 {
            let pin = vec2(100.0 + step as f32 * 7.5, 420.0 - step as f32 * 3.25);
            map.drag_to(pin);
            map.tick(0.0);
            assert_eq!(positions(&map)[5], pin);
        }

        map.end_drag();
        assert_eq!(map.simulation_mode(), Some(SimulationMode::Running));
        assert_eq!(map.layout().and_then(|layout| layout.nodes[5].pin), None);
        run(&mut map, 150);
        let energy = map
            .layout()
            .map(|layout| layout.nodes.iter().map(|node| node.velocity.length_sq()).sum::<f32>())
            .unwrap_or_default();
        assert!(energy < 1e-6);
    }

    #[test]
    fn dragging_a_settled_map_pushes_neighbours_and_clears_overlap() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        run(&mut map, 400);
        assert!(map.is_resting());
        let settled = positions(&map);

        // c0 and c5 share the ML cluster.
        assert!(map.begin_drag(0));
        map.drag_to(settled[5]);
        run(&mut map, 60);
        assert!(!map.is_resting());
        let pushed = positions(&map)
            .iter()
            .zip(settled.iter())
            .skip(1)
            .filter(|(after, before)| (**after - **before).length() > 1.0)
            .count();
        assert!(pushed > 0);

        map.end_drag();
        run(&mut map, 150);
        assert!(map.is_resting());
        let Some(layout) = map.layout() else {
            panic!("layout vanished");
        };
        for i in 0..layout.nodes.len() {
            for j in (i + 1)..layout.nodes.len() {
                let (a, b) = (&layout.nodes[i], &layout.nodes[j]);
                let distance = (a.world_pos - b.world_pos).length();
                assert!(
                    distance >= a.radius + b.radius - 0.5,
                    "nodes {i} and {j} still overlap: {distance}"
                );
            }
        }
    }

    #[test]
    fn frozen_map_still_lets_one_node_be_dragged() {
        let options = MapOptions {
            frozen: true,
            ..MapOptions::default()
        };
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            options,
            MapCallbacks::default(),
        );
        let before = positions(&map);

        assert!(map.begin_drag(2));
        map.drag_to(vec2(300.0, 300.0));
        map.tick(0.0);
        map.end_drag();
        map.tick(0.0);

        let after = positions(&map);
        assert_eq!(after[2], vec2(300.0, 300.0));
        for (index, (a, b)) in after.iter().zip(before.iter()).enumerate() {
            if index != 2 {
                assert_eq!(a, b);
            }
        }
        assert_eq!(map.simulation_mode(), Some(SimulationMode::Frozen));
    }

    #[test]
    fn freezing_mid_drag_stays_frozen_after_release() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        assert!(map.begin_drag(1));
        map.set_frozen(true);
        map.end_drag();
        assert_eq!(map.simulation_mode(), Some(SimulationMode::Frozen));
    }

    #[test]
    fn dispose_is_idempotent_and_silences_everything() {
        let (callbacks, selected) = recording_callbacks();
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            callbacks,
        );
        map.hover_node(0, Pos2::new(10.0, 10.0));
        map.tick(0.0);

        map.dispose();
        map.dispose();
        assert!(map.is_disposed());
        assert!(map.frame().is_none());
        assert!(!map.tick(1.0));
        assert!(!map.auto_fit_to_clusters(1.0));

        map.click_node(0);
        map.hover_node(1, Pos2::new(10.0, 10.0));
        assert!(selected.borrow().is_empty());
        assert!(map.interaction().is_none());

        map.resize(640.0, 480.0);
        assert!(map.is_disposed());
    }

    #[test]
    fn rerender_replaces_the_previous_layout() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        map.hover_node(0, Pos2::new(10.0, 10.0));
        assert!(map.begin_drag(0));

        map.rerender(vec![
            candidate("x", &["Rust"], 1),
            candidate("y", &["Vue"], 2),
        ]);
        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert_eq!(frame.nodes.len(), 2);
        assert!(frame.tooltip.is_none());
        assert!(frame.nodes.iter().all(|node| !node.pinned));
        assert_eq!(frame.transform, ViewTransform::IDENTITY);
    }

    #[test]
    fn zero_viewport_defers_until_resized() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            0.0,
            600.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        assert!(map.is_deferred());
        assert!(map.frame().is_none());
        assert!(!map.tick(0.0));

        map.resize(800.0, 600.0);
        assert!(!map.is_deferred());
        run(&mut map, 5);
        assert!(
            positions(&map)
                .iter()
                .all(|position| position.x.is_finite() && position.y.is_finite())
        );
    }

    #[test]
    fn empty_roster_renders_nothing() {
        let mut map = TalentMap::render(
            Vec::new(),
            800.0,
            600.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        run(&mut map, 3);
        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert!(frame.nodes.is_empty() && frame.halos.is_empty());
        assert!(!map.auto_fit_to_clusters(1.0));
    }

    #[test]
    fn selection_and_highlights_reach_the_frame() {
        let options = MapOptions {
            highlighted_ids: HashSet::from(["c2".to_owned()]),
            ..MapOptions::default()
        };
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            options,
            MapCallbacks::default(),
        );
        map.set_selected(Some("c9".to_owned()));

        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert!(frame.nodes[2].highlighted && !frame.nodes[3].highlighted);
        assert!(frame.nodes[9].selected && !frame.nodes[2].selected);
        assert_eq!(frame.nodes[0].initials, "CC");

        map.set_highlighted(HashSet::from(["c3".to_owned()]));
        let frame = map.frame().unwrap_or_else(|| panic!("map has no frame"));
        assert!(!frame.nodes[2].highlighted && frame.nodes[3].highlighted);
    }

    #[test]
    fn zoom_and_pan_move_the_camera() {
        let mut map = TalentMap::render(
            twenty_candidates(),
            1200.0,
            900.0,
            MapOptions::default(),
            MapCallbacks::default(),
        );
        map.zoom_at(Pos2::new(600.0, 450.0), 1.25);
        map.pan_by(vec2(30.0, -10.0));
        let transform = map.transform().unwrap_or_default();
        assert!((transform.scale - 1.25).abs() < 1e-4);

        map.smooth_zoom_to(2.0, 0.0, 0.35);
        map.tick(0.5);
        assert_eq!(map.transform().map(|transform| transform.scale), Some(2.0));
    }
}
