use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::debug;

use crate::map::handle::{MapFrame, NodeSprite};
use crate::map::interaction::Tooltip;
use crate::map::viewport::ViewTransform;
use crate::map::{MapOptions, SMOOTH_ZOOM_DURATION_SECS, TalentMap, tag_color};
use crate::util::ellipsize;

use super::super::render_utils::{
    ACCENT_COLOR, CANVAS_COLOR, blend_color, circle_visible, dim_color, draw_background,
    edge_visible, fade, similarity_link_width,
};
use super::super::{CameraCommand, SearchMatchCache, ViewModel};

const PILL_MAX_CHARS: usize = 14;
const RING_DASH: f32 = 6.0;
const RING_GAP: f32 = 8.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Map painting works in canvas-local coordinates; egui hands out absolute ones.
pub(super) fn to_canvas(rect: Rect, pos: Pos2) -> Pos2 {
    (pos - rect.min).to_pos2()
}

fn to_screen(rect: Rect, local: Pos2) -> Pos2 {
    rect.min + local.to_vec2()
}

impl ViewModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<String>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.roster_revision == self.roster_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .roster
            .iter()
            .filter(|profile| {
                fuzzy_match_score(&matcher, &profile.name, search_query).is_some()
                    || profile
                        .tech_stack
                        .iter()
                        .any(|tag| fuzzy_match_score(&matcher, tag, search_query).is_some())
            })
            .map(|profile| profile.id.clone())
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            roster_revision: self.roster_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    /// Builds the map on first use, re-lays it out when the roster or filters
    /// changed, and otherwise just follows the canvas size.
    fn sync_map(&mut self, size: Vec2) {
        if !self.map_dirty {
            if let Some(map) = self.map.as_mut() {
                map.resize(size.x, size.y);
            }
            return;
        }

        let entities = self.visible_entities();
        self.visible_count = entities.len();
        debug!(visible = entities.len(), "laying out talent map");

        match self.map.as_mut() {
            Some(map) => {
                map.rerender(entities);
                map.resize(size.x, size.y);
            }
            None => {
                let options = MapOptions {
                    frozen: self.frozen,
                    highlighted_ids: self.saved.iter().cloned().collect(),
                    selected_id: self.selected.clone(),
                };
                self.map = Some(TalentMap::render(
                    entities,
                    size.x,
                    size.y,
                    options,
                    self.selection_callbacks(),
                ));
            }
        }
        self.map_dirty = false;
    }

    fn apply_camera_command(&mut self, now: f64) {
        let Some(command) = self.pending_camera.take() else {
            return;
        };
        let Some(map) = self.map.as_mut() else {
            return;
        };
        match command {
            CameraCommand::ZoomBy(factor) => {
                if let Some(transform) = map.transform() {
                    map.smooth_zoom_to(transform.scale * factor, now, SMOOTH_ZOOM_DURATION_SECS);
                }
            }
            CameraCommand::Fit => {
                map.auto_fit_to_clusters(now);
            }
        }
    }

    pub(in crate::app) fn draw_map(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let now = ui.input(|input| input.time);

        self.sync_map(rect.size());
        self.apply_camera_command(now);
        self.handle_map_zoom(ui, rect, &response);
        self.handle_map_pointer(ui, rect, &response);

        let Some(map) = self.map.as_mut() else {
            draw_background(&painter, rect, ViewTransform::IDENTITY);
            return;
        };
        if map.tick(now) {
            ui.ctx().request_repaint();
        }

        let Some(frame) = map.frame() else {
            draw_background(&painter, rect, ViewTransform::IDENTITY);
            return;
        };
        draw_background(&painter, rect, frame.transform);

        if frame.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No builders match these filters",
                FontId::proportional(16.0),
                Color32::from_gray(150),
            );
            return;
        }

        let search_matches = self.cached_search_matches();
        paint_ring_links(&painter, rect, &frame);
        paint_halos(&painter, rect, &frame);
        if frame.links_visible {
            paint_similarity_links(&painter, rect, &frame);
        }
        for sprite in &frame.nodes {
            let matched = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&sprite.id));
            paint_node(&painter, rect, &frame, sprite, matched);
        }
        if let Some(tooltip) = &frame.tooltip {
            paint_tooltip(&painter, rect, tooltip);
        }
    }
}

fn paint_ring_links(painter: &egui::Painter, rect: Rect, frame: &MapFrame) {
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 130, 150, 70));
    for &(from, to) in &frame.ring_links {
        let from = to_screen(rect, from);
        let to = to_screen(rect, to);
        if !edge_visible(rect, from, to, 2.0) {
            continue;
        }
        painter.extend(Shape::dashed_line(&[from, to], stroke, RING_DASH, RING_GAP));
    }
}

fn paint_halos(painter: &egui::Painter, rect: Rect, frame: &MapFrame) {
    for halo in &frame.halos {
        let center = to_screen(rect, halo.center);
        if !circle_visible(rect, center, halo.radius) {
            continue;
        }
        painter.circle(
            center,
            halo.radius,
            fade(halo.color, halo.opacity * 0.3),
            Stroke::new(1.5, fade(halo.color, halo.opacity)),
        );
        painter.text(
            center - vec2(0.0, halo.radius + 10.0),
            Align2::CENTER_BOTTOM,
            &halo.caption,
            FontId::proportional(13.0),
            fade(blend_color(halo.color, Color32::WHITE, 0.4), 0.5 + halo.opacity),
        );
    }
}

fn paint_similarity_links(painter: &egui::Painter, rect: Rect, frame: &MapFrame) {
    for link in &frame.similarity_links {
        let from = to_screen(rect, link.from);
        let to = to_screen(rect, link.to);
        if !edge_visible(rect, from, to, 2.0) {
            continue;
        }
        painter.line_segment(
            [from, to],
            Stroke::new(
                similarity_link_width(link.score),
                fade(Color32::from_rgb(220, 226, 240), 0.25 + link.score * 0.05),
            ),
        );
    }
}

fn paint_node(
    painter: &egui::Painter,
    rect: Rect,
    frame: &MapFrame,
    sprite: &NodeSprite,
    search_match: bool,
) {
    let center = to_screen(rect, sprite.center);
    if !circle_visible(rect, center, sprite.radius + 6.0) {
        return;
    }
    let opacity = sprite.opacity;

    if sprite.highlighted {
        painter.circle_filled(center, sprite.radius + 6.0, fade(ACCENT_COLOR, 0.25 * opacity));
    }

    let fill = if sprite.hovered {
        blend_color(sprite.color, Color32::WHITE, 0.2)
    } else {
        sprite.color
    };
    painter.circle_filled(center, sprite.radius, fade(fill, opacity));

    let stroke = if sprite.selected {
        Stroke::new(3.0, fade(ACCENT_COLOR, opacity))
    } else if sprite.pinned {
        Stroke::new(2.0, fade(Color32::WHITE, opacity))
    } else {
        Stroke::new(1.0, fade(dim_color(sprite.color, 0.55), opacity))
    };
    painter.circle_stroke(center, sprite.radius, stroke);

    if search_match {
        painter.circle_stroke(
            center,
            sprite.radius + 4.0,
            Stroke::new(2.0, fade(Color32::from_rgb(125, 211, 252), opacity)),
        );
    }

    painter.text(
        center,
        Align2::CENTER_CENTER,
        &sprite.initials,
        FontId::proportional((sprite.radius * 0.8).clamp(8.0, 18.0)),
        fade(CANVAS_COLOR, opacity),
    );

    if frame.pill_opacity > 0.0 {
        let pill_opacity = frame.pill_opacity * opacity;
        let label = ellipsize(&sprite.tag, PILL_MAX_CHARS);
        let galley = painter.layout_no_wrap(
            label,
            FontId::proportional(11.0),
            fade(tag_color(&sprite.tag), pill_opacity),
        );
        let pill_center = center + vec2(0.0, sprite.radius + 12.0);
        let pill_rect = Rect::from_center_size(pill_center, galley.size() + vec2(12.0, 4.0));
        painter.rect_filled(
            pill_rect,
            CornerRadius::same(8),
            fade(Color32::from_rgb(30, 36, 48), pill_opacity),
        );
        painter.galley(
            pill_rect.center() - galley.size() / 2.0,
            galley,
            Color32::WHITE,
        );
    }
}

fn paint_tooltip(painter: &egui::Painter, rect: Rect, tooltip: &Tooltip) {
    let anchor = to_screen(rect, tooltip.anchor);
    let mut lines = vec![(tooltip.title.clone(), 14.0, Color32::WHITE)];
    if !tooltip.subtitle.is_empty() {
        lines.push((tooltip.subtitle.clone(), 12.0, Color32::from_gray(170)));
    }
    if !tooltip.tags.is_empty() {
        lines.push((tooltip.tags.join(" · "), 12.0, Color32::from_rgb(125, 211, 252)));
    }

    let galleys = lines
        .into_iter()
        .map(|(text, size, color)| painter.layout_no_wrap(text, FontId::proportional(size), color))
        .collect::<Vec<_>>();
    let width = galleys
        .iter()
        .map(|galley| galley.size().x)
        .fold(0.0_f32, f32::max);
    let height = galleys.iter().map(|galley| galley.size().y + 2.0).sum::<f32>();

    let padding = vec2(10.0, 8.0);
    let box_rect = Rect::from_min_size(
        anchor - vec2(0.0, height + padding.y * 2.0),
        vec2(width, height) + padding * 2.0,
    );
    painter.rect(
        box_rect,
        CornerRadius::same(6),
        Color32::from_rgba_unmultiplied(20, 24, 33, 235),
        Stroke::new(1.0, Color32::from_gray(70)),
        egui::StrokeKind::Inside,
    );

    let mut cursor = box_rect.min + padding;
    for galley in galleys {
        let line_height = galley.size().y + 2.0;
        painter.galley(cursor, galley, Color32::WHITE);
        cursor.y += line_height;
    }
}
