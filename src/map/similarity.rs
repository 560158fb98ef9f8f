use std::collections::HashSet;

use super::entity::Entity;

pub const MAX_SIMILARITY_LINKS: usize = 5;

const SHARED_TAG_WEIGHT: f32 = 2.0;
const SHARED_COUNT_WEIGHT: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimilarityLink {
    pub source: usize,
    pub target: usize,
    pub score: f32,
}

pub fn similarity(a: &Entity, b: &Entity) -> f32 {
    let a_tags = a.tags.iter().map(String::as_str).collect::<HashSet<_>>();
    let b_tags = b.tags.iter().map(String::as_str).collect::<HashSet<_>>();
    let shared = a_tags.intersection(&b_tags).count();

    (shared as f32 * SHARED_TAG_WEIGHT) + (a.count.min(b.count) as f32 * SHARED_COUNT_WEIGHT)
}

/// Strongest positive links from `source`, best first. Ties keep input order.
pub fn top_similar(entities: &[Entity], source: usize, limit: usize) -> Vec<SimilarityLink> {
    let Some(origin) = entities.get(source) else {
        return Vec::new();
    };

    let mut links = entities
        .iter()
        .enumerate()
        .filter(|(index, candidate)| *index != source && candidate.id != origin.id)
        .filter_map(|(index, candidate)| {
            let score = similarity(origin, candidate);
            (score > 0.0).then_some(SimilarityLink {
                source,
                target: index,
                score,
            })
        })
        .collect::<Vec<_>>();

    links.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.target.cmp(&b.target)));
    links.truncate(limit);
    links
}
