use eframe::egui::Color32;

pub const GENERAL_TAG: &str = "General";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ClusterLabel {
    AiMl,
    StartupBuilders,
    RustSystems,
    Junior,
    General,
}

impl ClusterLabel {
    pub const ALL: [Self; 5] = [
        Self::AiMl,
        Self::StartupBuilders,
        Self::RustSystems,
        Self::Junior,
        Self::General,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::AiMl => "AI/ML",
            Self::StartupBuilders => "Startup/Builders",
            Self::RustSystems => "Rust/Systems",
            Self::Junior => "Junior",
            Self::General => "General",
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::AiMl => Color32::from_rgb(0x8f, 0xbf, 0xb6),
            Self::StartupBuilders => Color32::from_rgb(0xf0, 0xa3, 0x7a),
            Self::RustSystems => Color32::from_rgb(0x9d, 0xb8, 0xa0),
            Self::Junior => Color32::from_rgb(0xe7, 0xa3, 0x9a),
            Self::General => Color32::from_rgb(0xb5, 0xc7, 0xc3),
        }
    }
}

// First matching row wins. Overlapping semantics between rows are intentional.
const CLUSTER_RULES: [(ClusterLabel, &[&str]); 4] = [
    (ClusterLabel::AiMl, &["ML", "AI", "TensorFlow", "PyTorch"]),
    (ClusterLabel::StartupBuilders, &["React", "Node", "TypeScript"]),
    (ClusterLabel::RustSystems, &["Rust", "Go", "WebAssembly"]),
    (ClusterLabel::Junior, &["Python", "Vue", "JavaScript"]),
];

pub fn assign_cluster(primary_tag: &str) -> ClusterLabel {
    CLUSTER_RULES
        .iter()
        .find(|(_, tags)| tags.contains(&primary_tag))
        .map(|(label, _)| *label)
        .unwrap_or(ClusterLabel::General)
}

pub fn assign_cluster_for_tags(tags: &[String]) -> ClusterLabel {
    tags.first()
        .map(|tag| assign_cluster(tag))
        .unwrap_or(ClusterLabel::General)
}

pub fn primary_tag(tags: &[String]) -> &str {
    tags.first()
        .map(String::as_str)
        .filter(|tag| !tag.is_empty())
        .unwrap_or(GENERAL_TAG)
}

const SEMANTIC_TAG_COLORS: [(&str, ClusterLabel); 12] = [
    ("AI", ClusterLabel::AiMl),
    ("ML", ClusterLabel::AiMl),
    ("TensorFlow", ClusterLabel::AiMl),
    ("PyTorch", ClusterLabel::AiMl),
    ("React", ClusterLabel::StartupBuilders),
    ("Node", ClusterLabel::StartupBuilders),
    ("TypeScript", ClusterLabel::StartupBuilders),
    ("Rust", ClusterLabel::RustSystems),
    ("Go", ClusterLabel::RustSystems),
    ("WebAssembly", ClusterLabel::RustSystems),
    ("Python", ClusterLabel::Junior),
    ("JavaScript", ClusterLabel::Junior),
];

const TAG_PALETTE: [(&str, u32); 22] = [
    ("Vue", 0xe7a39a),
    ("Angular", 0xdd0031),
    ("Svelte", 0xff3e00),
    ("Java", 0x007396),
    ("Ruby", 0xcc342d),
    ("ReactNative", 0x61dafb),
    ("Flutter", 0x02569b),
    ("Swift", 0xfa7343),
    ("Kotlin", 0x7f52ff),
    ("Docker", 0x2496ed),
    ("Kubernetes", 0x326ce5),
    ("AWS", 0xff9900),
    ("GCP", 0x4285f4),
    ("PostgreSQL", 0x336791),
    ("MongoDB", 0x47a248),
    ("Redis", 0xdc382d),
    ("Blockchain", 0xf0b90b),
    ("GraphQL", 0xe10098),
    ("WebGL", 0x990000),
    ("Go", 0x00add8),
    ("Python", 0x3776ab),
    ("Node", 0x339933),
];

const FALLBACK_TAG_COLOR: Color32 = Color32::from_rgb(0xa0, 0xa0, 0xa0);

fn rgb_hex(value: u32) -> Color32 {
    Color32::from_rgb((value >> 16) as u8, (value >> 8) as u8, value as u8)
}

/// Semantic cluster colours win over the per-technology palette.
pub fn tag_color(tag: &str) -> Color32 {
    if let Some((_, label)) = SEMANTIC_TAG_COLORS.iter().find(|(name, _)| *name == tag) {
        return label.color();
    }

    TAG_PALETTE
        .iter()
        .find(|(name, _)| *name == tag)
        .map(|(_, hex)| rgb_hex(*hex))
        .unwrap_or(FALLBACK_TAG_COLOR)
}

pub fn primary_tag_color(tags: &[String]) -> Color32 {
    tags.first()
        .map(|tag| tag_color(tag))
        .unwrap_or(FALLBACK_TAG_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn priority_order_is_fixed() {
        assert_eq!(assign_cluster("PyTorch"), ClusterLabel::AiMl);
        assert_eq!(assign_cluster("TypeScript"), ClusterLabel::StartupBuilders);
        assert_eq!(assign_cluster("WebAssembly"), ClusterLabel::RustSystems);
        assert_eq!(assign_cluster("Vue"), ClusterLabel::Junior);
        assert_eq!(assign_cluster("Docker"), ClusterLabel::General);
        assert_eq!(assign_cluster(""), ClusterLabel::General);
    }

    #[test]
    fn only_the_first_tag_decides() {
        let tags = vec!["Python".to_owned(), "ML".to_owned()];
        assert_eq!(assign_cluster_for_tags(&tags), ClusterLabel::Junior);
        assert_eq!(assign_cluster_for_tags(&[]), ClusterLabel::General);
    }

    #[test]
    fn primary_tag_falls_back_to_general() {
        assert_eq!(primary_tag(&[]), GENERAL_TAG);
        assert_eq!(primary_tag(&[String::new()]), GENERAL_TAG);
        assert_eq!(primary_tag(&["Go".to_owned()]), "Go");
    }

    #[test]
    fn semantic_colors_override_palette() {
        assert_eq!(tag_color("Go"), ClusterLabel::RustSystems.color());
        assert_eq!(tag_color("Docker"), Color32::from_rgb(0x24, 0x96, 0xed));
        assert_eq!(tag_color("COBOL"), FALLBACK_TAG_COLOR);
        assert_eq!(primary_tag_color(&[]), FALLBACK_TAG_COLOR);
    }

    proptest! {
        #[test]
        fn assignment_is_total_and_deterministic(tags in prop::collection::vec(".{0,12}", 0..6)) {
            let first = assign_cluster_for_tags(&tags);
            let second = assign_cluster_for_tags(&tags);
            prop_assert!(ClusterLabel::ALL.contains(&first));
            prop_assert_eq!(first, second);
        }
    }
}
