use crate::map::Entity;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Availability {
    Available,
    Open,
    NotLooking,
    #[default]
    Unknown,
}

impl Availability {
    pub const LISTED: [Self; 3] = [Self::Available, Self::Open, Self::NotLooking];

    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "available" => Self::Available,
            "open" => Self::Open,
            "not-looking" | "not_looking" | "notlooking" => Self::NotLooking,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Available => "Available now",
            Self::Open => "Open to offers",
            Self::NotLooking => "Not looking",
            Self::Unknown => "Unknown",
        }
    }

    pub fn relevance_weight(self) -> u32 {
        match self {
            Self::Available => 3,
            Self::Open => 2,
            Self::NotLooking => 1,
            Self::Unknown => 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub tech_stack: Vec<String>,
    pub impact: String,
    pub github_url: Option<String>,
}

/// A candidate as stored in the roster, richer than the map's [`Entity`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub location: String,
    pub github_url: Option<String>,
    pub bio: String,
    pub availability: Availability,
    pub tech_stack: Vec<String>,
    pub projects: Vec<Project>,
}

impl Profile {
    pub fn to_entity(&self, highlighted: bool) -> Entity {
        Entity {
            id: self.id.clone(),
            name: self.name.clone(),
            subtitle: self.location.clone(),
            tags: self.tech_stack.clone(),
            count: self.projects.len(),
            highlighted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn availability_accepts_roster_spellings() {
        assert_eq!(Availability::parse("available"), Availability::Available);
        assert_eq!(Availability::parse(" Open "), Availability::Open);
        assert_eq!(Availability::parse("not-looking"), Availability::NotLooking);
        assert_eq!(Availability::parse("maybe"), Availability::Unknown);
    }

    #[test]
    fn entity_carries_location_and_project_count() {
        let profile = Profile {
            id: "7".to_owned(),
            name: "Emi Watanabe".to_owned(),
            location: "Tokyo".to_owned(),
            tech_stack: vec!["Go".to_owned(), "Redis".to_owned()],
            projects: vec![Project::default(), Project::default()],
            ..Profile::default()
        };

        let entity = profile.to_entity(true);
        assert_eq!(entity.subtitle, "Tokyo");
        assert_eq!(entity.tags, vec!["Go", "Redis"]);
        assert_eq!(entity.count, 2);
        assert!(entity.highlighted);
    }
}
