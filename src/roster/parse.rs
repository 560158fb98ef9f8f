use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use serde_json::Value;

use super::profile::{Availability, Profile, Project};

#[derive(Clone, Debug, Deserialize)]
struct RawProject {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, rename = "techStack")]
    tech_stack: Vec<String>,
    #[serde(default)]
    impact: String,
    #[serde(default, rename = "githubUrl")]
    github_url: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawProfile {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    location: String,
    #[serde(default, rename = "githubUrl")]
    github_url: Option<String>,
    #[serde(default)]
    bio: String,
    #[serde(default)]
    availability: Option<String>,
    #[serde(default, rename = "techStack", alias = "tags")]
    tech_stack: Vec<String>,
    #[serde(default)]
    projects: Vec<RawProject>,
}

fn profile_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_owned()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Parses a roster document: either a bare array of profiles or an object
/// holding one under `students` or `profiles`.
pub fn parse_roster(raw: &str) -> Result<Vec<Profile>> {
    let parsed: Value = serde_json::from_str(raw).context("invalid JSON in roster")?;

    let entries = match &parsed {
        Value::Array(entries) => entries,
        Value::Object(object) => object
            .get("students")
            .or_else(|| object.get("profiles"))
            .and_then(Value::as_array)
            .ok_or_else(|| anyhow!("roster object has no `students` or `profiles` array"))?,
        _ => return Err(anyhow!("unexpected JSON type for roster")),
    };

    let mut profiles = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let raw = RawProfile::deserialize(entry)
            .with_context(|| format!("invalid profile at index {index}"))?;
        let id = profile_id(&raw.id)
            .ok_or_else(|| anyhow!("profile at index {index} has no string or numeric id"))?;

        let mut tech_stack = Vec::with_capacity(raw.tech_stack.len());
        for tag in raw.tech_stack {
            let tag = tag.trim();
            if !tag.is_empty() && !tech_stack.iter().any(|known| known == tag) {
                tech_stack.push(tag.to_owned());
            }
        }

        profiles.push(Profile {
            id,
            name: raw.name.trim().to_owned(),
            email: raw.email,
            location: raw.location,
            github_url: raw.github_url.filter(|url| !url.is_empty()),
            bio: raw.bio,
            availability: raw
                .availability
                .as_deref()
                .map(Availability::parse)
                .unwrap_or_default(),
            tech_stack,
            projects: raw
                .projects
                .into_iter()
                .map(|project| Project {
                    title: project.title,
                    description: project.description,
                    tech_stack: project.tech_stack,
                    impact: project.impact,
                    github_url: project.github_url.filter(|url| !url.is_empty()),
                })
                .collect(),
        });
    }

    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_bare_array_with_numeric_ids() {
        let profiles = parse_roster(
            r#"[
                {
                    "id": 1,
                    "name": "Yuki Tanaka",
                    "location": "Tokyo",
                    "availability": "available",
                    "techStack": ["Rust", "React", " Rust ", ""],
                    "projects": [
                        {"title": "Chat Engine", "techStack": ["Rust"], "githubUrl": ""},
                        {"title": "WASM Image Processor"}
                    ]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(profiles.len(), 1);
        let profile = &profiles[0];
        assert_eq!(profile.id, "1");
        assert_eq!(profile.availability, Availability::Available);
        assert_eq!(profile.tech_stack, vec!["Rust", "React"]);
        assert_eq!(profile.projects.len(), 2);
        assert_eq!(profile.projects[0].github_url, None);
    }

    #[test]
    fn parses_a_students_wrapper_with_string_ids() {
        let profiles = parse_roster(
            r#"{"students": [{"id": "a-17", "name": "Mio", "tags": ["Vue"], "availability": "not-looking"}]}"#,
        )
        .unwrap();

        assert_eq!(profiles[0].id, "a-17");
        assert_eq!(profiles[0].tech_stack, vec!["Vue"]);
        assert_eq!(profiles[0].availability, Availability::NotLooking);
        assert!(profiles[0].projects.is_empty());
    }

    #[test]
    fn empty_roster_is_not_an_error() {
        assert!(parse_roster("[]").unwrap().is_empty());
        assert!(parse_roster(r#"{"profiles": []}"#).unwrap().is_empty());
    }

    #[test]
    fn rejects_missing_ids_and_odd_documents() {
        let error = parse_roster(r#"[{"name": "nobody"}]"#).unwrap_err();
        assert!(error.to_string().contains("index 0"));

        assert!(parse_roster("42").is_err());
        assert!(parse_roster(r#"{"people": []}"#).is_err());
        assert!(parse_roster("not json").is_err());
    }
}
