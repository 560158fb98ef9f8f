use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use super::demo::demo_roster;
use super::parse::parse_roster;
use super::profile::Profile;

/// Reads the roster at `path`, or the built-in demo roster when no path is
/// given.
pub fn load_roster(path: Option<&Path>) -> Result<Vec<Profile>> {
    let Some(path) = path else {
        let profiles = demo_roster();
        info!(profiles = profiles.len(), "using built-in demo roster");
        return Ok(profiles);
    };

    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster {}", path.display()))?;
    let profiles =
        parse_roster(&raw).with_context(|| format!("failed to parse roster {}", path.display()))?;

    info!(profiles = profiles.len(), path = %path.display(), "roster loaded");
    Ok(profiles)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::process;

    use super::*;

    fn scratch_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("talent-map-{}-{name}", process::id()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn no_path_falls_back_to_the_demo_roster() {
        let profiles = load_roster(None).unwrap();
        assert_eq!(profiles, demo_roster());
    }

    #[test]
    fn reads_a_roster_file() {
        let path = scratch_file("ok.json", r#"[{"id": 3, "name": "Kenji", "techStack": ["Go"]}]"#);
        let profiles = load_roster(Some(&path)).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Kenji");
    }

    #[test]
    fn failures_name_the_file() {
        let missing = std::env::temp_dir().join("talent-map-missing-roster.json");
        let error = load_roster(Some(&missing)).unwrap_err();
        assert!(format!("{error:#}").contains("failed to read roster"));

        let path = scratch_file("bad.json", "{");
        let error = load_roster(Some(&path)).unwrap_err();
        fs::remove_file(&path).unwrap();
        let message = format!("{error:#}");
        assert!(message.contains("failed to parse roster"));
        assert!(message.contains("invalid JSON in roster"));
    }
}
