mod demo;
mod filter;
mod load;
mod parse;
mod profile;

pub use demo::demo_roster;
pub use filter::{RosterFilter, TOP_LIMIT, relevance_score, tag_counts};
pub use load::load_roster;
pub use parse::parse_roster;
pub use profile::{Availability, Profile, Project};
