//! Renderer-independent core of the talent map: cluster assignment, seeded
//! layout, the coupled node and cluster simulations, camera and pointer
//! interaction. The `app` module only paints [`MapFrame`] snapshots and
//! forwards input to a [`TalentMap`].

pub mod cluster;
pub mod entity;
pub mod handle;
pub mod interaction;
pub mod layout;
mod pack;
pub mod physics;
pub mod similarity;
pub mod viewport;

pub use cluster::{ClusterLabel, tag_color};
pub use entity::Entity;
pub use handle::{MapCallbacks, MapFrame, MapOptions, TalentMap};
pub use interaction::Hit;
pub use viewport::SMOOTH_ZOOM_DURATION_SECS;
