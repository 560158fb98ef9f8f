mod interaction;
mod view;

pub(super) use interaction::ZOOM_STEP;
