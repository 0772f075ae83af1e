mod inject;
mod render;
mod serve;
mod strip;

pub use inject::{inject, InjectArgs};
pub use render::{render, RenderArgs};
pub use serve::{serve, ServeArgs};
pub use strip::{strip, StripArgs};
