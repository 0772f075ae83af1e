//! Block descriptors and the page renderer registry.
//!
//! A page module's default export is an array of `{ type, props }`
//! descriptors; the registry maps each `type` to a render function and
//! degrades gracefully when one is missing.

pub mod block;
pub mod error;
pub mod registry;

pub use block::{blocks_from_module, value_to_json, Block};
pub use error::{RenderError, RenderResult};
pub use registry::{escape_html, BlockRegistry, RenderFn, RenderOutput};
