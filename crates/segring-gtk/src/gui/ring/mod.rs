pub mod view;

pub use view::{RingRenderer, draw, load_avatar, render_png};

/// Avatars are decoded at this size and scaled by cairo when drawn.
pub const AVATAR_SOURCE_SIZE: i32 = 512;
