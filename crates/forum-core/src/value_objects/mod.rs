//! Value objects - immutable types that represent domain concepts

mod actor;
mod post_id;

pub use actor::{Actor, MAX_ACTOR_KEY_LEN};
pub use post_id::{PostId, PostIdParseError};
