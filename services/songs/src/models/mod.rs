pub mod model_state;
pub mod song;

pub use model_state::ModelState;
pub use song::{Song, SongForm};
