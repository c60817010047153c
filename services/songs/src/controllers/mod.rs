pub mod result;
pub mod root;
pub mod song;
pub use result::{Action, ActionResult, View, ViewModel, ViewName};
pub use root::RootController;
pub use song::SongController;
