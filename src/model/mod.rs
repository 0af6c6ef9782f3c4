pub mod error;
pub mod id;
pub mod player;
pub mod snapshot;
pub mod surface;
pub mod track;
pub mod view;
