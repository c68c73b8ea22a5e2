//! The components module contains all shared components for our app.

mod admin;
mod app;
mod audio;
mod icons;
mod login;
mod player;
mod settings;

pub use admin::*;
pub use app::*;
pub use audio::*;
pub use icons::*;
pub use login::*;
pub use player::*;
pub use settings::*;
