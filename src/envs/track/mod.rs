mod action;
mod config;
mod observation;
mod state;
mod track_env;

pub use action::DriveAction;
pub use config::TrackConfig;
pub use observation::TrackObs;
pub use state::Vec2;
pub use track_env::TrackEnv;
