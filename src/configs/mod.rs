mod ddpg;
mod train;

pub use ddpg::DDPGConfig;
pub use train::TrainConfig;
