mod replay_buffer;
mod ou_noise;

pub use replay_buffer::ReplayBuffer;
pub use ou_noise::OuNoise;
