// Engine modules: frame pacing and physics

pub mod game_loop;
pub mod physics;
