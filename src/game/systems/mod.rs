pub mod eating;
pub mod movement;
pub mod split;
