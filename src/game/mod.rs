pub mod cell;
pub mod command_buffer;
pub mod constants;
pub mod events;
pub mod field;
pub mod placement;
pub mod player;
pub mod session;
pub mod strategy;
pub mod systems;
pub mod timestep;
