pub mod bodies;
pub mod load_from_file;
pub mod save;
pub mod water_simulation;
