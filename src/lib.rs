pub mod hotload;
pub mod level;
pub mod player;
pub mod rules;
pub mod settings;
pub mod ui;
pub mod world;
