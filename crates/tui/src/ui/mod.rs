pub mod keymap;
pub mod screens;
pub mod terminal;
pub mod theme;
