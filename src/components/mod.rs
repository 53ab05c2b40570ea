pub mod help;
pub mod path_bar;
pub mod preview;
pub mod status_bar;
pub mod tree;
