pub mod inspect;
pub mod path;
pub mod tree;
