pub mod input;
pub mod lanes;
pub mod mode;
pub mod view;
