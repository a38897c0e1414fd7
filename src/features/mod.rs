pub mod captioner;
pub mod gallery;
