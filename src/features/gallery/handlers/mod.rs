mod gallery_handler;

pub use gallery_handler::*;
