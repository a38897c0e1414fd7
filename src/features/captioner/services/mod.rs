mod caption_service;

pub use caption_service::*;
