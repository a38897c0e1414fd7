mod caption;

pub use caption::*;
