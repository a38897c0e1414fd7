pub mod constants;
pub mod images;
pub mod templates;

#[cfg(test)]
pub mod test_helpers;
