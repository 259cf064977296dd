pub mod geo;
pub mod password;
pub mod test_utils;
