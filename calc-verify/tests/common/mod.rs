pub mod assertions;
pub mod fixtures;
pub mod logging;

pub use assertions::{assert_contains, assert_exit_failure, assert_exit_success};
pub use fixtures::{TestConfig, calc_verify};
pub use logging::init_test_logging;
