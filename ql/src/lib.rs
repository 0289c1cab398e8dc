pub mod learn;
pub mod log;
pub mod prelude;
pub mod util;

mod test_environment;
