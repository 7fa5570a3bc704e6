mod helpers;

mod config_tests;
mod read_tests;
