mod global_tests;
mod window_tests;
