mod auth_tests;
mod properties_tests;
