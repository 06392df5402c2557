//! Unit test modules.

mod distribution_test;
mod normalized_power_test;
mod zones_test;
