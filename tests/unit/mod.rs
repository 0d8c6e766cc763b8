//! Unit test modules.

mod curves_test;
mod dataset_test;
mod strategies_test;
