//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that exercises a slice of the node
//! against the recording [`mock_hw::MockBoard`].  All tests run on the host
//! with no mesh stack or hardware required.

mod input_tests;
mod mock_hw;
mod request_tests;
