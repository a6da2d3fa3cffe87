//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that drives the controller against
//! mock adapters.  All tests run on the host (x86_64) with no real
//! hardware or server required.

mod controller_tests;
mod mock_hw;
mod policy_tests;
