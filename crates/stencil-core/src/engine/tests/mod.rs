//! Tests for the template compiler and executor,
//! organized into focused submodules.

use super::*;

// Test helper functions
mod helpers;



mod diagnostics_mapping;
mod render_modes;
