//! Discord interaction handlers
//!
//! This module provides handlers for Discord interactions such as autocomplete.

/// Autocomplete handlers for sectors, employees, teams, designs and periods
pub mod autocomplete;
