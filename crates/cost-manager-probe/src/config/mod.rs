// crates/cost-manager-probe/src/config/mod.rs
// ============================================================================
// Module: Suite Configuration
// Description: Typed configuration for the conformance suite.
// Purpose: Combine profile defaults, a TOML file, and environment overrides.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is resolved in layers: the selected [`Profile`] supplies
//! defaults, an optional TOML file refines them, and `COST_MANAGER_*`
//! environment variables override both. The result is validated fail-closed
//! before any request is sent.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod suite;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::ConformanceEnv;
pub use env::EnvOverrides;
pub use env::read_env_strict;
pub use suite::ConfigError;
pub use suite::ConfigFile;
pub use suite::FixtureConfig;
pub use suite::Profile;
pub use suite::ServiceEndpoints;
pub use suite::ServiceKind;
pub use suite::SetupMode;
pub use suite::SuiteConfig;
