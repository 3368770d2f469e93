//! Stable error codes for programmatic matching.
//!
//! Display strings may be reworded between releases; these constants are
//! the contract scripts and calling tools should match on instead.

pub const CONTAINER_IO: &str = "PBITX_CONTAINER_001";
pub const CONTAINER_ZIP: &str = "PBITX_CONTAINER_002";
pub const CONTAINER_NOT_ZIP: &str = "PBITX_CONTAINER_003";
pub const CONTAINER_NOT_TEMPLATE: &str = "PBITX_CONTAINER_004";
pub const CONTAINER_TOO_MANY_ENTRIES: &str = "PBITX_CONTAINER_005";
pub const CONTAINER_MEMBER_TOO_LARGE: &str = "PBITX_CONTAINER_006";
pub const CONTAINER_TOTAL_TOO_LARGE: &str = "PBITX_CONTAINER_007";

pub const WORKSPACE_STALE_REMOVE: &str = "PBITX_WORKSPACE_001";
pub const WORKSPACE_CREATE: &str = "PBITX_WORKSPACE_002";
pub const WORKSPACE_REMOVE: &str = "PBITX_WORKSPACE_003";

pub const EXTRACT_MEMBER_MISSING: &str = "PBITX_EXTRACT_001";
pub const EXTRACT_MEMBER_DECODE: &str = "PBITX_EXTRACT_002";
pub const EXTRACT_MEMBER_JSON: &str = "PBITX_EXTRACT_003";
pub const EXTRACT_IO: &str = "PBITX_EXTRACT_004";
