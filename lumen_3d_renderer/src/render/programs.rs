//! Names of the device programs the renderer enables.

/// Forward lighting, one draw per light
pub const MULTIPASS: &str = "multiphong";
/// Forward lighting, all lights in one draw
pub const SINGLEPASS: &str = "singlephong";
/// Depth-only shadow pass
pub const DEPTH: &str = "depth";
/// Deferred geometry pass
pub const GBUFFERS: &str = "gbuffers";
/// Deferred full-screen lighting resolve
pub const DEFERRED_RESOLVE: &str = "deferred";
/// Textured full-screen copy
pub const SCREEN: &str = "screen";
/// Depth texture linearized with `u_camera_nearfar`
pub const DEPTH_LINEAR: &str = "depth_linear";
