/// User folder for every upload; authentication was removed, so there is only one
pub const DEFAULT_USER_ID: &str = "default_user";

/// Bytes of multipart framing allowed on top of the upload size limit
pub const MULTIPART_OVERHEAD: usize = 1024 * 1024;
