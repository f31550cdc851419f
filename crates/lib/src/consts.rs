/// Application name, used in generated-file banners and staging file names.
pub const APP_NAME: &str = "idconverge";

/// Name of the managed identity service; drives directory and file names.
pub const SERVICE_NAME: &str = "keystone";

/// Environment variable that relocates every managed path under a root.
pub const ROOT_ENV: &str = "IDCONVERGE_ROOT";
