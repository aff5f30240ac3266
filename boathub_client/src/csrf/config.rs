/// Endpoint serving the anti-forgery token for the current session.
pub const CSRF_TOKEN_ENDPOINT: &str = "/api/csrf-token";

/// Header name used until the server announces its own.
pub const DEFAULT_CSRF_HEADER_NAME: &str = "X-CSRF-TOKEN";

/// Form-field name used until the server announces its own.
pub const DEFAULT_CSRF_FIELD_NAME: &str = "_csrf";
