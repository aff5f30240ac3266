use url::form_urlencoded;

/// Joins the configured API base URL and an endpoint path.
pub(crate) fn build_url(base_url: &str, endpoint: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let endpoint = endpoint.trim();

    if base.is_empty() {
        endpoint.to_string()
    } else {
        format!("{}/{}", base, endpoint.trim_start_matches('/'))
    }
}

/// Builds a `?key=value&...` query string, skipping absent and empty values.
/// Returns an empty string when nothing is left to encode.
pub(crate) fn build_query_string<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, Option<String>)>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut appended = false;

    for (key, value) in params {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            serializer.append_pair(key, &value);
            appended = true;
        }
    }

    if appended {
        format!("?{}", serializer.finish())
    } else {
        String::new()
    }
}

/// Shortens a secret for log output.
pub(crate) fn mask_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}...")
}
