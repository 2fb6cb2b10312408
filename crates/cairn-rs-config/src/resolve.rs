//! Precedence helpers: the first present, non-blank candidate wins.

/// Return the first candidate that is present and not blank.
pub fn resolve_setting<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Return the first present candidate, or the hardcoded fallback.
pub fn resolve_with_fallback<'a, I>(candidates: I, fallback: &str) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    resolve_setting(candidates).unwrap_or_else(|| fallback.to_string())
}
