//! Permission scope checks.

/// Whether every scope in `required` was granted.
///
/// `granted` is the space-delimited scope string reported by the identity
/// provider. Matching is per token, so a scope that is merely a prefix of a
/// granted one does not count.
pub fn is_satisfied<S: AsRef<str>>(required: &[S], granted: &str) -> bool {
    required
        .iter()
        .all(|scope| granted.split_whitespace().any(|g| g == scope.as_ref()))
}

/// Required scopes that are absent from `granted`.
pub fn missing<'a, S: AsRef<str>>(required: &'a [S], granted: &str) -> Vec<&'a str> {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|scope| !granted.split_whitespace().any(|g| g == *scope))
        .collect()
}
