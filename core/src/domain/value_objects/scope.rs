//! Space-delimited OAuth2 scope strings (RFC 6749 section 3.3).

/// Split a scope string into individual scopes, dropping duplicates
pub fn parse(scope: &str) -> Vec<String> {
    let mut scopes: Vec<String> = Vec::new();
    for token in scope.split_whitespace() {
        if !scopes.iter().any(|existing| existing == token) {
            scopes.push(token.to_string());
        }
    }
    scopes
}

/// Join scopes back into their wire form
pub fn join<S: AsRef<str>>(scopes: &[S]) -> String {
    scopes
        .iter()
        .map(|scope| scope.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}
