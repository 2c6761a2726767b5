/// Header prefix git writes in front of the author identity.
pub const FROM_PREFIX: &str = "From: ";

/// Extract the identity line from a commit's patch text.
///
/// `git format-patch` output starts with a `From <sha> <date>` marker
/// line, followed by the `From: Name <email>` header. The body is trimmed
/// first, then line index 1 is returned verbatim. Patches with fewer than
/// two lines have no identity line.
pub fn identity_line(patch_text: &str) -> Option<&str> {
    patch_text.trim().split('\n').nth(1)
}

/// Strip a single leading `From: `; anything else is returned unchanged.
pub fn strip_from_prefix(line: &str) -> &str {
    line.strip_prefix(FROM_PREFIX).unwrap_or(line)
}
