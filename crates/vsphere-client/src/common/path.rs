//! Inventory path helpers
//!
//! Paths are `/`-separated from the root folder (`/dc1/host/cluster1`).
//! A `/` inside an object name is escaped as `%2f` the way vCenter does.
//! Patterns only know one wildcard: `*` matches any run of characters,
//! path separators included.

/// Escape an object name for use as a single path segment
pub fn escape_segment(name: &str) -> String {
    name.replace('%', "%25").replace('/', "%2f")
}

/// Append `name` to `parent`
pub fn join(parent: &str, name: &str) -> String {
    let parent = parent.trim_end_matches('/');
    format!("{}/{}", parent, escape_segment(name))
}

/// Part of `pattern` before its first wildcard
pub fn literal_prefix(pattern: &str) -> &str {
    match pattern.find('*') {
        Some(idx) => &pattern[..idx],
        None => pattern,
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}

/// Whether objects below `path` could still match `pattern`
///
/// Used to prune the inventory walk. Comparison is per whole segment, so
/// `/dc10` never counts as being inside `/dc1`. A wildcard-free pattern is
/// only descended towards, never below.
pub fn may_contain(pattern: &str, path: &str) -> bool {
    let path = segments(path);

    if !pattern.contains('*') {
        let target = segments(pattern);
        return path.len() < target.len() && target.starts_with(&path);
    }

    // literal prefix = whole segments, then a partial segment the wildcard continues
    let prefix = literal_prefix(pattern);
    let (whole, partial) = match prefix.rfind('/') {
        Some(idx) => (segments(&prefix[..idx]), &prefix[idx + 1..]),
        None => (Vec::new(), prefix),
    };

    if path.len() <= whole.len() {
        return whole.starts_with(&path);
    }
    path.starts_with(&whole) && path[whole.len()].starts_with(partial)
}

/// Match `path` against `pattern`
pub fn matches(pattern: &str, path: &str) -> bool {
    let p = pattern.as_bytes();
    let s = path.as_bytes();
    let (mut pi, mut si) = (0usize, 0usize);
    let mut star: Option<usize> = None;
    let mut resume = 0usize;

    while si < s.len() {
        if pi < p.len() && p[pi] == b'*' {
            star = Some(pi);
            pi += 1;
            resume = si;
        } else if pi < p.len() && p[pi] == s[si] {
            pi += 1;
            si += 1;
        } else if let Some(star_idx) = star {
            pi = star_idx + 1;
            resume += 1;
            si = resume;
        } else {
            return false;
        }
    }

    while pi < p.len() && p[pi] == b'*' {
        pi += 1;
    }
    pi == p.len()
}
