// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Resource path resolver.

/// Path separator used by resource paths, independent of the host platform.
pub const SEPARATOR: char = '/';

/// Splits `path` into its non-empty segments.
///
/// Leading, trailing and repeated separators produce no segments.
pub fn segments(path: &str) -> Vec<&str> {
    path.split(SEPARATOR).filter(|s| !s.is_empty()).collect()
}

/// Computes the segments leading from `base` to `target`.
///
/// When `base` does not end with [`SEPARATOR`] its last segment names a file and is
/// dropped before comparison. The result is one `..` per base segment left after
/// the shared prefix, followed by the rest of `target`.
///
/// ```
/// use swid_core::relativize;
///
/// assert_eq!(relativize("a/b/c", "a/b/d"), ["d"]);
/// assert_eq!(relativize("a/b/", "a/b/x/y"), ["x", "y"]);
/// assert_eq!(relativize("a/b/c", "x/y"), ["..", "..", "x", "y"]);
/// ```
pub fn relativize(base: &str, target: &str) -> Vec<String> {
    let mut from = segments(base);
    if !base.ends_with(SEPARATOR) {
        from.pop();
    }
    let to = segments(target);

    let shared = from
        .iter()
        .zip(&to)
        .take_while(|(a, b)| a == b)
        .count();

    std::iter::repeat_n("..", from.len() - shared)
        .chain(to[shared..].iter().copied())
        .map(str::to_owned)
        .collect()
}
