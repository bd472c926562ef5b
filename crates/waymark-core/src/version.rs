//! # Natural Version Ordering
//!
//! Compares version and build strings the way a human reads them:
//! `"0.9" < "0.10" < "1.0"`.
//!
//! Each string is scanned as a sequence of tokens, where a token is either a
//! maximal run of ASCII digits or a single non-digit byte.
//!
//! - Two digit runs compare by numeric value. Leading zeros are skipped and
//!   the remaining digits are compared by length, then lexically, so runs of
//!   any length are handled without parsing into a fixed-width integer.
//! - Every other pair of tokens compares by byte value. UTF-8 byte order
//!   matches code point order, so non-ASCII input sorts consistently.
//! - When one string runs out first, it sorts first: `"" < "1" < "1.0" < "1.0.0"`.
//!
//! The ordering is total and never panics. Digit runs that differ only in
//! leading zeros are equal, so `"1.01"` and `"1.1"` name the same version.

use std::cmp::Ordering;

/// Compare two version strings under natural ordering.
///
/// # Example
/// ```
/// use std::cmp::Ordering;
/// use waymark_core::version::compare;
///
/// assert_eq!(compare("0.9", "0.10"), Ordering::Less);
/// assert_eq!(compare("1.0", "1.0"), Ordering::Equal);
/// assert_eq!(compare("2.0-beta", "2.0"), Ordering::Greater);
/// ```
#[must_use]
pub fn compare(a: &str, b: &str) -> Ordering {
    let a = a.as_bytes();
    let b = b.as_bytes();
    let (mut i, mut j) = (0usize, 0usize);

    loop {
        match (a.get(i), b.get(j)) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(ca), Some(cb)) if ca.is_ascii_digit() && cb.is_ascii_digit() => {
                let end_a = digit_run_end(a, i);
                let end_b = digit_run_end(b, j);
                let ord = compare_digit_runs(&a[i..end_a], &b[j..end_b]);
                if ord != Ordering::Equal {
                    return ord;
                }
                i = end_a;
                j = end_b;
            }
            (Some(ca), Some(cb)) => {
                let ord = ca.cmp(cb);
                if ord != Ordering::Equal {
                    return ord;
                }
                i += 1;
                j += 1;
            }
        }
    }
}

/// Returns `true` if `candidate` sorts strictly after `baseline`.
#[must_use]
pub fn is_newer(candidate: &str, baseline: &str) -> bool {
    compare(candidate, baseline) == Ordering::Greater
}

fn digit_run_end(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |offset| start + offset)
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a = strip_leading_zeros(a);
    let b = strip_leading_zeros(b);
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn strip_leading_zeros(run: &[u8]) -> &[u8] {
    let first_significant = run.iter().position(|&b| b != b'0').unwrap_or(run.len());
    &run[first_significant..]
}

// =============================================================================
// TESTS
// =============================================================================
