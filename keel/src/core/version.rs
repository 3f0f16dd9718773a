//! Ordering for artifact version tokens.
//!
//! Versions compare in natural order: runs of ASCII digits compare by numeric
//! value and everything else compares lexically, so `"10"` sorts after `"2"`
//! and `"1.10.0"` after `"1.9.3"`.

use std::cmp::Ordering;

use crate::core::types::DeliveryArtifactVersion;

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Number(&'a str),
    Text(&'a str),
}

/// Total order over version tokens.
///
/// Tokens that only differ in leading zeros (`"01"` vs `"1"`) fall back to a
/// plain string comparison so the order stays total and consistent with `==`.
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let mut lhs = segments(left);
    let mut rhs = segments(right);
    loop {
        let ordering = match (lhs.next(), rhs.next()) {
            (None, None) => return left.cmp(right),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(a), Some(b)) => compare_segments(&a, &b),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}

/// Sort versions newest first.
pub fn sort_descending(versions: &mut [DeliveryArtifactVersion]) {
    versions.sort_by(|a, b| compare_versions(&b.version, &a.version));
}

fn compare_segments(left: &Segment<'_>, right: &Segment<'_>) -> Ordering {
    match (left, right) {
        (Segment::Number(a), Segment::Number(b)) => compare_numeric(a, b),
        (Segment::Text(a), Segment::Text(b)) => a.cmp(b),
        // a release component outranks a qualifier at the same position
        (Segment::Number(_), Segment::Text(_)) => Ordering::Greater,
        (Segment::Text(_), Segment::Number(_)) => Ordering::Less,
    }
}

/// Compare digit runs without parsing, so arbitrarily long runs never overflow.
fn compare_numeric(left: &str, right: &str) -> Ordering {
    let a = left.trim_start_matches('0');
    let b = right.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn segments(token: &str) -> impl Iterator<Item = Segment<'_>> {
    let mut rest = token;
    std::iter::from_fn(move || {
        let first = rest.chars().next()?;
        let numeric = first.is_ascii_digit();
        let end = rest
            .char_indices()
            .find(|(_, ch)| ch.is_ascii_digit() != numeric)
            .map(|(idx, _)| idx)
            .unwrap_or(rest.len());
        let (head, tail) = rest.split_at(end);
        rest = tail;
        Some(if numeric {
            Segment::Number(head)
        } else {
            Segment::Text(head)
        })
    })
}
