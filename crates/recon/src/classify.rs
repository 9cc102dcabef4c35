use crate::model::RelationType;

/// Lowercase `s` after dropping every character outside `A-Z`/`a-z`.
pub fn normalize(s: &str) -> String {
    s.chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Whether a product needs a human to confirm its manufacturer.
///
/// False as soon as one normalized manufacturer occurs in the normalized
/// title. An empty list always needs investigation.
pub fn investigate<S: AsRef<str>>(manufacturers: &[S], title: &str) -> bool {
    let title = normalize(title);
    !manufacturers
        .iter()
        .any(|m| title.contains(normalize(m.as_ref()).as_str()))
}

/// Label the relationship between a product's deduplicated manufacturers.
///
/// The two-name branch is a fixed decision table; see the tests for the
/// tie-breaks it encodes.
pub fn classify<S: AsRef<str>>(manufacturers: &[S], title: &str) -> RelationType {
    match manufacturers {
        [] => RelationType::None,
        [_] => {
            if investigate(manufacturers, title) {
                RelationType::Unknown
            } else {
                RelationType::Parent
            }
        }
        [first, second] => classify_pair(
            &normalize(first.as_ref()),
            &normalize(second.as_ref()),
            title,
            investigate(manufacturers, title),
        ),
        _ => RelationType::Sibling,
    }
}

fn classify_pair(a: &str, b: &str, title: &str, needs_investigation: bool) -> RelationType {
    if !needs_investigation && a == b {
        return RelationType::Parent;
    }

    let first_is_substring = b.contains(a);
    let second_is_substring = a.contains(b);

    if first_is_substring || second_is_substring {
        return if first_is_substring {
            RelationType::ChildParent
        } else {
            RelationType::ParentChild
        };
    }

    let title = normalize(title);
    match (title.contains(a), title.contains(b)) {
        (true, true) => {
            if a.len() > b.len() {
                RelationType::ChildParent
            } else {
                RelationType::ParentChild
            }
        }
        (true, false) => RelationType::ParentChild,
        (false, true) => RelationType::ChildParent,
        (false, false) => RelationType::Sibling,
    }
}
