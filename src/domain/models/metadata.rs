//! Reserved task metadata labels.
//!
//! Tasks carry a flat string map. Producers and handlers agree on the
//! label names below; resource IDs are numeric strings, most of them
//! also interpretable as 64-bit floats serving as sorted-set scores.

use std::collections::BTreeMap;

pub const TASK_ACTION: &str = "task.venturemark.co/action";
pub const TASK_AUDIENCE: &str = "task.venturemark.co/audience";
pub const TASK_ID: &str = "task.venturemark.co/id";
pub const TASK_INTERVAL: &str = "task.venturemark.co/interval";
pub const TASK_RESOURCE: &str = "task.venturemark.co/resource";

pub const AUDIENCE_ID: &str = "audience.venturemark.co/id";
pub const INVITE_ID: &str = "invite.venturemark.co/id";
pub const MESSAGE_ID: &str = "message.venturemark.co/id";
pub const ROLE_ID: &str = "role.venturemark.co/id";
pub const SUBJECT_ID: &str = "subject.venturemark.co/id";
pub const TIMELINE_ID: &str = "timeline.venturemark.co/id";
pub const UPDATE_ID: &str = "update.venturemark.co/id";
pub const USER_ID: &str = "user.venturemark.co/id";
pub const VENTURE_ID: &str = "venture.venturemark.co/id";

/// Overrides the resource kind a cross-cutting handler operates on,
/// e.g. role cleanup emitted during a user delete.
pub const RESOURCE_KIND: &str = "resource.venturemark.co/kind";

/// User record feature flag gating the weekly reminder mail.
pub const FEATURE_WEEKLY_UPDATE: &str = "feature.venturemark.co/weekly-update";

/// Reports whether `got` carries every pair of `want` with equal values.
/// Missing keys fail; ordering is irrelevant.
pub fn contains(got: &BTreeMap<String, String>, want: &[(&str, &str)]) -> bool {
    want.iter()
        .all(|(k, v)| got.get(*k).is_some_and(|g| g == v))
}

/// The metadata label holding the ID for a given resource kind.
pub fn id_label(kind: &str) -> Option<&'static str> {
    match kind {
        "audience" => Some(AUDIENCE_ID),
        "invite" => Some(INVITE_ID),
        "message" => Some(MESSAGE_ID),
        "role" => Some(ROLE_ID),
        "subject" => Some(SUBJECT_ID),
        "timeline" => Some(TIMELINE_ID),
        "update" => Some(UPDATE_ID),
        "user" => Some(USER_ID),
        "venture" => Some(VENTURE_ID),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn meta(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn contains_matches_subset() {
        let got = meta(&[
            (TASK_ACTION, "delete"),
            (TASK_RESOURCE, "venture"),
            (VENTURE_ID, "1"),
        ]);

        assert!(contains(&got, &[(TASK_ACTION, "delete")]));
        assert!(contains(
            &got,
            &[(TASK_ACTION, "delete"), (TASK_RESOURCE, "venture")]
        ));
        assert!(contains(&got, &[]));
    }

    #[test]
    fn contains_fails_on_missing_key() {
        let got = meta(&[(TASK_ACTION, "delete")]);

        assert!(!contains(&got, &[(TASK_RESOURCE, "venture")]));
    }

    #[test]
    fn contains_fails_on_unequal_value() {
        let got = meta(&[(TASK_ACTION, "create")]);

        assert!(!contains(&got, &[(TASK_ACTION, "delete")]));
    }

    #[test]
    fn id_label_covers_known_kinds() {
        assert_eq!(id_label("venture"), Some(VENTURE_ID));
        assert_eq!(id_label("user"), Some(USER_ID));
        assert_eq!(id_label("reminder"), None);
    }

    proptest! {
        #[test]
        fn contains_any_map_contains_its_own_pairs(
            pairs in proptest::collection::btree_map("[a-z/.]{1,12}", "[a-z0-9]{0,8}", 0..8)
        ) {
            let want: Vec<(&str, &str)> = pairs
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();

            prop_assert!(contains(&pairs, &want));
        }
    }
}
