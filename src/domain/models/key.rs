//! Key families of the keyspace-addressed store.
//!
//! Sorted-set lists are scoped by their parent resource; elements are
//! simple keys. A resource's ID is always its sorted-set score within
//! the parent list.

/// Distributed once-per-week latch for the reminder scheduler.
pub const WEEKLY_STAMP: &str = "apiworker.venturemark.co:rem:wee";

/// Walker pattern matching every user element.
pub const USER_PATTERN: &str = "use:*";

pub fn venture(vid: &str) -> String {
    format!("ven:{vid}")
}

pub fn timeline_list(vid: &str) -> String {
    format!("tml:{vid}")
}

pub fn update_list(vid: &str, tid: &str) -> String {
    format!("upd:{vid}:{tid}")
}

pub fn message_list(vid: &str, tid: &str, uid: &str) -> String {
    format!("mes:{vid}:{tid}:{uid}")
}

pub fn audience_list(vid: &str) -> String {
    format!("aud:{vid}")
}

pub fn invite_list(vid: &str) -> String {
    format!("inv:{vid}")
}

pub fn role_list(kind: &str, id: &str) -> String {
    format!("rol:{kind}:{id}")
}

pub fn subject(sid: &str, kind: &str) -> String {
    format!("sub:{sid}:{kind}")
}

pub fn user(uid: &str) -> String {
    format!("use:{uid}")
}

pub fn claim(uid: &str) -> String {
    format!("cla:{uid}")
}

/// Walker pattern matching every update list under a timeline.
pub fn update_pattern(vid: &str, tid: &str) -> String {
    format!("upd:{vid}:{tid}*")
}

/// Walker pattern matching every message list under an update.
pub fn message_pattern(vid: &str, tid: &str, uid: &str) -> String {
    format!("mes:{vid}:{tid}:{uid}*")
}

/// Walker pattern matching every subject membership of a subject.
pub fn subject_pattern(sid: &str) -> String {
    format!("*sub:{sid}*")
}

/// The user ID encoded in a user element key.
pub fn user_id(key: &str) -> Option<&str> {
    key.strip_prefix("use:").filter(|uid| !uid.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_are_parent_scoped() {
        assert_eq!(timeline_list("1"), "tml:1");
        assert_eq!(update_list("1", "2"), "upd:1:2");
        assert_eq!(message_list("1", "2", "3"), "mes:1:2:3");
        assert_eq!(role_list("venture", "1"), "rol:venture:1");
        assert_eq!(subject("8", "venture"), "sub:8:venture");
    }

    #[test]
    fn user_id_round_trips_through_the_element_key() {
        assert_eq!(user_id(&user("88")), Some("88"));
        assert_eq!(user_id("use:"), None);
        assert_eq!(user_id("cla:88"), None);
    }
}
