//! IAM principal ("member") format
//!
//! Accepted forms:
//!
//! - `allUsers`, `allAuthenticatedUsers`
//! - `user:`, `serviceAccount:`, `group:`, `domain:`, `computed:`,
//!   `projectOwner:`, `projectEditor:`, `projectViewer:` followed by a
//!   non-empty identifier
//! - `deleted:user:`, `deleted:serviceAccount:`, `deleted:group:` followed by
//!   `<email>?uid=<uid>` with both parts non-empty
//!
//! Only the shape is checked. Identities are never looked up.

const SPECIAL_MEMBERS: &[&str] = &["allUsers", "allAuthenticatedUsers"];

const PREFIXED_MEMBERS: &[&str] = &[
    "user:",
    "serviceAccount:",
    "group:",
    "domain:",
    "computed:",
    "projectOwner:",
    "projectEditor:",
    "projectViewer:",
];

const DELETED_MEMBERS: &[&str] = &["deleted:user:", "deleted:serviceAccount:", "deleted:group:"];

pub fn is_valid_iam_member_format(member: &str) -> bool {
    if SPECIAL_MEMBERS.contains(&member) {
        return true;
    }

    for prefix in DELETED_MEMBERS {
        if let Some(rest) = member.strip_prefix(prefix) {
            return is_deleted_member_suffix(rest);
        }
    }

    PREFIXED_MEMBERS.iter().any(|prefix| {
        member.strip_prefix(prefix).map_or(false, |identifier| !identifier.is_empty())
    })
}

/// `<email>?uid=<uid>`
fn is_deleted_member_suffix(rest: &str) -> bool {
    let Some((email, query)) = rest.split_once('?') else {
        return false;
    };
    let Some(uid) = query.strip_prefix("uid=") else {
        return false;
    };
    !email.is_empty() && !uid.is_empty()
}
