//! Value validators shared by every rule

use super::iam_member::is_valid_iam_member_format;

/// The check a rule runs against an evaluated attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validator {
    /// Value must equal one of the listed tokens, case-sensitively.
    OneOf(&'static [&'static str]),
    /// Value must be an IAM principal reference.
    IamMember,
}

impl Validator {
    /// Violation messages for `value`; empty when the value is accepted.
    pub fn validate(&self, value: &str, attribute_name: &str) -> Vec<String> {
        match self {
            Validator::OneOf(allowed) => string_in_slice(allowed, value, attribute_name)
                .into_iter()
                .collect(),
            Validator::IamMember => {
                if is_valid_iam_member_format(value) {
                    vec![]
                } else {
                    vec![format!("{} is an invalid member format", value)]
                }
            }
        }
    }
}

/// Membership check with the empty string always accepted.
///
/// The empty string stands for an omitted attribute that falls back to the
/// provider default.
pub fn string_in_slice(allowed: &[&str], value: &str, attribute_name: &str) -> Option<String> {
    if value.is_empty() || allowed.contains(&value) {
        return None;
    }

    let quoted: Vec<String> = allowed.iter().map(|token| format!("{:?}", token)).collect();
    Some(format!(
        "expected {} to be one of [{}], got {}",
        attribute_name,
        quoted.join(" "),
        value
    ))
}
