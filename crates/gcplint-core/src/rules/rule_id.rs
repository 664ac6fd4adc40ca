//! Type-safe rule identification
//!
//! Each variant is one (resource type, attribute) check. The snake_case
//! name of the variant is the rule name used in configuration files and
//! diagnostic codes.

use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

use super::validators::Validator;
use super::Severity;

/// Static description of what a rule checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSpec {
    pub resource_type: &'static str,
    pub attribute_name: &'static str,
    pub validator: Validator,
    /// Whether the rule has a documentation page
    pub documented: bool,
}

impl RuleSpec {
    const fn one_of(
        resource_type: &'static str,
        attribute_name: &'static str,
        allowed: &'static [&'static str],
    ) -> Self {
        Self {
            resource_type,
            attribute_name,
            validator: Validator::OneOf(allowed),
            documented: false,
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    AsRefStr,      // Provides as_ref() -> &str
    Display,       // Provides to_string()
    EnumString,    // Provides from_str()
    IntoStaticStr, // Provides into() -> &'static str
    EnumIter,      // Provides iter() over all variants
)]
#[strum(serialize_all = "snake_case")]
pub enum RuleId {
    GoogleProjectIamMemberInvalidMember,

    GoogleCloudIdentityGroupInvalidInitialGroupConfig,
    GoogleComputeInterconnectAttachmentInvalidType,
    GoogleComputeRegionBackendServiceInvalidProtocol,
}

impl RuleId {
    pub const fn spec(&self) -> RuleSpec {
        use RuleId::*;
        match self {
            GoogleProjectIamMemberInvalidMember => RuleSpec {
                resource_type: "google_project_iam_member",
                attribute_name: "member",
                validator: Validator::IamMember,
                documented: true,
            },
            GoogleCloudIdentityGroupInvalidInitialGroupConfig => RuleSpec::one_of(
                "google_cloud_identity_group",
                "initial_group_config",
                &["INITIAL_GROUP_CONFIG_UNSPECIFIED", "WITH_INITIAL_OWNER", "EMPTY", ""],
            ),
            GoogleComputeInterconnectAttachmentInvalidType => RuleSpec::one_of(
                "google_compute_interconnect_attachment",
                "type",
                &["DEDICATED", "PARTNER", "PARTNER_PROVIDER", ""],
            ),
            GoogleComputeRegionBackendServiceInvalidProtocol => RuleSpec::one_of(
                "google_compute_region_backend_service",
                "protocol",
                &["HTTP", "HTTPS", "HTTP2", "SSL", "TCP", "UDP", "GRPC", "UNSPECIFIED", ""],
            ),
        }
    }

    pub const fn enabled_by_default(&self) -> bool {
        true
    }

    pub const fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Get a human-readable description of what the rule validates
    pub fn description(&self) -> String {
        let spec = self.spec();
        match spec.validator {
            Validator::IamMember => format!(
                "Checks that `{}` of `{}` is a valid IAM member format",
                spec.attribute_name, spec.resource_type
            ),
            Validator::OneOf(_) => format!(
                "Checks that `{}` of `{}` is one of the accepted values",
                spec.attribute_name, spec.resource_type
            ),
        }
    }

    /// Reference documentation, when the rule has a page
    pub fn link(&self) -> Option<String> {
        if !self.spec().documented {
            return None;
        }
        Some(format!(
            "{}/blob/v{}/docs/rules/{}.md",
            env!("CARGO_PKG_REPOSITORY"),
            env!("CARGO_PKG_VERSION"),
            self.as_ref()
        ))
    }
}
