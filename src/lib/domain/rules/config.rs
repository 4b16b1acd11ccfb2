//! The persisted rule action configuration.

use std::collections::HashMap;

use crate::domain::{
    batch::SenderIdentity,
    communication::email_addresses::{parse_address_list, EmailAddress},
    contacts::{LocationTypeId, RelationshipDirection, RelationshipTypeId},
    rules::errors::ConfigError,
    templates::TemplateId,
};

/// The configuration map format version this build reads and writes.
const CONFIG_VERSION: &str = "1";

/// A validated rule action configuration.
///
/// Stored as a versioned key/value map so older persisted configurations can
/// be migrated rather than silently reinterpreted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleActionConfig {
    /// The from header for messages sent by this action
    pub from: SenderIdentity,

    /// The relationship type linking trigger contact and recipients
    pub relationship_type_id: RelationshipTypeId,

    /// Which side of the relationship the recipients sit on
    pub direction: RelationshipDirection,

    /// The template to send
    pub template_id: TemplateId,

    /// Use this location type's email instead of the recipients' primary ones
    pub location_type_id: Option<LocationTypeId>,

    /// Carbon-copy addresses
    pub cc: Vec<EmailAddress>,

    /// Blind carbon-copy addresses
    pub bcc: Vec<EmailAddress>,

    /// File the audit activity on the triggering case, when one is supplied
    pub file_on_case: bool,
}

impl RuleActionConfig {
    /// Validate a stored configuration map.
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        // Maps written before versioning are read as version 1.
        let version = map.get("version").map_or(CONFIG_VERSION, String::as_str);
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version.to_string()));
        }

        let from = SenderIdentity {
            name: require(map, "from_name")?.to_string(),
            email: EmailAddress::new(require(map, "from_email")?).map_err(|_| {
                ConfigError::MalformedField {
                    field: "from_email",
                    value: map["from_email"].clone(),
                }
            })?,
        };

        let relationship_option = require(map, "relationship_option")?;
        let direction = RelationshipDirection::from_option(relationship_option).ok_or_else(|| {
            ConfigError::MalformedField {
                field: "relationship_option",
                value: relationship_option.to_string(),
            }
        })?;

        Ok(Self {
            from,
            relationship_type_id: parse_id(map, "relationship_type_id")?,
            direction,
            template_id: parse_id(map, "template_id")?,
            location_type_id: map
                .get("location_type_id")
                .map(|value| parse_field("location_type_id", value))
                .transpose()?,
            cc: parse_addresses(map, "cc")?,
            bcc: parse_addresses(map, "bcc")?,
            file_on_case: map.get("file_on_case").is_some_and(|value| value == "1"),
        })
    }

    /// Serialise back to the stored map form.
    pub fn to_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::from([
            ("version".to_string(), CONFIG_VERSION.to_string()),
            ("from_name".to_string(), self.from.name.clone()),
            ("from_email".to_string(), self.from.email.to_string()),
            (
                "relationship_type_id".to_string(),
                self.relationship_type_id.to_string(),
            ),
            (
                "relationship_option".to_string(),
                self.direction.as_option().to_string(),
            ),
            ("template_id".to_string(), self.template_id.to_string()),
            (
                "file_on_case".to_string(),
                if self.file_on_case { "1" } else { "0" }.to_string(),
            ),
        ]);

        if let Some(location_type_id) = self.location_type_id {
            map.insert("location_type_id".to_string(), location_type_id.to_string());
        }

        if !self.cc.is_empty() {
            map.insert("cc".to_string(), join_addresses(&self.cc));
        }

        if !self.bcc.is_empty() {
            map.insert("bcc".to_string(), join_addresses(&self.bcc));
        }

        map
    }
}

fn require<'a>(map: &'a HashMap<String, String>, field: &'static str) -> Result<&'a str, ConfigError> {
    map.get(field)
        .map(String::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingField(field))
}

fn parse_id(map: &HashMap<String, String>, field: &'static str) -> Result<i64, ConfigError> {
    parse_field(field, require(map, field)?)
}

fn parse_field(field: &'static str, value: &str) -> Result<i64, ConfigError> {
    value.parse().map_err(|_| ConfigError::MalformedField {
        field,
        value: value.to_string(),
    })
}

fn parse_addresses(
    map: &HashMap<String, String>,
    field: &'static str,
) -> Result<Vec<EmailAddress>, ConfigError> {
    match map.get(field) {
        Some(value) => parse_address_list(value).map_err(|_| ConfigError::MalformedField {
            field,
            value: value.clone(),
        }),
        None => Ok(Vec::new()),
    }
}

fn join_addresses(addresses: &[EmailAddress]) -> String {
    addresses
        .iter()
        .map(EmailAddress::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn full_map() -> HashMap<String, String> {
        HashMap::from([
            ("version".to_string(), "1".to_string()),
            ("from_name".to_string(), "Support Desk".to_string()),
            ("from_email".to_string(), "support@example.org".to_string()),
            ("relationship_type_id".to_string(), "8".to_string()),
            ("relationship_option".to_string(), "a_b".to_string()),
            ("template_id".to_string(), "42".to_string()),
            ("location_type_id".to_string(), "3".to_string()),
            (
                "cc".to_string(),
                "one@example.org, two@example.org".to_string(),
            ),
            ("file_on_case".to_string(), "1".to_string()),
        ])
    }

    #[test]
    fn test_full_map_round_trips() -> TestResult {
        let config = RuleActionConfig::from_map(&full_map())?;

        assert_eq!(config.from.name, "Support Desk");
        assert_eq!(config.relationship_type_id, 8);
        assert_eq!(config.direction, RelationshipDirection::AToB);
        assert_eq!(config.template_id, 42);
        assert_eq!(config.location_type_id, Some(3));
        assert_eq!(config.cc.len(), 2);
        assert!(config.bcc.is_empty());
        assert!(config.file_on_case);

        assert_eq!(RuleActionConfig::from_map(&config.to_map())?, config);

        Ok(())
    }

    #[test]
    fn test_unversioned_map_is_read_as_version_one() -> TestResult {
        let mut map = full_map();
        map.remove("version");

        RuleActionConfig::from_map(&map)?;

        Ok(())
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let mut map = full_map();
        map.insert("version".to_string(), "7".to_string());

        assert_eq!(
            RuleActionConfig::from_map(&map),
            Err(ConfigError::UnsupportedVersion("7".to_string()))
        );
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let mut map = full_map();
        map.remove("template_id");

        assert_eq!(
            RuleActionConfig::from_map(&map),
            Err(ConfigError::MissingField("template_id"))
        );
    }

    #[test]
    fn test_malformed_relationship_option_is_rejected() {
        let mut map = full_map();
        map.insert("relationship_option".to_string(), "sideways".to_string());

        assert_eq!(
            RuleActionConfig::from_map(&map),
            Err(ConfigError::MalformedField {
                field: "relationship_option",
                value: "sideways".to_string(),
            })
        );
    }

    #[test]
    fn test_malformed_cc_address_is_rejected() {
        let mut map = full_map();
        map.insert("cc".to_string(), "not-an-address".to_string());

        assert!(matches!(
            RuleActionConfig::from_map(&map),
            Err(ConfigError::MalformedField { field: "cc", .. })
        ));
    }
}
