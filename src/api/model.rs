//! Purpose: Typed catalog entities exchanged with the Span external API.
//! Exports: request types plus `NamedEntity`, `PersonWithTeams`, `TeamMember`, `Team`,
//! `TeamWithMembers`, `TeamManifest`.
//! Role: Fixed-shape records; only manifest vendor content stays schema-less.
//! Invariants: Wire names are camelCase on input; serialized output uses snake_case field names.
//! Invariants: Absent optional fields default instead of failing the whole response.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindPeopleRequest {
    pub email: Option<String>,
    pub team_ids: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FindTeamsRequest {
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct NamedEntity {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PersonWithTeams {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teams: Vec<NamedEntity>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamMember {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename(deserialize = "teamLead"), default)]
    pub team_lead: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Team {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename(deserialize = "createdAt"), default, with = "rfc3339_opt")]
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TeamWithMembers {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(rename(deserialize = "createdAt"), default, with = "rfc3339_opt")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

impl TeamWithMembers {
    pub fn leads(&self) -> impl Iterator<Item = &TeamMember> {
        self.members.iter().filter(|member| member.team_lead)
    }
}

/// A team's manifest; `vendors` is the undecoded vendor section.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamManifest {
    pub team_id: String,
    pub team_name: String,
    pub reference: String,
    pub tech_lead: String,
    pub vendors: Value,
}

/// Manifest entry as it appears under its external reference key.
#[derive(Deserialize)]
pub(crate) struct ManifestEntry {
    #[serde(default)]
    pub(crate) pretty_name: String,
    #[serde(default)]
    pub(crate) tech_lead: String,
    #[serde(default)]
    pub(crate) vendors: Value,
}

impl ManifestEntry {
    pub(crate) fn into_manifest(self, team_id: &str, reference: String) -> TeamManifest {
        TeamManifest {
            team_id: team_id.to_string(),
            team_name: self.pretty_name,
            reference,
            tech_lead: self.tech_lead,
            vendors: self.vendors,
        }
    }
}

mod rfc3339_opt {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::OffsetDateTime;
    use time::format_description::well_known::Rfc3339;

    pub(super) fn serialize<S>(
        value: &Option<OffsetDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(timestamp) => {
                let text = timestamp.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&text)
            }
            None => serializer.serialize_none(),
        }
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => OffsetDateTime::parse(text, &Rfc3339)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ManifestEntry, PersonWithTeams, TeamWithMembers};
    use serde_json::{Value, json};

    #[test]
    fn team_reads_camel_case_and_writes_snake_case() {
        let team: TeamWithMembers = serde_json::from_value(json!({
            "id": "t1",
            "name": "Payments",
            "slug": "payments",
            "createdAt": "2024-03-01T12:00:00Z",
            "members": [
                {"email": "a@x.io", "name": "A", "teamLead": true},
                {"email": "b@x.io", "name": "B"}
            ]
        }))
        .expect("team");
        assert_eq!(team.created_at.map(|at| at.year()), Some(2024));
        assert_eq!(team.leads().count(), 1);

        let out = serde_json::to_value(&team).expect("serialize");
        assert_eq!(out["created_at"], json!("2024-03-01T12:00:00Z"));
        assert_eq!(out["members"][0]["team_lead"], json!(true));
    }

    #[test]
    fn missing_optional_fields_default() {
        let person: PersonWithTeams =
            serde_json::from_value(json!({"email": "c@x.io"})).expect("person");
        assert!(person.name.is_empty());
        assert!(person.teams.is_empty());

        let team: TeamWithMembers =
            serde_json::from_value(json!({"id": "t2", "createdAt": null})).expect("team");
        assert!(team.created_at.is_none());
    }

    #[test]
    fn malformed_timestamp_is_rejected() {
        let err = serde_json::from_value::<TeamWithMembers>(json!({
            "id": "t3",
            "createdAt": "yesterday"
        }))
        .expect_err("bad timestamp");
        assert!(err.is_data());
    }

    #[test]
    fn manifest_entry_defaults_vendors_to_null() {
        let entry: ManifestEntry =
            serde_json::from_value(json!({"pretty_name": "Core"})).expect("entry");
        let manifest = entry.into_manifest("t9", "core-ref".to_string());
        assert_eq!(manifest.team_id, "t9");
        assert_eq!(manifest.team_name, "Core");
        assert_eq!(manifest.reference, "core-ref");
        assert_eq!(manifest.vendors, Value::Null);
    }
}
