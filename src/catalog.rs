//! Purpose: Catalog lookups that turn API responses into flat, serializable records.
//! Exports: `person`, `people`, `team`, `teams`, `team_manifest`, `TeamSelector`, and the records.
//! Role: Shared by the CLI and embedders; generic over `CatalogApi` so tests run without HTTP.
//! Invariants: Single-result lookups fail with `NotFound` on zero matches and `Ambiguous` on many.
//! Invariants: Manifest vendors are mapped with `dynamic::from_value`; nothing else is schema-less.
#![allow(clippy::result_large_err)]

use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use tracing::debug;

use crate::api::{
    ApiResult, CatalogApi, FindPeopleRequest, FindTeamsRequest, NamedEntity, PersonWithTeams,
    Team, TeamMember, TeamWithMembers,
};
use crate::core::dynamic::{self, Node};
use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TeamSelector {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamRef {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PersonRecord {
    pub email: String,
    pub name: String,
    pub teams: Vec<TeamRef>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MemberRecord {
    pub email: String,
    pub name: String,
    pub team_lead: bool,
}

/// `members` is empty for list results, which do not carry membership.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamRecord {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: Option<String>,
    pub members: Vec<MemberRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ManifestRecord {
    pub team_id: String,
    pub team_name: String,
    pub reference: String,
    pub tech_lead: String,
    pub vendors: Node,
}

pub fn person<A>(api: &A, email: &str) -> ApiResult<PersonRecord>
where
    A: CatalogApi + ?Sized,
{
    let email = required(email, "person lookup requires an email", "Pass --email <address>.")?;
    let request = FindPeopleRequest {
        email: Some(email.to_string()),
        team_ids: Vec::new(),
    };
    let found = api.find_people(&request)?;
    debug!(email, matches = found.len(), "person lookup");
    let person = exactly_one(found, "person", email, "Use the full email address.")?;
    Ok(PersonRecord::from(person))
}

pub fn people<A>(api: &A, team_ids: &[String]) -> ApiResult<Vec<PersonRecord>>
where
    A: CatalogApi + ?Sized,
{
    let request = FindPeopleRequest {
        email: None,
        team_ids: team_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect(),
    };
    let found = api.find_people(&request)?;
    debug!(teams = request.team_ids.len(), matches = found.len(), "people lookup");
    Ok(found.into_iter().map(PersonRecord::from).collect())
}

pub fn team<A>(api: &A, selector: &TeamSelector) -> ApiResult<TeamRecord>
where
    A: CatalogApi + ?Sized,
{
    let name = selector.name.as_deref().map(str::trim).filter(|name| !name.is_empty());
    let id = selector.id.as_deref().map(str::trim).filter(|id| !id.is_empty());

    let team_id = match (name, id) {
        (Some(name), _) => {
            let request = FindTeamsRequest {
                name: Some(name.to_string()),
            };
            let found = api.find_teams(&request)?;
            debug!(name, matches = found.len(), "team name lookup");
            exactly_one(found, "team", name, "Use --id to select one team.")?.id
        }
        (None, Some(id)) => id.to_string(),
        (None, None) => {
            return Err(Error::new(ErrorKind::Usage)
                .with_message("team lookup requires an id or a name")
                .with_hint("Pass --id <team-id> or --name <team-name>."));
        }
    };

    let team = api.find_team_by_id(&team_id)?;
    Ok(TeamRecord::from(team))
}

pub fn teams<A>(api: &A, name: Option<&str>) -> ApiResult<Vec<TeamRecord>>
where
    A: CatalogApi + ?Sized,
{
    let request = FindTeamsRequest {
        name: name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string),
    };
    let found = api.find_teams(&request)?;
    debug!(matches = found.len(), "teams lookup");
    Ok(found.into_iter().map(TeamRecord::from).collect())
}

pub fn team_manifest<A>(api: &A, team_id: &str) -> ApiResult<ManifestRecord>
where
    A: CatalogApi + ?Sized,
{
    let team_id = required(
        team_id,
        "manifest lookup requires a team id",
        "Pass --team-id <team-id>.",
    )?;
    let manifest = api.find_team_manifest(team_id)?.ok_or_else(|| {
        Error::new(ErrorKind::NotFound)
            .with_message("team has no manifest")
            .with_subject(team_id)
    })?;
    let vendors = dynamic::from_value(&manifest.vendors).map_err(|err| {
        let detail = err.to_string();
        Error::from(err)
            .with_message(format!("failed to decode vendors for team {team_id}: {detail}"))
            .with_subject(team_id)
    })?;
    debug!(
        team_id,
        reference = %manifest.reference,
        vendors = vendors.len(),
        "manifest lookup"
    );
    Ok(ManifestRecord {
        team_id: manifest.team_id,
        team_name: manifest.team_name,
        reference: manifest.reference,
        tech_lead: manifest.tech_lead,
        vendors,
    })
}

fn required<'a>(value: &'a str, message: &str, hint: &str) -> ApiResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::new(ErrorKind::Usage)
            .with_message(message)
            .with_hint(hint));
    }
    Ok(trimmed)
}

fn exactly_one<T>(mut found: Vec<T>, what: &str, subject: &str, hint: &str) -> ApiResult<T> {
    match found.len() {
        0 => Err(Error::new(ErrorKind::NotFound)
            .with_message(format!("no {what} matches"))
            .with_subject(subject)),
        1 => Ok(found.remove(0)),
        count => Err(Error::new(ErrorKind::Ambiguous)
            .with_message(format!("{count} matches for {what}"))
            .with_subject(subject)
            .with_hint(hint)),
    }
}

fn format_created_at(created_at: Option<time::OffsetDateTime>) -> Option<String> {
    created_at.and_then(|at| at.format(&Rfc3339).ok())
}

impl From<NamedEntity> for TeamRef {
    fn from(entity: NamedEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
        }
    }
}

impl From<PersonWithTeams> for PersonRecord {
    fn from(person: PersonWithTeams) -> Self {
        Self {
            email: person.email,
            name: person.name,
            teams: person.teams.into_iter().map(TeamRef::from).collect(),
        }
    }
}

impl From<TeamMember> for MemberRecord {
    fn from(member: TeamMember) -> Self {
        Self {
            email: member.email,
            name: member.name,
            team_lead: member.team_lead,
        }
    }
}

impl From<Team> for TeamRecord {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            slug: team.slug,
            created_at: format_created_at(team.created_at),
            members: Vec::new(),
        }
    }
}

impl From<TeamWithMembers> for TeamRecord {
    fn from(team: TeamWithMembers) -> Self {
        Self {
            id: team.id,
            name: team.name,
            slug: team.slug,
            created_at: format_created_at(team.created_at),
            members: team.members.into_iter().map(MemberRecord::from).collect(),
        }
    }
}
