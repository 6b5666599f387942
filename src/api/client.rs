//! Purpose: Blocking HTTP client for the Span catalog endpoints.
//! Exports: `CatalogApi`, `CatalogClient`, `ApiResult`.
//! Role: Transport seam; lookups depend on the `CatalogApi` trait, not on ureq.
//! Invariants: Every request carries `Authorization: Bearer <token>` and `Accept: application/json`.
//! Invariants: Success bodies use the `{"data": ...}` envelope; non-2xx maps to an `ErrorKind`.
//! Invariants: Response bodies go through the crate parse boundary (document order, exact numbers).
#![allow(clippy::result_large_err)]

use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use super::config::ClientConfig;
use super::model::{
    FindPeopleRequest, FindTeamsRequest, ManifestEntry, PersonWithTeams, Team, TeamManifest,
    TeamWithMembers,
};
use crate::core::error::{Error, ErrorKind};
use crate::json::parse;

pub type ApiResult<T> = Result<T, Error>;

/// Catalog operations used by lookups; implemented over HTTP by `CatalogClient`.
pub trait CatalogApi {
    fn find_people(&self, request: &FindPeopleRequest) -> ApiResult<Vec<PersonWithTeams>>;
    fn find_teams(&self, request: &FindTeamsRequest) -> ApiResult<Vec<Team>>;
    fn find_team_by_id(&self, team_id: &str) -> ApiResult<TeamWithMembers>;
    /// `Ok(None)` when the team exists but has no manifest entry.
    fn find_team_manifest(&self, team_id: &str) -> ApiResult<Option<TeamManifest>>;
}

#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    config: ClientConfig,
    agent: ureq::Agent,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

impl CatalogClient {
    pub fn new(config: ClientConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout())
            .user_agent(concat!("spancat/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            inner: Arc::new(CatalogClientInner { config, agent }),
        }
    }

    pub fn endpoint(&self) -> &Url {
        self.inner.config.endpoint()
    }

    fn get_data<R>(&self, url: &Url) -> ApiResult<R>
    where
        R: DeserializeOwned,
    {
        debug!(method = "GET", url = %url, "catalog request");
        let response = self
            .inner
            .agent
            .request("GET", url.as_str())
            .set("Accept", "application/json")
            .set(
                "Authorization",
                &format!("Bearer {}", self.inner.config.token()),
            )
            .call();

        match response {
            Ok(resp) => {
                debug!(status = resp.status(), url = %url, "catalog response");
                let envelope: DataEnvelope<R> = read_json_response(resp)?;
                Ok(envelope.data)
            }
            Err(ureq::Error::Status(code, resp)) => {
                debug!(status = code, url = %url, "catalog error response");
                Err(parse_error_response(code, resp).with_subject(url.path()))
            }
            Err(ureq::Error::Transport(err)) => Err(Error::new(ErrorKind::Io)
                .with_message("catalog request failed")
                .with_subject(url.as_str())
                .with_hint("Check network access and --endpoint (or SPAN_API_ENDPOINT).")
                .with_source(err)),
        }
    }
}

impl CatalogApi for CatalogClient {
    fn find_people(&self, request: &FindPeopleRequest) -> ApiResult<Vec<PersonWithTeams>> {
        let mut url = build_url(self.endpoint(), &["catalog", "people"])?;
        let mut query = Vec::new();
        if let Some(email) = &request.email {
            query.push(("email", email.as_str()));
        }
        for team_id in &request.team_ids {
            query.push(("teamIds", team_id.as_str()));
        }
        append_query(&mut url, &query);
        self.get_data(&url)
    }

    fn find_teams(&self, request: &FindTeamsRequest) -> ApiResult<Vec<Team>> {
        let mut url = build_url(self.endpoint(), &["catalog", "teams"])?;
        if let Some(name) = &request.name {
            append_query(&mut url, &[("name", name.as_str())]);
        }
        self.get_data(&url)
    }

    fn find_team_by_id(&self, team_id: &str) -> ApiResult<TeamWithMembers> {
        let url = build_url(self.endpoint(), &["catalog", "teams", team_id])?;
        self.get_data(&url)
    }

    fn find_team_manifest(&self, team_id: &str) -> ApiResult<Option<TeamManifest>> {
        let url = build_url(self.endpoint(), &["catalog", "teams", team_id, "manifest"])?;
        let data: Option<Map<String, Value>> = self.get_data(&url)?;
        first_manifest(team_id, data)
    }
}

/// Appends path segments to the endpoint path, percent-encoding each one.
fn build_url(base: &Url, segments: &[&str]) -> ApiResult<Url> {
    let mut url = base.clone();
    {
        let mut path = url.path_segments_mut().map_err(|_| {
            Error::new(ErrorKind::Usage).with_message("catalog endpoint cannot be a base")
        })?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}

fn append_query(url: &mut Url, pairs: &[(&str, &str)]) {
    if pairs.is_empty() {
        return;
    }
    let mut query = url.query_pairs_mut();
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
}

fn first_manifest(
    team_id: &str,
    data: Option<Map<String, Value>>,
) -> ApiResult<Option<TeamManifest>> {
    let Some(entries) = data else {
        return Ok(None);
    };
    if entries.len() > 1 {
        warn!(
            team_id,
            entries = entries.len(),
            "manifest response has several entries; using the first"
        );
    }
    let Some((reference, value)) = entries.into_iter().next() else {
        return Ok(None);
    };
    let entry: ManifestEntry = serde_json::from_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid manifest entry in response")
            .with_subject(reference.clone())
            .with_source(err)
    })?;
    Ok(Some(entry.into_manifest(team_id, reference)))
}

fn read_json_response<R>(response: ureq::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let body = response.into_string().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read response body")
            .with_source(err)
    })?;
    parse::from_slice(body.as_bytes()).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("invalid response json")
            .with_hint(parse::hint_for_error(&err, "catalog response"))
            .with_source(err)
    })
}

fn parse_error_response(status: u16, response: ureq::Response) -> Error {
    let body = response.into_string().unwrap_or_default();
    let detail = parse::from_slice::<Value>(body.as_bytes())
        .ok()
        .and_then(|value| error_detail(&value));
    let kind = error_kind_from_status(status);
    let message = match detail {
        Some(detail) => format!("catalog error status {status}: {detail}"),
        None => format!("catalog error status {status}"),
    };
    let mut err = Error::new(kind).with_message(message).with_status(status);
    if kind == ErrorKind::Permission {
        err = err.with_hint("Check the access token (--token or SPAN_ACCESS_TOKEN).");
    }
    err
}

fn error_detail(body: &Value) -> Option<String> {
    let candidate = body
        .get("message")
        .or_else(|| body.get("error").and_then(|error| error.get("message")))
        .or_else(|| body.get("error"))?;
    candidate.as_str().map(str::to_string)
}

fn error_kind_from_status(status: u16) -> ErrorKind {
    match status {
        400 | 422 => ErrorKind::Usage,
        401 | 403 => ErrorKind::Permission,
        404 => ErrorKind::NotFound,
        500..=599 => ErrorKind::Internal,
        _ => ErrorKind::Io,
    }
}
