//! Purpose: Public boundary for talking to the Span catalog API.
//! Exports: Client configuration, the `CatalogApi` seam, the ureq-backed client, and wire models.
//! Role: Everything network-facing lives here; lookups and the CLI only see these types.
//! Invariants: Errors crossing this boundary are `core::error::Error` with a mapped `ErrorKind`.

mod client;
mod config;
mod model;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use client::{ApiResult, CatalogApi, CatalogClient};
pub use config::{
    ClientConfig, ConfigOverrides, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT, ENDPOINT_ENV, TOKEN_ENV,
    TOKEN_LEN,
};
pub use model::{
    FindPeopleRequest, FindTeamsRequest, NamedEntity, PersonWithTeams, Team, TeamManifest,
    TeamMember, TeamWithMembers,
};
