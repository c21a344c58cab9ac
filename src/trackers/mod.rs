use std::{fmt, str::FromStr};

use log::debug;
use miette::Diagnostic;
use reqwest::{header::ACCEPT, Client, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    app_config::{self, Credentials},
    tickets::{Project, Ticket},
};

mod backlog;
mod jira;
mod redmine;

/// The kinds of issue tracker that can be reported on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tracker {
    Jira,
    Redmine,
    Backlog,
}

impl Tracker {
    /// Every tracker, in the order they are fetched and reported.
    pub const ALL: [Tracker; 3] = [Tracker::Jira, Tracker::Redmine, Tracker::Backlog];

    pub fn name(self) -> &'static str {
        match self {
            Tracker::Jira => "jira",
            Tracker::Redmine => "redmine",
            Tracker::Backlog => "backlog",
        }
    }

    pub(crate) async fn fetch_projects(
        self,
        client: &Client,
        credentials: &Credentials,
    ) -> Result<Vec<Project>, Error> {
        match self {
            Tracker::Jira => jira::fetch_projects(client, credentials).await,
            Tracker::Redmine => redmine::fetch_projects(client, credentials).await,
            Tracker::Backlog => backlog::fetch_projects(client, credentials).await,
        }
    }

    pub(crate) async fn fetch_tickets(
        self,
        client: &Client,
        credentials: &Credentials,
        project: &Project,
    ) -> Result<Vec<Ticket>, Error> {
        match self {
            Tracker::Jira => jira::fetch_tickets(client, credentials, &project.key).await,
            Tracker::Redmine => redmine::fetch_tickets(client, credentials, &project.key).await,
            Tracker::Backlog => backlog::fetch_tickets(client, credentials, project.id).await,
        }
    }

    /// Check that `credentials` are accepted by asking the tracker who they belong to.
    pub(crate) async fn verify(
        self,
        client: &Client,
        credentials: &Credentials,
    ) -> Result<(), Error> {
        match self {
            Tracker::Jira => jira::verify(client, credentials).await,
            Tracker::Redmine => redmine::verify(client, credentials).await,
            Tracker::Backlog => backlog::verify(client, credentials).await,
        }
    }

    pub(crate) fn needs_email(self) -> bool {
        matches!(self, Tracker::Jira)
    }

    pub(crate) fn base_url_prompt(self) -> &'static str {
        match self {
            Tracker::Jira => "Enter Jira URL (e.g. your-company.atlassian.net):",
            Tracker::Redmine => "Enter Redmine URL (e.g. your-company.planio.jp):",
            Tracker::Backlog => "Enter Backlog URL (e.g. your-company.backlog.com):",
        }
    }

    pub(crate) fn token_prompt(self) -> &'static str {
        match self {
            Tracker::Jira => "Enter your API token (see https://id.atlassian.com/manage-profile/security/api-tokens):",
            Tracker::Redmine => "Enter your API key (see the \"My account\" page of your Redmine):",
            Tracker::Backlog => "Enter your API key (see Personal Settings > API in Backlog):",
        }
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Tracker {
    type Err = UnknownTracker;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tracker::ALL
            .into_iter()
            .find(|tracker| tracker.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownTracker(s.to_string()))
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("Unknown tracker {0}, expected one of jira, redmine, backlog")]
#[diagnostic(code(trackers::unknown))]
pub struct UnknownTracker(String);

/// Turn a stored base URL into something requests can be made against. Bare hosts get `https://`.
pub(crate) fn resolve_base_url(base_url: &str) -> String {
    let base_url = base_url.trim().trim_end_matches('/');
    if base_url.starts_with("http://") || base_url.starts_with("https://") {
        base_url.to_string()
    } else {
        format!("https://{base_url}")
    }
}

/// Send `request` and decode the JSON body. Anything but a `200 OK` is an error.
///
/// `path` is what shows up in errors. It must never contain credentials, which is also why
/// the URL is stripped from transport errors.
async fn get_json<T: DeserializeOwned>(request: RequestBuilder, path: &str) -> Result<T, Error> {
    debug!("GET {path}");
    let response = request
        .header(ACCEPT, "application/json")
        .send()
        .await
        .map_err(|source| Error::Request {
            path: path.to_string(),
            source: source.without_url(),
        })?;
    let status = response.status();
    if status != StatusCode::OK {
        return Err(Error::Status {
            path: path.to_string(),
            status,
        });
    }
    response.json::<T>().await.map_err(|source| Error::Body {
        path: path.to_string(),
        source: source.without_url(),
    })
}

/// The `{"name": ...}` objects trackers use for statuses, issue types and the like.
#[derive(Debug, Deserialize)]
struct Named {
    name: String,
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("Failed to receive a response from {path}: {source}")]
    #[diagnostic(
        code(trackers::request),
        help("Check the base URL of this configuration and your network connection.")
    )]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to receive a response body from {path}, status: {status}")]
    #[diagnostic(
        code(trackers::status),
        help("A 401 or 403 usually means the API token is wrong or has expired.")
    )]
    Status { path: String, status: StatusCode },
    #[error("Could not decode the response from {path}: {source}")]
    #[diagnostic(code(trackers::body))]
    Body {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("No email address is configured")]
    #[diagnostic(
        code(trackers::missing_email),
        help("Jira authenticates with an email address and API token, run `ticket-report configure` again.")
    )]
    MissingEmail,
    #[error(transparent)]
    #[diagnostic(transparent)]
    Credentials(#[from] app_config::Error),
}
