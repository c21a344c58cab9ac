use std::sync::OnceLock;

use base64::{prelude::BASE64_STANDARD as base64, Engine};
use regex::Regex;
use reqwest::{header::AUTHORIZATION, Client, RequestBuilder};
use serde::Deserialize;

use super::{get_json, resolve_base_url, Error, Named};
use crate::{
    app_config::Credentials,
    tickets::{Project, Ticket},
};

const PROJECTS_PATH: &str = "rest/api/latest/project";
const SEARCH_PATH: &str = "rest/api/latest/search";
const MYSELF_PATH: &str = "rest/api/latest/myself";
const MAX_RESULTS: &str = "500";

pub(super) async fn fetch_projects(
    client: &Client,
    credentials: &Credentials,
) -> Result<Vec<Project>, Error> {
    let projects: Vec<JiraProject> =
        get_json(request(client, credentials, PROJECTS_PATH)?, PROJECTS_PATH).await?;
    Ok(projects.into_iter().map(Project::from).collect())
}

pub(super) async fn fetch_tickets(
    client: &Client,
    credentials: &Credentials,
    project_key: &str,
) -> Result<Vec<Ticket>, Error> {
    let jql = format!("project = {project_key} AND issuetype != Epic");
    let request = request(client, credentials, SEARCH_PATH)?.query(&[
        ("jql", jql.as_str()),
        ("maxResults", MAX_RESULTS),
        ("fields", "summary,issuetype,status"),
    ]);
    let response: SearchResponse = get_json(request, SEARCH_PATH).await?;
    Ok(response.issues.into_iter().map(Ticket::from).collect())
}

pub(super) async fn verify(client: &Client, credentials: &Credentials) -> Result<(), Error> {
    get_json::<serde_json::Value>(request(client, credentials, MYSELF_PATH)?, MYSELF_PATH)
        .await
        .map(|_| ())
}

fn request(
    client: &Client,
    credentials: &Credentials,
    path: &str,
) -> Result<RequestBuilder, Error> {
    let email = credentials.email.as_deref().ok_or(Error::MissingEmail)?;
    let token = &credentials.token;
    let auth = format!("Basic {}", base64.encode(format!("{email}:{token}")));
    let url = format!("{}/{path}", resolve_base_url(&credentials.base_url));
    Ok(client.get(url).header(AUTHORIZATION, auth))
}

/// Jira hands out REST links for projects, the browsable page lives at `/projects/<key>`.
fn browse_url(self_link: &str) -> String {
    static REST_PROJECT: OnceLock<Regex> = OnceLock::new();
    #[allow(clippy::unwrap_used)] // The pattern is a literal and known to be valid
    let pattern =
        REST_PROJECT.get_or_init(|| Regex::new(r"/rest/api/(latest|\d+)/project/").unwrap());
    pattern.replace(self_link, "/projects/").into_owned()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraProject {
    key: String,
    name: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    project_type_key: String,
    #[serde(rename = "self")]
    self_link: String,
}

impl From<JiraProject> for Project {
    fn from(project: JiraProject) -> Self {
        Self {
            url: browse_url(&project.self_link),
            id: project.id.parse().unwrap_or_default(),
            project_type: project.project_type_key,
            ..Project::new(project.key, project.name)
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    issues: Vec<JiraIssue>,
}

#[derive(Debug, Deserialize)]
struct JiraIssue {
    key: String,
    fields: IssueFields,
}

#[derive(Debug, Deserialize)]
struct IssueFields {
    summary: String,
    issuetype: Named,
    status: Named,
}

impl From<JiraIssue> for Ticket {
    fn from(issue: JiraIssue) -> Self {
        Self {
            key: issue.key,
            summary: issue.fields.summary,
            issue_type: issue.fields.issuetype.name,
            status: issue.fields.status.name,
            due_date: None,
            estimated_hours: None,
        }
    }
}

#[cfg(test)]
mod test_jira {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(
        "https://example.atlassian.net/rest/api/latest/project/10000",
        "https://example.atlassian.net/projects/10000"
    )]
    #[case(
        "https://example.atlassian.net/rest/api/2/project/10000",
        "https://example.atlassian.net/projects/10000"
    )]
    #[case(
        "https://example.atlassian.net/rest/api/beta/project/10000",
        "https://example.atlassian.net/rest/api/beta/project/10000"
    )]
    fn browse_urls(#[case] self_link: &str, #[case] expected: &str) {
        assert_eq!(browse_url(self_link), expected);
    }

    #[test]
    fn projects() {
        let body = r#"[
            {
                "self": "https://example.atlassian.net/rest/api/2/project/10000",
                "id": "10000",
                "key": "EX",
                "name": "Example",
                "projectTypeKey": "software"
            },
            {
                "self": "https://example.atlassian.net/rest/api/2/project/10001",
                "id": "10001",
                "key": "OPS",
                "name": "Operations"
            }
        ]"#;

        let projects: Vec<Project> = serde_json::from_str::<Vec<JiraProject>>(body)
            .unwrap()
            .into_iter()
            .map(Project::from)
            .collect();

        assert_eq!(
            projects,
            vec![
                Project {
                    key: "EX".to_string(),
                    name: "Example".to_string(),
                    project_type: "software".to_string(),
                    url: "https://example.atlassian.net/projects/10000".to_string(),
                    id: 10000,
                    tickets: Vec::new(),
                },
                Project {
                    key: "OPS".to_string(),
                    name: "Operations".to_string(),
                    project_type: String::new(),
                    url: "https://example.atlassian.net/projects/10001".to_string(),
                    id: 10001,
                    tickets: Vec::new(),
                },
            ]
        );
    }

    #[test]
    fn tickets() {
        let body = r#"{
            "startAt": 0,
            "maxResults": 500,
            "total": 1,
            "issues": [
                {
                    "id": "10042",
                    "key": "EX-1",
                    "fields": {
                        "summary": "Fix the login page",
                        "issuetype": {"id": "10001", "name": "Bug"},
                        "status": {"id": "3", "name": "In Progress"}
                    }
                }
            ]
        }"#;

        let tickets: Vec<Ticket> = serde_json::from_str::<SearchResponse>(body)
            .unwrap()
            .issues
            .into_iter()
            .map(Ticket::from)
            .collect();

        assert_eq!(
            tickets,
            vec![Ticket {
                key: "EX-1".to_string(),
                summary: "Fix the login page".to_string(),
                issue_type: "Bug".to_string(),
                status: "In Progress".to_string(),
                due_date: None,
                estimated_hours: None,
            }]
        );
    }

    #[test]
    fn missing_email() {
        let credentials = Credentials {
            base_url: "example.atlassian.net".to_string(),
            email: None,
            token: "token".to_string(),
        };

        let result = request(&Client::new(), &credentials, PROJECTS_PATH);

        assert!(matches!(result, Err(Error::MissingEmail)));
    }
}
