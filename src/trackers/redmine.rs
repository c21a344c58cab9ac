use log::info;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{get_json, resolve_base_url, Error, Named};
use crate::{
    app_config::Credentials,
    tickets::{Project, Ticket},
};

const PROJECTS_PATH: &str = "projects.json";
const ISSUES_PATH: &str = "issues.json";
const CURRENT_USER_PATH: &str = "users/current.json";
const LIMIT: &str = "100";

pub(super) async fn fetch_projects(
    client: &Client,
    credentials: &Credentials,
) -> Result<Vec<Project>, Error> {
    let response: ProjectsResponse =
        get_json(request(client, credentials, PROJECTS_PATH), PROJECTS_PATH).await?;
    Ok(response.into_projects(&resolve_base_url(&credentials.base_url)))
}

pub(super) async fn fetch_tickets(
    client: &Client,
    credentials: &Credentials,
    project_identifier: &str,
) -> Result<Vec<Ticket>, Error> {
    let request = request(client, credentials, ISSUES_PATH).query(&[
        ("offset", "0"),
        ("limit", LIMIT),
        ("project_id", project_identifier),
    ]);
    let response: IssuesResponse = get_json(request, ISSUES_PATH).await?;
    Ok(response.issues.into_iter().map(Ticket::from).collect())
}

pub(super) async fn verify(client: &Client, credentials: &Credentials) -> Result<(), Error> {
    get_json::<serde_json::Value>(
        request(client, credentials, CURRENT_USER_PATH),
        CURRENT_USER_PATH,
    )
    .await
    .map(|_| ())
}

fn request(client: &Client, credentials: &Credentials, path: &str) -> RequestBuilder {
    let url = format!("{}/{path}", resolve_base_url(&credentials.base_url));
    client
        .get(url)
        .header("X-Redmine-API-Key", &credentials.token)
}

#[derive(Debug, Deserialize)]
struct ProjectsResponse {
    #[serde(default)]
    projects: Vec<RedmineProject>,
    #[serde(default)]
    total_count: u64,
}

impl ProjectsResponse {
    fn into_projects(self, base_url: &str) -> Vec<Project> {
        if self.total_count == 0 {
            info!("No projects found.");
            return Vec::new();
        }
        self.projects
            .into_iter()
            .map(|project| Project {
                url: format!("{base_url}/projects/{}", project.identifier),
                id: project.id,
                ..Project::new(project.identifier, project.name)
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
struct RedmineProject {
    id: u64,
    identifier: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct IssuesResponse {
    #[serde(default)]
    issues: Vec<RedmineIssue>,
}

#[derive(Debug, Deserialize)]
struct RedmineIssue {
    id: u64,
    subject: String,
    tracker: Named,
    status: Named,
    due_date: Option<String>,
    estimated_hours: Option<f64>,
}

impl From<RedmineIssue> for Ticket {
    fn from(issue: RedmineIssue) -> Self {
        Self {
            key: issue.id.to_string(),
            summary: issue.subject,
            issue_type: issue.tracker.name,
            status: issue.status.name,
            due_date: issue.due_date,
            estimated_hours: issue.estimated_hours,
        }
    }
}
