use reqwest::{Client, RequestBuilder};
use serde::Deserialize;

use super::{get_json, resolve_base_url, Error, Named};
use crate::{
    app_config::Credentials,
    tickets::{Project, Ticket},
};

const PROJECTS_PATH: &str = "api/v2/projects";
const ISSUES_PATH: &str = "api/v2/issues";
const MYSELF_PATH: &str = "api/v2/users/myself";
const COUNT: &str = "100";

pub(super) async fn fetch_projects(
    client: &Client,
    credentials: &Credentials,
) -> Result<Vec<Project>, Error> {
    let projects: Vec<BacklogProject> =
        get_json(request(client, credentials, PROJECTS_PATH), PROJECTS_PATH).await?;
    let base_url = resolve_base_url(&credentials.base_url);
    Ok(projects
        .into_iter()
        .map(|project| project.into_project(&base_url))
        .collect())
}

/// Backlog filters issues by the numeric project id, not the key.
pub(super) async fn fetch_tickets(
    client: &Client,
    credentials: &Credentials,
    project_id: u64,
) -> Result<Vec<Ticket>, Error> {
    let project_id = project_id.to_string();
    let request = request(client, credentials, ISSUES_PATH)
        .query(&[("projectId[]", project_id.as_str()), ("count", COUNT)]);
    let issues: Vec<BacklogIssue> = get_json(request, ISSUES_PATH).await?;
    Ok(issues.into_iter().map(Ticket::from).collect())
}

pub(super) async fn verify(client: &Client, credentials: &Credentials) -> Result<(), Error> {
    get_json::<serde_json::Value>(request(client, credentials, MYSELF_PATH), MYSELF_PATH)
        .await
        .map(|_| ())
}

fn request(client: &Client, credentials: &Credentials, path: &str) -> RequestBuilder {
    let url = format!("{}/{path}", resolve_base_url(&credentials.base_url));
    client
        .get(url)
        .query(&[("apiKey", credentials.token.as_str())])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BacklogProject {
    id: u64,
    project_key: String,
    name: String,
}

impl BacklogProject {
    fn into_project(self, base_url: &str) -> Project {
        Project {
            url: format!("{base_url}/projects/{}", self.project_key),
            id: self.id,
            ..Project::new(self.project_key, self.name)
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BacklogIssue {
    issue_key: String,
    summary: String,
    issue_type: Named,
    status: Named,
    due_date: Option<String>,
    estimated_hours: Option<f64>,
}

impl From<BacklogIssue> for Ticket {
    fn from(issue: BacklogIssue) -> Self {
        Self {
            key: issue.issue_key,
            summary: issue.summary,
            issue_type: issue.issue_type.name,
            status: issue.status.name,
            due_date: issue.due_date,
            estimated_hours: issue.estimated_hours,
        }
    }
}

#[cfg(test)]
mod test_backlog {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn projects() {
        let body = r#"[{"projectKey":"AB","name":"Alpha","id":7}]"#;

        let projects: Vec<Project> = serde_json::from_str::<Vec<BacklogProject>>(body)
            .unwrap()
            .into_iter()
            .map(|project| project.into_project("https://example.backlog.com"))
            .collect();

        assert_eq!(
            projects,
            vec![Project {
                key: "AB".to_string(),
                name: "Alpha".to_string(),
                project_type: String::new(),
                url: "https://example.backlog.com/projects/AB".to_string(),
                id: 7,
                tickets: Vec::new(),
            }]
        );
    }

    #[test]
    fn tickets() {
        let body = r#"[
            {
                "id": 1,
                "projectId": 7,
                "issueKey": "AB-1",
                "keyId": 1,
                "issueType": {"id": 2, "projectId": 7, "name": "Task"},
                "summary": "Write the docs",
                "status": {"id": 1, "name": "Open"},
                "dueDate": "2024-04-01T00:00:00Z",
                "estimatedHours": 4
            },
            {
                "id": 2,
                "issueKey": "AB-2",
                "issueType": {"id": 3, "name": "Bug"},
                "summary": "Crash on start",
                "status": {"id": 2, "name": "In Progress"},
                "dueDate": null,
                "estimatedHours": null
            }
        ]"#;

        let tickets: Vec<Ticket> = serde_json::from_str::<Vec<BacklogIssue>>(body)
            .unwrap()
            .into_iter()
            .map(Ticket::from)
            .collect();

        assert_eq!(
            tickets,
            vec![
                Ticket {
                    key: "AB-1".to_string(),
                    summary: "Write the docs".to_string(),
                    issue_type: "Task".to_string(),
                    status: "Open".to_string(),
                    due_date: Some("2024-04-01T00:00:00Z".to_string()),
                    estimated_hours: Some(4.0),
                },
                Ticket {
                    key: "AB-2".to_string(),
                    summary: "Crash on start".to_string(),
                    issue_type: "Bug".to_string(),
                    status: "In Progress".to_string(),
                    due_date: None,
                    estimated_hours: None,
                },
            ]
        );
    }

    #[test]
    fn empty_issue_list() {
        let issues = serde_json::from_str::<Vec<BacklogIssue>>("[]").unwrap();
        assert!(issues.is_empty());
    }
}
