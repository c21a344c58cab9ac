//! [`Manager`]s own every configured account ([`Instance`]) of one tracker type.

use std::path::{Path, PathBuf};

use log::{debug, error, info};
use miette::Diagnostic;
use reqwest::Client;

use crate::{
    app_config::{self, new_credential_dir, CredentialSet, Credentials},
    prompt,
    tickets::{Project, Ticket},
    trackers::{self, Tracker},
};

/// One configured account on a tracker, along with whatever was fetched from it.
#[derive(Debug)]
pub struct Instance {
    tracker: Tracker,
    credentials: CredentialSet,
    projects: Vec<Project>,
}

impl Instance {
    pub fn new(tracker: Tracker, credentials: CredentialSet) -> Self {
        Self {
            tracker,
            credentials,
            projects: Vec::new(),
        }
    }

    pub fn tracker(&self) -> Tracker {
        self.tracker
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// Fetch every project, then the tickets of each project. Replaces anything fetched before.
    pub async fn run(&mut self, client: &Client) {
        let mut projects = self.fetch_all_projects(client).await;
        for project in &mut projects {
            info!("Fetching {}...", project.key);
            let tickets = self.fetch_all_tickets(client, project).await;
            for ticket in &tickets {
                debug!("- {ticket}");
            }
            project.add_tickets(tickets);
        }
        self.projects = projects;
    }

    /// Every project visible to this account. Failures are logged and produce an empty list.
    pub async fn fetch_all_projects(&self, client: &Client) -> Vec<Project> {
        let result = match self.credentials.load() {
            Ok(credentials) => self.tracker.fetch_projects(client, &credentials).await,
            Err(err) => Err(err.into()),
        };
        self.or_empty(result, "projects")
    }

    /// One page of tickets for `project`. Failures are logged and produce an empty list.
    pub async fn fetch_all_tickets(&self, client: &Client, project: &Project) -> Vec<Ticket> {
        let result = match self.credentials.load() {
            Ok(credentials) => {
                self.tracker
                    .fetch_tickets(client, &credentials, project)
                    .await
            }
            Err(err) => Err(err.into()),
        };
        self.or_empty(result, &format!("tickets of {}", project.key))
    }

    fn or_empty<T>(&self, result: Result<Vec<T>, trackers::Error>, what: &str) -> Vec<T> {
        result.unwrap_or_else(|err| {
            error!(
                "Could not fetch {what} from {} ({}): {err}",
                self.tracker,
                self.credentials.dir().display()
            );
            Vec::new()
        })
    }
}

/// Every [`Instance`] of one tracker type.
#[derive(Debug)]
pub struct Manager {
    tracker: Tracker,
    instances: Vec<Instance>,
}

impl Manager {
    /// Build one [`Instance`] per credential set stored for `tracker` under `config_root`.
    pub fn discover(tracker: Tracker, config_root: &Path) -> Result<Self, app_config::Error> {
        let instances = app_config::list_credential_sets(&tracker_dir(tracker, config_root))?
            .into_iter()
            .map(|credentials| Instance::new(tracker, credentials))
            .collect();
        Ok(Self { tracker, instances })
    }

    pub fn tracker(&self) -> Tracker {
        self.tracker
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub async fn run(&mut self, client: &Client) {
        for instance in &mut self.instances {
            instance.run(client).await;
        }
    }
}

/// The directory holding every credential set of `tracker`.
pub(crate) fn tracker_dir(tracker: Tracker, config_root: &Path) -> PathBuf {
    config_root.join(tracker.name())
}

/// Interactively add a new account for `tracker`.
///
/// Returns where the credentials were saved, or `None` if the tracker rejected them.
pub(crate) async fn configure(
    tracker: Tracker,
    config_root: &Path,
    client: &Client,
) -> Result<Option<CredentialSet>, Error> {
    let base_url = prompt::get_input(tracker.base_url_prompt())?;
    let email = if tracker.needs_email() {
        Some(prompt::get_input(&format!(
            "Enter your email address associated with {tracker}:"
        ))?)
    } else {
        None
    };
    let token = prompt::get_secret(tracker.token_prompt())?;
    let credentials = Credentials {
        base_url: base_url.trim().to_string(),
        email: email.map(|email| email.trim().to_string()),
        token: token.trim().to_string(),
    };

    let saved = add_credentials(tracker, config_root, client, &credentials, || {
        prompt::get_input("Give a name for the new configuration:")
    })
    .await?;
    if let Some(saved) = &saved {
        println!("Configuration saved in folder: {}", saved.dir().display());
    }
    Ok(saved)
}

/// Save `credentials` as a new credential set of `tracker`, but only once the tracker has
/// accepted them.
///
/// `name` is called until it returns a name which isn't taken yet. A rejection is logged and
/// gives `Ok(None)` with nothing written.
///
/// ## Errors
/// When `name` fails or the credential files can't be written.
pub async fn add_credentials(
    tracker: Tracker,
    config_root: &Path,
    client: &Client,
    credentials: &Credentials,
    mut name: impl FnMut() -> Result<String, prompt::Error>,
) -> Result<Option<CredentialSet>, Error> {
    if let Err(err) = tracker.verify(client, credentials).await {
        error!("Could not verify the {tracker} credentials: {err}");
        return Ok(None);
    }

    let tracker_dir = tracker_dir(tracker, config_root);
    let dir = loop {
        let name = name()?;
        match new_credential_dir(&tracker_dir, &name) {
            Some(dir) => break dir,
            None => println!(
                "Configuration '{name}' already exists. Please choose a different name."
            ),
        }
    };
    Ok(Some(CredentialSet::save(dir, credentials)?))
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] prompt::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    AppConfig(#[from] app_config::Error),
}
