use std::path::PathBuf;

use log::{error, info};
use miette::Diagnostic;
use reqwest::Client;
use time::{OffsetDateTime, UtcOffset};

use crate::{
    app_config,
    manager::{self, Manager},
    prompt, report,
    report::Templates,
    trackers::Tracker,
};

/// How and where the report gets written.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub output_dir: PathBuf,
    /// Directory which may contain `head.html` and `tail.html` to use instead of the built-ins.
    pub template_dir: Option<PathBuf>,
    /// Open the finished report in the default browser.
    pub open: bool,
    /// Offset of the timestamp in the report's file name.
    pub utc_offset: UtcOffset,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            template_dir: None,
            open: true,
            utc_offset: UtcOffset::UTC,
        }
    }
}

/// Drives every tracker, one after another.
#[derive(Debug)]
pub struct Controller {
    config_root: PathBuf,
    client: Client,
}

impl Controller {
    pub fn new(config_root: PathBuf) -> Self {
        Self {
            config_root,
            client: Client::new(),
        }
    }

    /// Discover and run a [`Manager`] for each tracker, in [`Tracker::ALL`] order.
    pub async fn fetch(&self) -> Result<Vec<Manager>, Error> {
        let mut managers = Vec::with_capacity(Tracker::ALL.len());
        for tracker in Tracker::ALL {
            let mut manager = Manager::discover(tracker, &self.config_root)?;
            manager.run(&self.client).await;
            managers.push(manager);
        }
        Ok(managers)
    }

    /// Fetch everything and write the report, returning where it was written.
    pub async fn run(&self, options: &ReportOptions) -> Result<PathBuf, Error> {
        let templates = Templates::load(options.template_dir.as_deref())?;
        let managers = self.fetch().await?;
        let contents = templates.compose(&report::rows(&managers));
        let timestamp = OffsetDateTime::now_utc().to_offset(options.utc_offset);
        let path = report::save(&options.output_dir, &contents, timestamp)?;
        info!("Report written to {}", path.display());
        println!("Report saved to {}", path.display());

        if options.open {
            if let Err(err) = opener::open(&path) {
                error!("Could not open {}: {err}", path.display());
            }
        }
        Ok(path)
    }

    /// Offer to add an account for each tracker, or only for `only` when given.
    pub async fn configure(&self, only: Option<Tracker>) -> Result<(), Error> {
        if let Some(tracker) = only {
            manager::configure(tracker, &self.config_root, &self.client).await?;
            return Ok(());
        }
        for tracker in Tracker::ALL {
            if prompt::confirm(&format!("Add a {tracker} account?"))? {
                manager::configure(tracker, &self.config_root, &self.client).await?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    AppConfig(#[from] app_config::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Manager(#[from] manager::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Report(#[from] report::Error),
    #[error(transparent)]
    #[diagnostic(transparent)]
    Prompt(#[from] prompt::Error),
}
