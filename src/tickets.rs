use std::fmt;

/// A tracker-side container of tickets, normalized across every supported tracker.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Project {
    /// The tracker-native identifier, e.g. a Jira project key or a Redmine identifier.
    pub key: String,
    pub name: String,
    /// Tracker-specific classification. Only Jira fills this in.
    pub project_type: String,
    /// Where a person can look at the project in a browser.
    pub url: String,
    /// Numeric id, only needed by trackers which filter issues by id rather than key.
    pub id: u64,
    pub tickets: Vec<Ticket>,
}

impl Project {
    pub(crate) fn new(key: String, name: String) -> Self {
        Self {
            key,
            name,
            ..Self::default()
        }
    }

    pub(crate) fn add_tickets(&mut self, tickets: Vec<Ticket>) {
        self.tickets.extend(tickets);
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Ticket {
    pub key: String,
    pub summary: String,
    pub issue_type: String,
    pub status: String,
    pub due_date: Option<String>,
    pub estimated_hours: Option<f64>,
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: [{}] {} (Status: {})",
            self.key, self.issue_type, self.summary, self.status
        )
    }
}
