use std::fmt;
use std::str::FromStr;

use crate::domain::DashError;

/// A single project row as supplied by the data provider.
///
/// All fields are display strings. An absent value is the empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectRecord {
    pub client: String,
    pub country: String,
    pub email: String,
    pub project: String,
    pub progress: String,
    pub status: String,
    pub date: String,
    pub image: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ProjectField {
    Client,
    Country,
    Email,
    Project,
    Progress,
    Status,
    Date,
    Image,
}

impl ProjectField {
    /// Every field, in declaration order. Free text search runs over all of them.
    pub const ALL: [ProjectField; 8] = [
        ProjectField::Client,
        ProjectField::Country,
        ProjectField::Email,
        ProjectField::Project,
        ProjectField::Progress,
        ProjectField::Status,
        ProjectField::Date,
        ProjectField::Image,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProjectField::Client => "client",
            ProjectField::Country => "country",
            ProjectField::Email => "email",
            ProjectField::Project => "project",
            ProjectField::Progress => "progress",
            ProjectField::Status => "status",
            ProjectField::Date => "date",
            ProjectField::Image => "image",
        }
    }

    /// Column header shown in the table.
    pub fn title(self) -> &'static str {
        match self {
            ProjectField::Client => "Name",
            ProjectField::Country => "Country",
            ProjectField::Email => "Email",
            ProjectField::Project => "Project Name",
            ProjectField::Progress => "Task Progress",
            ProjectField::Status => "Status",
            ProjectField::Date => "Date",
            ProjectField::Image => "Image",
        }
    }
}

impl fmt::Display for ProjectField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProjectField {
    type Err = DashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "client" | "name" => Ok(ProjectField::Client),
            "country" => Ok(ProjectField::Country),
            "email" => Ok(ProjectField::Email),
            "project" | "project name" | "projectname" => Ok(ProjectField::Project),
            "progress" => Ok(ProjectField::Progress),
            "status" => Ok(ProjectField::Status),
            "date" => Ok(ProjectField::Date),
            "image" => Ok(ProjectField::Image),
            other => Err(DashError::UnknownField(other.to_string())),
        }
    }
}

impl ProjectRecord {
    pub fn get(&self, field: ProjectField) -> &str {
        match field {
            ProjectField::Client => &self.client,
            ProjectField::Country => &self.country,
            ProjectField::Email => &self.email,
            ProjectField::Project => &self.project,
            ProjectField::Progress => &self.progress,
            ProjectField::Status => &self.status,
            ProjectField::Date => &self.date,
            ProjectField::Image => &self.image,
        }
    }

    pub fn set(&mut self, field: ProjectField, value: String) {
        match field {
            ProjectField::Client => self.client = value,
            ProjectField::Country => self.country = value,
            ProjectField::Email => self.email = value,
            ProjectField::Project => self.project = value,
            ProjectField::Progress => self.progress = value,
            ProjectField::Status => self.status = value,
            ProjectField::Date => self.date = value,
            ProjectField::Image => self.image = value,
        }
    }

    /// Leading integer of the progress string clamped to 0..=100, e.g. "75%" -> 75.
    pub fn progress_percent(&self) -> Option<u16> {
        let digits: String = self
            .progress
            .trim()
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse::<u16>().ok().map(|p| p.min(100))
    }
}

// (client, country, email, project, progress, status, date, image)
const SEED: [(&str, &str, &str, &str, &str, &str, &str, &str); 20] = [
    ("Ava Thompson", "US", "ava.thompson@example.com", "Website Redesign", "75%", "In Progress", "2024-03-12", "https://i.pravatar.cc/150?img=1"),
    ("Lucas Martin", "FR", "lucas.martin@example.fr", "Mobile App", "100%", "Completed", "2024-01-28", "https://i.pravatar.cc/150?img=2"),
    ("Mia Schneider", "DE", "mia.schneider@example.de", "CRM Migration", "40%", "In Progress", "2024-04-02", "https://i.pravatar.cc/150?img=3"),
    ("Noah Williams", "US", "noah.williams@example.com", "Data Warehouse", "10%", "Pending", "2024-05-19", "https://i.pravatar.cc/150?img=4"),
    ("Chloe Dubois", "FR", "chloe.dubois@example.fr", "Brand Refresh", "60%", "On Hold", "2024-02-07", "https://i.pravatar.cc/150?img=5"),
    ("Ethan Brown", "US", "ethan.brown@example.com", "Payment Gateway", "90%", "In Progress", "2024-06-23", "https://i.pravatar.cc/150?img=6"),
    ("Lena Fischer", "DE", "lena.fischer@example.de", "Inventory System", "100%", "Completed", "2023-11-30", "https://i.pravatar.cc/150?img=7"),
    ("Sofia Rossi", "IT", "sofia.rossi@example.it", "E-commerce Store", "55%", "In Progress", "2024-03-29", "https://i.pravatar.cc/150?img=8"),
    ("Oliver Smith", "GB", "oliver.smith@example.co.uk", "Analytics Dashboard", "25%", "Pending", "2024-07-04", "https://i.pravatar.cc/150?img=9"),
    ("Hugo Garcia", "ES", "hugo.garcia@example.es", "Booking Platform", "80%", "In Progress", "2024-02-15", "https://i.pravatar.cc/150?img=10"),
    ("Emma Johnson", "US", "emma.johnson@example.com", "Marketing Site", "100%", "Completed", "2023-12-11", "https://i.pravatar.cc/150?img=11"),
    ("Yuki Tanaka", "JP", "yuki.tanaka@example.jp", "Chat Service", "35%", "On Hold", "2024-04-21", "https://i.pravatar.cc/150?img=12"),
    ("Liam Wilson", "CA", "liam.wilson@example.ca", "Fleet Tracker", "70%", "In Progress", "2024-05-06", "https://i.pravatar.cc/150?img=13"),
    ("Isabella Costa", "BR", "isabella.costa@example.com.br", "Learning Portal", "5%", "Pending", "2024-08-01", "https://i.pravatar.cc/150?img=14"),
    ("Jonas Becker", "DE", "jonas.becker@example.de", "HR Suite", "100%", "Completed", "2024-01-09", "https://i.pravatar.cc/150?img=15"),
    ("Amelia Clarke", "AU", "amelia.clarke@example.com.au", "Support Desk", "45%", "In Progress", "2024-06-12", "https://i.pravatar.cc/150?img=16"),
    ("Arjun Mehta", "IN", "arjun.mehta@example.in", "Billing Engine", "65%", "In Progress", "2024-03-03", "https://i.pravatar.cc/150?img=17"),
    ("Camille Laurent", "FR", "camille.laurent@example.fr", "Event App", "15%", "Pending", "2024-07-27", "https://i.pravatar.cc/150?img=18"),
    ("Mason Davis", "US", "mason.davis@example.com", "Security Audit", "95%", "In Progress", "2024-02-26", "https://i.pravatar.cc/150?img=19"),
    ("Elena Petrova", "BG", "elena.petrova@example.bg", "Document Archive", "50%", "On Hold", "2024-05-30", "https://i.pravatar.cc/150?img=20"),
];

/// The embedded project list used when no data file is given.
pub fn seed_records() -> Vec<ProjectRecord> {
    SEED.iter()
        .map(
            |&(client, country, email, project, progress, status, date, image)| ProjectRecord {
                client: client.to_string(),
                country: country.to_string(),
                email: email.to_string(),
                project: project.to_string(),
                progress: progress.to_string(),
                status: status.to_string(),
                date: date.to_string(),
                image: image.to_string(),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_names_roundtrip_through_parse() {
        for field in ProjectField::ALL {
            assert_eq!(field.name().parse::<ProjectField>().unwrap(), field);
        }
    }

    #[test]
    fn field_parse_accepts_aliases_and_case() {
        assert_eq!("Name".parse::<ProjectField>().unwrap(), ProjectField::Client);
        assert_eq!(" COUNTRY ".parse::<ProjectField>().unwrap(), ProjectField::Country);
        assert_eq!(
            "project name".parse::<ProjectField>().unwrap(),
            ProjectField::Project
        );
    }

    #[test]
    fn field_parse_rejects_unknown() {
        match "budget".parse::<ProjectField>() {
            Err(DashError::UnknownField(name)) => assert_eq!(name, "budget"),
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn get_and_set_address_the_same_field() {
        let mut record = ProjectRecord::default();
        for (i, field) in ProjectField::ALL.into_iter().enumerate() {
            record.set(field, format!("v{i}"));
        }
        for (i, field) in ProjectField::ALL.into_iter().enumerate() {
            assert_eq!(record.get(field), format!("v{i}"));
        }
    }

    #[test]
    fn progress_percent_parses_leading_digits() {
        let mut record = ProjectRecord {
            progress: "75%".into(),
            ..Default::default()
        };
        assert_eq!(record.progress_percent(), Some(75));
        record.progress = "250".into();
        assert_eq!(record.progress_percent(), Some(100));
        record.progress = "n/a".into();
        assert_eq!(record.progress_percent(), None);
        record.progress = String::new();
        assert_eq!(record.progress_percent(), None);
    }

    #[test]
    fn seed_has_twenty_records_with_all_fields() {
        let records = seed_records();
        assert_eq!(records.len(), 20);
        assert!(
            records
                .iter()
                .all(|r| ProjectField::ALL.iter().all(|&f| !r.get(f).is_empty()))
        );
    }
}
