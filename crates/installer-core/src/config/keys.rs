//! Recognized configuration settings and their placeholder tokens

use std::fmt;

/// A setting the installer knows how to substitute into templates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ProjectName,
    ProjectDescription,
    AuthorName,
    AuthorEmail,
    PythonVersion,
    ApiHost,
    ApiPort,
    ProjectVersion,
    ApiPrefix,
    Environment,
}

impl SettingKey {
    /// Every recognized setting, in display order
    pub const ALL: [SettingKey; 10] = [
        SettingKey::ProjectName,
        SettingKey::ProjectDescription,
        SettingKey::AuthorName,
        SettingKey::AuthorEmail,
        SettingKey::PythonVersion,
        SettingKey::ApiHost,
        SettingKey::ApiPort,
        SettingKey::ProjectVersion,
        SettingKey::ApiPrefix,
        SettingKey::Environment,
    ];

    /// Settings every project is expected to define in its `.env`
    pub const CORE: [SettingKey; 7] = [
        SettingKey::ProjectName,
        SettingKey::ProjectDescription,
        SettingKey::AuthorName,
        SettingKey::AuthorEmail,
        SettingKey::PythonVersion,
        SettingKey::ApiHost,
        SettingKey::ApiPort,
    ];

    /// Name of the key in the configuration file
    pub fn key(&self) -> &'static str {
        match self {
            SettingKey::ProjectName => "PROJECT_NAME",
            SettingKey::ProjectDescription => "PROJECT_DESCRIPTION",
            SettingKey::AuthorName => "AUTHOR_NAME",
            SettingKey::AuthorEmail => "AUTHOR_EMAIL",
            SettingKey::PythonVersion => "PYTHON_VERSION",
            SettingKey::ApiHost => "API_HOST",
            SettingKey::ApiPort => "API_PORT",
            SettingKey::ProjectVersion => "PROJECT_VERSION",
            SettingKey::ApiPrefix => "API_PREFIX",
            SettingKey::Environment => "ENVIRONMENT",
        }
    }

    /// Placeholder token as it appears in template documents
    pub fn placeholder(&self) -> &'static str {
        match self {
            SettingKey::ProjectName => "$PROJECT_NAME",
            SettingKey::ProjectDescription => "$PROJECT_DESCRIPTION",
            SettingKey::AuthorName => "$AUTHOR_NAME",
            SettingKey::AuthorEmail => "$AUTHOR_EMAIL",
            SettingKey::PythonVersion => "$PYTHON_VERSION",
            SettingKey::ApiHost => "$API_HOST",
            SettingKey::ApiPort => "$API_PORT",
            SettingKey::ProjectVersion => "$PROJECT_VERSION",
            SettingKey::ApiPrefix => "$API_PREFIX",
            SettingKey::Environment => "$ENVIRONMENT",
        }
    }

    /// Human-readable label used in the installation plan
    pub fn label(&self) -> &'static str {
        match self {
            SettingKey::ProjectName => "project name",
            SettingKey::ProjectDescription => "description",
            SettingKey::AuthorName => "author name",
            SettingKey::AuthorEmail => "author email",
            SettingKey::PythonVersion => "Python version",
            SettingKey::ApiHost => "service host",
            SettingKey::ApiPort => "service port",
            SettingKey::ProjectVersion => "project version",
            SettingKey::ApiPrefix => "API prefix",
            SettingKey::Environment => "environment",
        }
    }

    /// Look up a setting by its configuration key (case-sensitive)
    pub fn from_key(key: &str) -> Option<SettingKey> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_matches_key() {
        for key in SettingKey::ALL {
            assert_eq!(key.placeholder(), format!("${}", key.key()));
        }
    }

    #[test]
    fn test_from_key() {
        assert_eq!(SettingKey::from_key("PROJECT_NAME"), Some(SettingKey::ProjectName));
        assert_eq!(SettingKey::from_key("API_PORT"), Some(SettingKey::ApiPort));
        assert_eq!(SettingKey::from_key("project_name"), None);
        assert_eq!(SettingKey::from_key("$PROJECT_NAME"), None);
        assert_eq!(SettingKey::from_key(""), None);
    }
}
