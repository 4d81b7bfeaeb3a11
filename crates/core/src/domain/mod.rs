pub mod calendar;
pub mod contact;
pub mod email;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Closed set of side-effect providers the dispatch layer supports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceProvider {
    Gmail,
    Outlook,
}

impl ServiceProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gmail => "Gmail",
            Self::Outlook => "Outlook",
        }
    }
}

impl std::str::FromStr for ServiceProvider {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gmail" => Ok(Self::Gmail),
            "outlook" => Ok(Self::Outlook),
            other => Err(DomainError::InvalidServiceProvider(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceProvider;

    #[test]
    fn parses_provider_case_insensitively() {
        assert_eq!("Gmail".parse::<ServiceProvider>().expect("gmail"), ServiceProvider::Gmail);
        assert_eq!(
            " OUTLOOK ".parse::<ServiceProvider>().expect("outlook"),
            ServiceProvider::Outlook
        );
        assert!("hotmail".parse::<ServiceProvider>().is_err());
    }
}
