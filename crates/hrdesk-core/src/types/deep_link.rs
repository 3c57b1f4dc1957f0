//! Deep-link routing table shared by the server (links in e-mails) and
//! clients (mapping an opened URL to a screen).

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::AppError;
use crate::result::AppResult;

/// Report kinds that may appear in a `reports/{kind}/{id}` link.
pub const REPORT_KINDS: [&str; 3] = ["accident", "illness", "departure"];

/// One entry of the routing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Route {
    /// Path pattern relative to the link base.
    pub pattern: &'static str,
    /// Screen the client opens for this path.
    pub screen: &'static str,
}

/// Every path the app understands.
pub const ROUTES: &[Route] = &[
    Route {
        pattern: "login",
        screen: "SignIn",
    },
    Route {
        pattern: "profile",
        screen: "Profile",
    },
    Route {
        pattern: "reset-password?token={token}",
        screen: "ResetPassword",
    },
    Route {
        pattern: "tasks/{id}",
        screen: "TaskDetail",
    },
    Route {
        pattern: "reports/{kind}/{id}",
        screen: "ReportDetail",
    },
    Route {
        pattern: "companies/{id}",
        screen: "CompanyDetail",
    },
];

/// A parsed deep link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum DeepLink {
    /// Sign-in screen.
    Login,
    /// The signed-in user's profile.
    Profile,
    /// Password reset form pre-filled with a reset token.
    ResetPassword {
        /// Raw reset token from the e-mail.
        token: String,
    },
    /// A single task.
    Task {
        /// Task ID.
        id: Uuid,
    },
    /// A single report of the given kind.
    Report {
        /// One of [`REPORT_KINDS`].
        kind: String,
        /// Report ID.
        id: Uuid,
    },
    /// A company detail page.
    Company {
        /// Company ID.
        id: Uuid,
    },
}

impl DeepLink {
    /// The screen this link opens.
    pub fn screen(&self) -> &'static str {
        match self {
            Self::Login => "SignIn",
            Self::Profile => "Profile",
            Self::ResetPassword { .. } => "ResetPassword",
            Self::Task { .. } => "TaskDetail",
            Self::Report { .. } => "ReportDetail",
            Self::Company { .. } => "CompanyDetail",
        }
    }

    fn path(&self) -> String {
        match self {
            Self::Login => "login".to_string(),
            Self::Profile => "profile".to_string(),
            Self::ResetPassword { .. } => "reset-password".to_string(),
            Self::Task { id } => format!("tasks/{id}"),
            Self::Report { kind, id } => format!("reports/{kind}/{id}"),
            Self::Company { id } => format!("companies/{id}"),
        }
    }

    /// Build the absolute URL for this link under `base`.
    pub fn to_url(&self, base: &str) -> AppResult<Url> {
        let base = base_url(base)?;
        let mut url = base.join(&self.path())?;
        if let Self::ResetPassword { token } = self {
            url.query_pairs_mut().append_pair("token", token);
        }
        Ok(url)
    }

    /// Parse a URL opened by the client. The URL must live under `base`.
    pub fn parse(input: &str, base: &str) -> AppResult<Self> {
        let url = Url::parse(input)?;
        let base = base_url(base)?;

        if url.scheme() != base.scheme()
            || url.host_str() != base.host_str()
            || url.port() != base.port()
        {
            return Err(AppError::validation(format!(
                "Link '{input}' does not belong to this app"
            )));
        }

        let rest = url
            .path()
            .strip_prefix(base.path())
            .ok_or_else(|| AppError::validation(format!("Unknown link path '{}'", url.path())))?;
        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Ok(Self::Login),
            ["profile"] => Ok(Self::Profile),
            ["reset-password"] => {
                let token = url
                    .query_pairs()
                    .find(|(k, _)| k == "token")
                    .map(|(_, v)| v.into_owned())
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| AppError::validation("Reset link is missing its token"))?;
                Ok(Self::ResetPassword { token })
            }
            ["tasks", id] => Ok(Self::Task { id: parse_id(id)? }),
            ["reports", kind, id] if REPORT_KINDS.contains(kind) => Ok(Self::Report {
                kind: (*kind).to_string(),
                id: parse_id(id)?,
            }),
            ["companies", id] => Ok(Self::Company { id: parse_id(id)? }),
            _ => Err(AppError::validation(format!("Unknown link path '{rest}'"))),
        }
    }
}

fn base_url(base: &str) -> AppResult<Url> {
    let mut url = Url::parse(base)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::validation(format!("Invalid id '{raw}' in link")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "hrdesk://app/";

    #[test]
    fn test_reset_link_carries_token() {
        let link = DeepLink::ResetPassword {
            token: "abc123".to_string(),
        };
        let url = link.to_url(BASE).unwrap();
        assert_eq!(url.as_str(), "hrdesk://app/reset-password?token=abc123");
        assert_eq!(DeepLink::parse(url.as_str(), BASE).unwrap(), link);
    }

    #[test]
    fn test_https_base_with_subpath() {
        let id = Uuid::new_v4();
        let link = DeepLink::Report {
            kind: "illness".to_string(),
            id,
        };
        let url = link.to_url("https://hrdesk.example.com/app").unwrap();
        assert_eq!(
            url.as_str(),
            format!("https://hrdesk.example.com/app/reports/illness/{id}")
        );
        assert_eq!(
            DeepLink::parse(url.as_str(), "https://hrdesk.example.com/app").unwrap(),
            link
        );
    }

    #[test]
    fn test_rejects_foreign_host_and_bad_paths() {
        assert!(DeepLink::parse("hrdesk://other/login", BASE).is_err());
        assert!(DeepLink::parse("hrdesk://app/reset-password", BASE).is_err());
        assert!(DeepLink::parse("hrdesk://app/tasks/not-a-uuid", BASE).is_err());
        assert!(DeepLink::parse("hrdesk://app/reports/payroll/00000000-0000-0000-0000-000000000000", BASE).is_err());
        assert!(DeepLink::parse("hrdesk://app/nowhere", BASE).is_err());
    }

    #[test]
    fn test_every_link_has_a_route() {
        let links = [
            DeepLink::Login,
            DeepLink::Profile,
            DeepLink::ResetPassword {
                token: "t".to_string(),
            },
            DeepLink::Task { id: Uuid::nil() },
            DeepLink::Report {
                kind: "accident".to_string(),
                id: Uuid::nil(),
            },
            DeepLink::Company { id: Uuid::nil() },
        ];
        for link in links {
            assert!(ROUTES.iter().any(|r| r.screen == link.screen()));
        }
    }
}
