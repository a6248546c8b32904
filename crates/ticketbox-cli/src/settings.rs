use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use ticketbox_core::CommitLinkTemplate;
use ticketbox_service::{AdoService, JiraService};

use crate::config::Credentials;
use crate::error::ToolError;
use crate::git::Git;
use crate::secrets::{self, Prompt};

pub const JIRA_USER_KEY: &str = "JIRA_USER";
pub const JIRA_BASE_URL_KEY: &str = "jira.baseUrl";
pub const ISSUE_REGEX_KEY: &str = "jira.issueRegex";
pub const COMMIT_LINK_FORMAT_KEY: &str = "jira.commitLinkFormat";
pub const SYNC_JQL_KEY: &str = "jira.syncJql";
pub const ADO_BASE_URL_KEY: &str = "ado.baseUrl";

pub const DEFAULT_SYNC_JQL: &str = "ORDER BY key ASC";

/// Raw settings as found in git config and the environment.
///
/// Nothing is validated until a tool asks for the subset it needs.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub jira_user: Option<String>,
    pub jira_secret: Option<String>,
    pub jira_base_url: Option<String>,
    pub issue_regex: Option<String>,
    pub commit_link_format: Option<String>,
    pub sync_jql: Option<String>,
    pub ado_pat: Option<String>,
    pub ado_base_url: Option<String>,
}

/// Validated inputs for `link-commits`.
#[derive(Debug, Clone)]
pub struct LinkingSettings {
    pub issue_pattern: Regex,
    pub link_template: CommitLinkTemplate,
}

/// Validated inputs for `sync-links`.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub issue_pattern: Regex,
    pub jql: String,
}

impl Settings {
    pub async fn load(git: &Git, credentials: &Credentials) -> Result<Self, ToolError> {
        Ok(Self {
            jira_user: non_blank(credentials.jira_user.clone()),
            jira_secret: non_blank(credentials.jira_secret.clone()),
            jira_base_url: git.config(JIRA_BASE_URL_KEY).await?,
            issue_regex: git.config(ISSUE_REGEX_KEY).await?,
            commit_link_format: git.config(COMMIT_LINK_FORMAT_KEY).await?,
            sync_jql: git.config(SYNC_JQL_KEY).await?,
            ado_pat: non_blank(credentials.ado_pat.clone()),
            ado_base_url: git.config(ADO_BASE_URL_KEY).await?,
        })
    }

    pub fn for_linking(&self) -> Result<LinkingSettings, ToolError> {
        let issue_pattern = self.issue_pattern()?;
        let format = require(&self.commit_link_format, COMMIT_LINK_FORMAT_KEY)?;
        let link_template = CommitLinkTemplate::parse(format).map_err(|_| {
            ToolError::usage(format!("{COMMIT_LINK_FORMAT_KEY} must contain {{commitHash}}"))
        })?;
        Ok(LinkingSettings {
            issue_pattern,
            link_template,
        })
    }

    pub fn for_syncing(&self) -> Result<SyncSettings, ToolError> {
        Ok(SyncSettings {
            issue_pattern: self.issue_pattern()?,
            jql: self
                .sync_jql
                .clone()
                .unwrap_or_else(|| DEFAULT_SYNC_JQL.to_string()),
        })
    }

    fn issue_pattern(&self) -> Result<Regex, ToolError> {
        let pattern = require(&self.issue_regex, ISSUE_REGEX_KEY)?;
        Regex::new(pattern).map_err(|e| ToolError::usage(format!("{ISSUE_REGEX_KEY}: {e}")))
    }

    /// Check the non-secret Jira settings.
    pub fn check_jira_access(&self) -> Result<(), ToolError> {
        require(&self.jira_user, JIRA_USER_KEY)?;
        require(&self.jira_base_url, JIRA_BASE_URL_KEY)?;
        Ok(())
    }

    pub fn check_ado_access(&self) -> Result<(), ToolError> {
        require(&self.ado_base_url, ADO_BASE_URL_KEY)?;
        Ok(())
    }

    /// Build the Jira client, asking for the secret if it is not configured.
    pub async fn jira_service(
        &self,
        prompt: &mut dyn Prompt,
        verbose: bool,
    ) -> Result<JiraService, ToolError> {
        let user = require(&self.jira_user, JIRA_USER_KEY)?;
        let base_url = require(&self.jira_base_url, JIRA_BASE_URL_KEY)?;
        let secret = secrets::resolve_secret(
            secrets::JIRA_SECRET,
            self.jira_secret.clone(),
            secrets::JIRA_SECRET.command_from_env(),
            prompt,
            verbose,
        )
        .await?;

        let service = JiraService::new(base_url, basic_auth(user, &secret))
            .map_err(|e| ToolError::usage(format!("{JIRA_BASE_URL_KEY}: {e}")))?;
        Ok(service.with_verbose(verbose))
    }

    pub async fn ado_service(
        &self,
        prompt: &mut dyn Prompt,
        verbose: bool,
    ) -> Result<AdoService, ToolError> {
        let base_url = require(&self.ado_base_url, ADO_BASE_URL_KEY)?;
        let pat = secrets::resolve_secret(
            secrets::ADO_PAT,
            self.ado_pat.clone(),
            secrets::ADO_PAT.command_from_env(),
            prompt,
            verbose,
        )
        .await?;

        // ADO takes a PAT as the password of an empty user name.
        let service = AdoService::new(base_url, basic_auth("", &pat))
            .map_err(|e| ToolError::usage(format!("{ADO_BASE_URL_KEY}: {e}")))?;
        Ok(service.with_verbose(verbose))
    }
}

/// `Authorization` header value for HTTP basic auth.
pub fn basic_auth(user: &str, secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{secret}")))
}

fn require<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, ToolError> {
    value
        .as_deref()
        .ok_or_else(|| ToolError::usage(format!("{key} must be set")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
