use crate::commit::Commit;
use crate::error::CoreError;

/// Placeholder replaced by the full commit hash in a link template.
pub const COMMIT_HASH_PLACEHOLDER: &str = "{commitHash}";

/// URL template for linking a commit, e.g. `https://git.example/repo/commit/{commitHash}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitLinkTemplate(String);

impl CommitLinkTemplate {
    pub fn parse(template: &str) -> Result<Self, CoreError> {
        if !template.contains(COMMIT_HASH_PLACEHOLDER) {
            return Err(CoreError::InvalidInput(format!(
                "commit link template must contain {COMMIT_HASH_PLACEHOLDER}: {template}"
            )));
        }
        Ok(Self(template.to_string()))
    }

    pub fn render(&self, commit: &Commit) -> String {
        self.0.replace(COMMIT_HASH_PLACEHOLDER, &commit.hash)
    }
}

/// Render the Jira comment listing `commits`, one wiki-markup link each.
///
/// ```text
/// Related commits in myrepo:
///
///  * [abcd1234 - Fixes ABC-1|https://example/browse/abcd1234567890]
/// ```
pub fn compose_comment(repo_name: &str, commits: &[Commit], link: &CommitLinkTemplate) -> String {
    let mut body = format!("Related commits in {repo_name}:\n\n");
    for commit in commits {
        body.push_str(&format!(
            " * [{} - {}|{}]\n",
            commit.short_hash(),
            commit.title.as_deref().unwrap_or_default(),
            link.render(commit)
        ));
    }
    body
}
