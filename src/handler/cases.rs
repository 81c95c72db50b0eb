//! Case chain
//!
//! An ordered list of rules, each deciding whether it applies to the resolved path
//! and, if so, how to answer. The first matching rule serves the request. The chain
//! always ends with [`Rule::Fallback`], which matches everything, so dispatch is total.

use super::content;
use super::error::ServeError;
use super::listing::{self, ListingOptions};
use super::outcome::Outcome;
use super::resolve::RequestContext;
use super::script::ScriptRunner;
use crate::config::Config;
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Nothing exists at the resolved path
    NotFound,
    /// Regular file whose name ends in the script extension
    ScriptFile,
    /// Any other regular file
    PlainFile,
    /// Directory holding an index file
    DirectoryWithIndex,
    /// Directory without an index file
    DirectoryWithoutIndex,
    /// Matches everything
    Fallback,
}

/// Rules in evaluation order
pub const STANDARD_RULES: [Rule; 6] = [
    Rule::NotFound,
    Rule::ScriptFile,
    Rule::PlainFile,
    Rule::DirectoryWithIndex,
    Rule::DirectoryWithoutIndex,
    Rule::Fallback,
];

/// Settings the rules consult while matching and responding
#[derive(Debug, Clone)]
pub struct CaseSettings {
    pub index_file: String,
    /// Empty disables script execution
    pub script_extension: String,
    pub scripts: ScriptRunner,
    pub listing: ListingOptions,
}

impl CaseSettings {
    fn index_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.index_file)
    }

    fn is_script_name(&self, path: &Path) -> bool {
        !self.script_extension.is_empty()
            && path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(&self.script_extension))
    }
}

impl Rule {
    pub const fn name(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::ScriptFile => "script_file",
            Self::PlainFile => "plain_file",
            Self::DirectoryWithIndex => "directory_index",
            Self::DirectoryWithoutIndex => "directory_listing",
            Self::Fallback => "fallback",
        }
    }

    pub async fn matches(self, ctx: &RequestContext, settings: &CaseSettings) -> bool {
        let path = ctx.resolved_path.as_path();
        match self {
            Self::NotFound => !exists(path).await,
            Self::ScriptFile => is_file(path).await && settings.is_script_name(path),
            Self::PlainFile => is_file(path).await,
            Self::DirectoryWithIndex => {
                is_dir(path).await && is_file(&settings.index_path(path)).await
            }
            Self::DirectoryWithoutIndex => {
                is_dir(path).await && !is_file(&settings.index_path(path)).await
            }
            Self::Fallback => true,
        }
    }

    pub async fn respond(self, ctx: &RequestContext, settings: &CaseSettings) -> Outcome {
        let path = ctx.resolved_path.as_path();
        match self {
            Self::NotFound => ServeError::NotFound {
                path: ctx.url_path.clone(),
            }
            .into(),
            Self::ScriptFile => settings.scripts.run(path, &ctx.url_path).await,
            Self::PlainFile => content::serve(path).await,
            Self::DirectoryWithIndex => content::serve(&settings.index_path(path)).await,
            Self::DirectoryWithoutIndex => listing::list(ctx, settings.listing).await,
            Self::Fallback => ServeError::UnknownObject {
                path: ctx.url_path.clone(),
            }
            .into(),
        }
    }
}

async fn exists(path: &Path) -> bool {
    fs::metadata(path).await.is_ok()
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_file())
}

async fn is_dir(path: &Path) -> bool {
    fs::metadata(path).await.is_ok_and(|m| m.is_dir())
}

/// Ordered rules plus their settings; immutable once built
#[derive(Debug, Clone)]
pub struct CaseChain {
    rules: Vec<Rule>,
    settings: CaseSettings,
}

impl CaseChain {
    /// Chain with the standard rule order
    pub fn new(settings: CaseSettings) -> Self {
        Self {
            rules: STANDARD_RULES.to_vec(),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(CaseSettings {
            index_file: config.site.index_file.clone(),
            script_extension: config.script.extension.clone(),
            scripts: ScriptRunner::new(config.script.interpreter(), config.script.timeout()),
            listing: ListingOptions {
                sort: config.site.sort_listing,
                escape: config.site.escape_listing,
            },
        })
    }

    /// Serve `ctx` with the first matching rule, returning the rule and its outcome
    pub async fn dispatch(&self, ctx: &RequestContext) -> (Rule, Outcome) {
        for &rule in &self.rules {
            if rule.matches(ctx, &self.settings).await {
                return (rule, rule.respond(ctx, &self.settings).await);
            }
        }
        // Unreachable while the chain ends in Fallback
        (
            Rule::Fallback,
            Rule::Fallback.respond(ctx, &self.settings).await,
        )
    }
}
