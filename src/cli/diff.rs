//! Diff command handler.
//!
//! Implements the `diff` subcommand for comparing two rendered revisions.

use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;

use crate::alter::AlterPipeline;
use crate::error::WikiDiffError;
use crate::cli::exit_codes;
use crate::config::ChangesConfig;
use crate::diff::markup::{BASE_CLASS, DIFF_CLASS};
use crate::diff::{markup, HtmlDiffer, StructuralDiffer};
use crate::dom::DomTree;
use crate::model::{CacheMetadata, ChangeArtifact};

/// Output format for the diff command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum DiffOutputFormat {
    /// The normalized HTML fragment.
    #[default]
    Html,
    /// A JSON change artifact (html + cache metadata).
    Json,
}

/// Configuration for one `diff` invocation.
#[derive(Debug, Clone)]
pub struct DiffCommandConfig {
    /// Path to the older rendered revision.
    pub old: PathBuf,
    /// Path to the newer rendered revision.
    pub new: PathBuf,
    /// Emit the raw engine output without running the alteration pipeline.
    pub raw: bool,
    /// Keep link-target-only changes highlighted instead of suppressing them.
    pub keep_href_changes: bool,
    pub format: DiffOutputFormat,
}

/// Run the diff command, returning the desired exit code.
///
/// The caller is responsible for calling `std::process::exit()` with the
/// returned code when it is non-zero.
pub fn run_diff(config: &DiffCommandConfig) -> Result<i32> {
    let old_html =
        fs::read_to_string(&config.old).map_err(|err| WikiDiffError::io(&config.old, err))?;
    let new_html =
        fs::read_to_string(&config.new).map_err(|err| WikiDiffError::io(&config.new, err))?;

    let changes_config =
        ChangesConfig::default().with_suppress_href_only(!config.keep_href_changes);

    let differ = StructuralDiffer::new();
    let mut tree = differ.diff(&old_html, &new_html);

    if !config.raw {
        AlterPipeline::standard(&changes_config).run(&mut tree);
    }

    let changed = has_changes(&tree);
    let fragment = if config.raw {
        tree.to_html()
    } else {
        format!("<div class=\"{BASE_CLASS}\">{}</div>", tree.to_html())
    };

    match config.format {
        DiffOutputFormat::Html => println!("{fragment}"),
        DiffOutputFormat::Json => {
            let artifact = ChangeArtifact::new(fragment, CacheMetadata::default());
            println!("{}", serde_json::to_string_pretty(&artifact)?);
        }
    }

    Ok(if changed {
        exit_codes::CHANGES
    } else {
        exit_codes::NO_CHANGES
    })
}

/// Whether the tree carries any change marker, raw or stable.
fn has_changes(tree: &DomTree) -> bool {
    tree.descendants(tree.root()).into_iter().any(|id| {
        markup::marker_kind(tree, id).is_some() || tree.has_class(id, DIFF_CLASS)
    })
}
