//! Merging a freshly translated table into an existing target table.
//!
//! Translators polish machine output by hand, so re-running the pipeline must
//! not throw that work away. Records are reconciled by id:
//!
//! - ids missing from the target are appended, in source order;
//! - a stale or missing `original` attribute is refreshed (always when it is
//!   missing, on request when it differs);
//! - existing `text` is only replaced when [`MergeOptions::update_changed`]
//!   is set;
//! - records only present in the target are kept as they are.
//!
//! Every change is recorded as a [`MergeEvent`] in the returned
//! [`MergeReport`].

use std::{fmt::Display, path::Path};

use serde::{Deserialize, Serialize};

use crate::{
    error::Error,
    formats::StringTableFormat,
    traits::Parser,
    types::{StringRecord, StringTable},
};

/// Policy flags for [`merge_tables`] and [`reconcile_with_path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Discard the existing target and write the source as is.
    pub replace: bool,
    /// Refresh `original` on existing records when the source text changed.
    pub update_original: bool,
    /// Also accept the new machine translation for records whose text
    /// differs. Implies `update_original`.
    pub update_changed: bool,
}

impl MergeOptions {
    /// Creates default merge options (non-destructive).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_update_original(mut self, update_original: bool) -> Self {
        self.update_original = update_original;
        self
    }

    pub fn with_update_changed(mut self, update_changed: bool) -> Self {
        self.update_changed = update_changed;
        self
    }

    /// Whether an already existing target file may be touched at all.
    pub fn allows_existing_target(&self) -> bool {
        self.replace || self.update_original || self.update_changed
    }

    fn refreshes_original(&self) -> bool {
        self.update_original || self.update_changed
    }
}

/// What happened to the target file as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOutcome {
    /// No target existed; the source was written.
    Created,
    /// `replace` was requested; the target was overwritten.
    Replaced,
    /// The target had no `strings` section and was overwritten.
    ReplacedUnrecognized,
    /// The target was reconciled record by record.
    Merged,
}

impl Display for MergeOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeOutcome::Created => write!(f, "created"),
            MergeOutcome::Replaced => write!(f, "replaced"),
            MergeOutcome::ReplacedUnrecognized => {
                write!(f, "replaced (target had no strings section)")
            }
            MergeOutcome::Merged => write!(f, "merged"),
        }
    }
}

/// A single change applied to the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MergeEvent {
    Added {
        id: String,
        text: String,
        original: Option<String>,
    },
    UpdatedOriginal {
        id: String,
        old: Option<String>,
        new: Option<String>,
    },
    UpdatedText {
        id: String,
        old: String,
        new: String,
    },
}

impl MergeEvent {
    pub fn id(&self) -> &str {
        match self {
            MergeEvent::Added { id, .. }
            | MergeEvent::UpdatedOriginal { id, .. }
            | MergeEvent::UpdatedText { id, .. } => id,
        }
    }
}

/// Renders the audit line printed for each change.
impl Display for MergeEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergeEvent::Added { id, text, .. } => write!(f, "Added {}: \"{}\"", id, text),
            MergeEvent::UpdatedOriginal { id, old, new } => write!(
                f,
                "Updated original attribute of {}: \"{}\" -> \"{}\"",
                id,
                old.as_deref().unwrap_or_default(),
                new.as_deref().unwrap_or_default()
            ),
            MergeEvent::UpdatedText { id, old, new } => write!(
                f,
                "Updated text attribute of {}: \"{}\" -> \"{}\"",
                id, old, new
            ),
        }
    }
}

/// Summary of one merge run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub outcome: MergeOutcome,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<MergeEvent>,
    /// Source records whose target counterpart was left untouched.
    pub unchanged: usize,
}

impl MergeReport {
    fn overwrite(outcome: MergeOutcome) -> Self {
        MergeReport {
            outcome,
            events: Vec::new(),
            unchanged: 0,
        }
    }

    pub fn added(&self) -> usize {
        self.count(|e| matches!(e, MergeEvent::Added { .. }))
    }

    pub fn updated(&self) -> usize {
        self.count(|e| !matches!(e, MergeEvent::Added { .. }))
    }

    fn count(&self, pred: impl Fn(&MergeEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

/// Reconciles `source` into `target` by id, in place.
///
/// `target` keeps its record order; new ids are appended in source order.
/// The `replace` flag is ignored here; see [`reconcile_with_path`].
pub fn merge_tables(
    source: &StringTable,
    target: &mut StringTable,
    options: &MergeOptions,
) -> MergeReport {
    let mut index = target.index_by_id();
    let mut report = MergeReport {
        outcome: MergeOutcome::Merged,
        events: Vec::new(),
        unchanged: 0,
    };

    for s in &source.records {
        let Some(&pos) = index.get(&s.id) else {
            tracing::debug!(id = %s.id, "adding new string");
            index.insert(s.id.clone(), target.records.len());
            target.records.push(StringRecord {
                id: s.id.clone(),
                text: s.text.clone(),
                original: s.original.clone(),
                extra: Default::default(),
            });
            report.events.push(MergeEvent::Added {
                id: s.id.clone(),
                text: s.text.clone(),
                original: s.original.clone(),
            });
            continue;
        };

        let t = &mut target.records[pos];
        let mut touched = false;

        // A source without an original has nothing to refresh from.
        let original_missing = t.original_or_empty().is_empty();
        if s.original.is_some()
            && t.original != s.original
            && (options.refreshes_original() || original_missing)
        {
            let old = std::mem::replace(&mut t.original, s.original.clone());
            report.events.push(MergeEvent::UpdatedOriginal {
                id: s.id.clone(),
                old,
                new: s.original.clone(),
            });
            touched = true;
        }

        if options.update_changed && t.text != s.text {
            let old = std::mem::replace(&mut t.text, s.text.clone());
            report.events.push(MergeEvent::UpdatedText {
                id: s.id.clone(),
                old,
                new: s.text.clone(),
            });
            touched = true;
        }

        if !touched {
            report.unchanged += 1;
        }
    }

    target.set_language(source.metadata.language.clone());
    report
}

/// Applies the full merge policy against whatever is at `target_path` and
/// returns the table to persist together with the report. Nothing is written.
///
/// The source wins outright when `replace` is set, when nothing exists at
/// `target_path`, or when the target has no `strings` section. Otherwise the
/// target is reconciled with [`merge_tables`]. A target that is not
/// well-formed XML is an error, never overwritten.
pub fn reconcile_with_path(
    source: &StringTable,
    target_path: &Path,
    options: &MergeOptions,
) -> Result<(StringTable, MergeReport), Error> {
    if options.replace && target_path.exists() {
        return Ok((source.clone(), MergeReport::overwrite(MergeOutcome::Replaced)));
    }
    if !target_path.is_file() {
        return Ok((source.clone(), MergeReport::overwrite(MergeOutcome::Created)));
    }

    let Some(mut target) = StringTableFormat::read_from(target_path)?.into_partial_table()? else {
        tracing::warn!(
            path = %target_path.display(),
            "target has no strings section, overwriting"
        );
        return Ok((
            source.clone(),
            MergeReport::overwrite(MergeOutcome::ReplacedUnrecognized),
        ));
    };

    let report = merge_tables(source, &mut target, options);
    Ok((target, report))
}

/// [`reconcile_with_path`] followed by writing the result to `target_path`.
pub fn merge_into_path(
    source: &StringTable,
    target_path: &Path,
    options: &MergeOptions,
) -> Result<MergeReport, Error> {
    let (table, report) = reconcile_with_path(source, target_path, options)?;
    table.write_to(target_path)?;
    Ok(report)
}
