use crate::cli::{Cli, OutputFormat};
use crate::commands::{api_client, load_config, CommandError, Result};
use crate::console::{TerminalNavigator, TerminalNotifier};
use crate::output::{format_output, OutputData};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use stage_core::{
    Collaborators, EditSession, EntryId, FormField, LatencyPolicy, PropertyField, SessionHandle,
    SessionState, SubmitOutcome,
};
use std::sync::Arc;
use tracing::{debug, info};

pub struct EditArgs {
    pub name: Option<String>,
    pub description: Option<String>,
    pub set: Vec<(String, String)>,
    pub rename: Vec<(String, String)>,
    pub unset: Vec<String>,
    pub prune_blank: bool,
    pub dry_run: bool,
    pub no_delay: bool,
}

/// One store operation derived from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PropertyOp {
    Remove(EntryId),
    Update(EntryId, PropertyField, String),
    Append(String, String),
}

/// Where a planned row lives: already in the store, or appended by the
/// operation at this index.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Stored(EntryId),
    Pending(usize),
}

struct PlannedRow {
    slot: Slot,
    key: String,
}

fn remove_matching(rows: &mut Vec<PlannedRow>, ops: &mut Vec<PropertyOp>, matches: impl Fn(&str) -> bool) {
    rows.retain(|row| {
        if !matches(&row.key) {
            return true;
        }
        if let Slot::Stored(id) = row.slot {
            ops.push(PropertyOp::Remove(id));
        }
        false
    });
}

/// Turn renames, unsets and sets (in that order) into store operations
/// against the current rows.
fn plan_property_ops(rows: &[(EntryId, String, String)], args: &EditArgs) -> Vec<PropertyOp> {
    let mut rows: Vec<PlannedRow> = rows
        .iter()
        .map(|(id, key, _)| PlannedRow {
            slot: Slot::Stored(*id),
            key: key.clone(),
        })
        .collect();
    let mut ops = Vec::new();

    for (old, new) in &args.rename {
        for row in rows.iter_mut().filter(|r| &r.key == old) {
            if let Slot::Stored(id) = row.slot {
                ops.push(PropertyOp::Update(id, PropertyField::Key, new.clone()));
            }
            row.key = new.clone();
        }
    }

    for key in &args.unset {
        remove_matching(&mut rows, &mut ops, |k| k == key);
    }
    if args.prune_blank {
        remove_matching(&mut rows, &mut ops, |k| k.trim().is_empty());
    }

    for (key, value) in &args.set {
        // Later rows win when keys repeat, so update the last match.
        match rows.iter().rev().find(|r| &r.key == key).map(|r| r.slot) {
            Some(Slot::Stored(id)) => {
                ops.push(PropertyOp::Update(id, PropertyField::Value, value.clone()));
            }
            Some(Slot::Pending(index)) => {
                if let Some(PropertyOp::Append(_, pending)) = ops.get_mut(index) {
                    *pending = value.clone();
                }
            }
            None => {
                rows.push(PlannedRow {
                    slot: Slot::Pending(ops.len()),
                    key: key.clone(),
                });
                ops.push(PropertyOp::Append(key.clone(), value.clone()));
            }
        }
    }

    ops
}

fn spinner(format: OutputFormat) -> ProgressBar {
    if format != OutputFormat::Pretty {
        return ProgressBar::hidden();
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("Invalid progress template"),
    );
    spinner
}

pub async fn run(cli: &Cli, id: &str, args: EditArgs) -> Result<()> {
    let config = load_config(cli)?;
    let api = Arc::new(api_client(&config)?);
    let latency = if args.no_delay {
        LatencyPolicy::none()
    } else {
        config.latency_policy()
    };

    let busy = spinner(cli.output);
    let session = EditSession::new(
        id,
        Collaborators::new(
            api,
            Arc::new(TerminalNotifier::new(busy.clone())),
            Arc::new(TerminalNavigator),
        ),
    )
    .with_latency(latency)
    .with_list_path(config.list_path.clone());

    let (handle, task) = SessionHandle::spawn(session);
    let result = drive(cli, &handle, &busy, &args).await;

    drop(handle);
    if let Err(e) = task.await {
        debug!(error = %e, "edit session task ended abnormally");
    }
    result
}

async fn drive(cli: &Cli, handle: &SessionHandle, busy: &ProgressBar, args: &EditArgs) -> Result<()> {
    // The first reply arrives only after the load has settled.
    let view = handle.view().await?;
    if view.state == SessionState::LoadError {
        return Err(CommandError::LoadFailed(view.load_error.unwrap_or_default()));
    }

    if let Some(name) = &args.name {
        handle.set_field(FormField::Name, name.clone()).await?;
    }
    if let Some(description) = &args.description {
        handle.set_field(FormField::Description, description.clone()).await?;
    }

    for op in plan_property_ops(&view.properties, args) {
        debug!(?op, "applying property edit");
        match op {
            PropertyOp::Remove(id) => handle.remove(id).await?,
            PropertyOp::Update(id, field, value) => handle.update(id, field, value).await?,
            PropertyOp::Append(key, value) => {
                let id = handle.add().await?;
                handle.update(id, PropertyField::Key, key).await?;
                handle.update(id, PropertyField::Value, value).await?;
            }
        }
    }

    if args.dry_run {
        let patch = handle.patch().await?;
        return format_output(&OutputData::Patch(patch), &cli.output);
    }

    if !handle.view().await?.unsaved_changes {
        info!("no changes to the loaded destination, saving anyway");
    }

    busy.enable_steady_tick(std::time::Duration::from_millis(100));
    busy.set_message("Saving destination...");
    let outcome = handle.submit().await;
    busy.finish_and_clear();

    match outcome? {
        SubmitOutcome::Saved(destination) => {
            if cli.output != OutputFormat::Pretty {
                format_output(&OutputData::Destination(destination), &cli.output)?;
            } else {
                println!("{} {}", "Saved".green().bold(), destination.id.dimmed());
            }
            Ok(())
        }
        SubmitOutcome::Invalid => {
            let view = handle.view().await?;
            Err(CommandError::Validation(view.name_error.unwrap_or_default()))
        }
        SubmitOutcome::Failed { message } => Err(CommandError::SaveFailed(message)),
        SubmitOutcome::Cancelled => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stage_core::PropertyListStore;

    fn args() -> EditArgs {
        EditArgs {
            name: None,
            description: None,
            set: Vec::new(),
            rename: Vec::new(),
            unset: Vec::new(),
            prune_blank: false,
            dry_run: false,
            no_delay: true,
        }
    }

    fn rows(store: &PropertyListStore) -> Vec<(EntryId, String, String)> {
        store
            .entries()
            .map(|e| (e.id, e.key.to_string(), e.value.to_string()))
            .collect()
    }

    fn apply(store: &mut PropertyListStore, ops: Vec<PropertyOp>) {
        for op in ops {
            match op {
                PropertyOp::Remove(id) => store.remove(id),
                PropertyOp::Update(id, field, value) => store.update(id, field, value),
                PropertyOp::Append(key, value) => {
                    let id = store.add();
                    store.update(id, PropertyField::Key, key);
                    store.update(id, PropertyField::Value, value);
                }
            }
        }
    }

    fn store(pairs: &[(&str, &str)]) -> PropertyListStore {
        PropertyListStore::from_mapping(
            &pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_set_updates_existing_and_appends_missing() {
        let mut s = store(&[("host", "a"), ("port", "1")]);
        let mut a = args();
        a.set = vec![
            ("port".to_string(), "2".to_string()),
            ("schema".to_string(), "inv".to_string()),
        ];
        let ops = plan_property_ops(&rows(&s), &a);
        apply(&mut s, ops);

        let out = s.to_mapping();
        assert_eq!(out["port"], "2");
        assert_eq!(out["schema"], "inv");
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_rename_then_unset_then_set() {
        let mut s = store(&[("hostname", "a"), ("legacy", "x")]);
        let mut a = args();
        a.rename = vec![("hostname".to_string(), "host".to_string())];
        a.unset = vec!["legacy".to_string()];
        a.set = vec![("host".to_string(), "b".to_string())];
        let ops = plan_property_ops(&rows(&s), &a);
        apply(&mut s, ops);

        let keys: Vec<_> = s.entries().map(|e| e.key.to_string()).collect();
        assert_eq!(keys, vec!["host"]);
        assert_eq!(s.to_mapping()["host"], "b");
    }

    #[test]
    fn test_prune_blank_rows() {
        let mut s = store(&[]);
        let mut a = args();
        a.prune_blank = true;
        a.set = vec![("k".to_string(), "v".to_string())];
        let ops = plan_property_ops(&rows(&s), &a);
        apply(&mut s, ops);

        assert_eq!(s.len(), 1);
        assert_eq!(s.to_mapping().get(""), None);
    }

    #[test]
    fn test_set_twice_on_new_key_appends_once() {
        let s = store(&[("a", "1")]);
        let mut a = args();
        a.set = vec![
            ("b".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ];
        let ops = plan_property_ops(&rows(&s), &a);
        assert_eq!(
            ops,
            vec![PropertyOp::Append("b".to_string(), "2".to_string())]
        );
    }
}
