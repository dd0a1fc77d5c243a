//! The user-triggered operations on saved groups.
//!
//! Every action reads the whole collection, normalizes it, computes the next
//! collection in memory, writes it back and reports a [`Status`]. Nothing is
//! cached between calls; the store is the only source of truth. Actions are
//! not serialized against each other, so two overlapping actions can lose one
//! of their writes.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::future::join_all;
use log::{debug, info, warn};
use serde::Serialize;

use crate::config::Settings;
use crate::error::ActionError;
use crate::ids::GroupIdGenerator;
use crate::models::group::{Group, Summary};
use crate::reconciler::{normalize, summarize, unique_urls};
use crate::status::Status;
use crate::store::GroupStore;
use crate::tabs::TabHost;
use crate::validator::{display_hostname, is_restorable, is_restorable_url};

const NO_RESTORABLE_TABS: &str = "No restorable tabs found in this window.";
const SAVE_FAILED: &str = "Something went wrong while saving tabs.";
const CANNOT_ADD_CURRENT: &str = "Current tab cannot be added to a group.";
const ALREADY_IN_GROUP: &str = "This tab is already in the group.";
const ADD_FAILED: &str = "Failed to add current tab.";
const EMPTY_NAME: &str = "Group name cannot be empty.";
const RENAME_FAILED: &str = "Failed to rename group.";
const ALREADY_OPEN: &str = "All tabs in this group are already open.";
const OPEN_FAILED: &str = "Unable to open tabs from this group.";
const NOTHING_REMOVED: &str = "That tab is no longer in the group.";
const REMOVE_FAILED: &str = "Failed to remove tab from group.";
const DELETE_FAILED: &str = "Failed to delete tab group.";
const LOAD_FAILED: &str = "Unable to load saved groups.";

/// Everything an action needs, handed in per call.
#[derive(Clone)]
pub struct ActionContext {
    pub store: Arc<dyn GroupStore>,
    pub tabs: Arc<dyn TabHost>,
    pub ids: Arc<GroupIdGenerator>,
    pub open_grace_period: Duration,
}

impl ActionContext {
    pub fn new(store: Arc<dyn GroupStore>, tabs: Arc<dyn TabHost>, settings: &Settings) -> Self {
        ActionContext {
            store,
            tabs,
            ids: Arc::new(GroupIdGenerator::new()),
            open_grace_period: settings.open_grace_period(),
        }
    }

    pub fn with_ids(mut self, ids: GroupIdGenerator) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    async fn load(&self) -> Result<Vec<Group>, ActionError> {
        Ok(normalize(self.store.read().await?))
    }
}

fn finish(action: &str, result: Result<Status, ActionError>, fallback: &str) -> Status {
    match result {
        Ok(status) => {
            info!("{}: {}", action, status.message);
            status
        }
        Err(e) => {
            warn!("{} failed: {}", action, e);
            Status::from_action_error(&e, fallback)
        }
    }
}

/// `Group 3 (14:05)`
pub fn group_label(ordinal: usize, at: DateTime<Local>) -> String {
    format!("Group {} ({})", ordinal, at.format("%H:%M"))
}

/// Saves the restorable tabs of the invoking window as a new group.
pub async fn save_current(ctx: &ActionContext) -> Status {
    finish("save-current", try_save_current(ctx).await, SAVE_FAILED)
}

async fn try_save_current(ctx: &ActionContext) -> Result<Status, ActionError> {
    let urls: Vec<String> = ctx
        .tabs
        .window_tabs()
        .await?
        .into_iter()
        .filter(|tab| is_restorable(tab.url.as_deref()))
        .filter_map(|tab| tab.url)
        .collect();
    if urls.is_empty() {
        return Err(ActionError::Validation(NO_RESTORABLE_TABS));
    }

    let mut groups = ctx.load().await?;
    let id = ctx.ids.next_id(&groups);
    let name = group_label(groups.len() + 1, Local::now());
    debug!("Saving group {} \"{}\" with {} urls", id, name, urls.len());
    groups.push(Group { id, name, urls });
    ctx.store.write(&groups).await?;
    Ok(Status::success("Tab group saved."))
}

/// Appends the active tab's url to group `id`.
pub async fn add_current_to_group(ctx: &ActionContext, id: i64) -> Status {
    finish("add-current", try_add_current_to_group(ctx, id).await, ADD_FAILED)
}

async fn try_add_current_to_group(ctx: &ActionContext, id: i64) -> Result<Status, ActionError> {
    let url = ctx.tabs.active_tab().await?.and_then(|tab| tab.url);
    let url = match url {
        Some(url) if is_restorable_url(&url) => url,
        _ => return Err(ActionError::Validation(CANNOT_ADD_CURRENT)),
    };

    let mut groups = ctx.load().await?;
    let group = groups
        .iter_mut()
        .find(|group| group.id == id)
        .ok_or(ActionError::NotFound(id))?;
    if group.urls.contains(&url) {
        return Err(ActionError::Duplicate(ALREADY_IN_GROUP));
    }
    group.urls.push(url);
    ctx.store.write(&groups).await?;
    Ok(Status::success("Current tab added to group."))
}

/// Renames group `id` to the trimmed `candidate`. Unknown ids are a no-op.
pub async fn rename_group(ctx: &ActionContext, id: i64, candidate: &str) -> Status {
    finish("rename", try_rename_group(ctx, id, candidate).await, RENAME_FAILED)
}

async fn try_rename_group(ctx: &ActionContext, id: i64, candidate: &str) -> Result<Status, ActionError> {
    let name = candidate.trim();
    if name.is_empty() {
        return Err(ActionError::Validation(EMPTY_NAME));
    }

    let mut groups = ctx.load().await?;
    match groups.iter_mut().find(|group| group.id == id) {
        Some(group) => group.name = name.to_string(),
        None => debug!("Rename target {} is gone, nothing to rename", id),
    }
    ctx.store.write(&groups).await?;
    Ok(Status::success("Group renamed."))
}

/// Opens the group's urls that are not already open in any window.
pub async fn open_group(ctx: &ActionContext, id: i64) -> Status {
    finish("open", try_open_group(ctx, id).await, OPEN_FAILED)
}

async fn try_open_group(ctx: &ActionContext, id: i64) -> Result<Status, ActionError> {
    let groups = ctx.load().await?;
    let group = groups
        .iter()
        .find(|group| group.id == id)
        .ok_or(ActionError::NotFound(id))?;
    let unique = unique_urls(group);
    let unique_count = unique.len();

    let already_open: HashSet<String> = ctx
        .tabs
        .all_tabs()
        .await?
        .into_iter()
        .filter_map(|tab| tab.url)
        .collect();
    let to_open: Vec<String> = unique
        .into_iter()
        .filter(|url| !already_open.contains(url))
        .collect();
    let skipped = unique_count - to_open.len();

    if to_open.is_empty() {
        return Ok(Status::info(ALREADY_OPEN));
    }
    let opened = open_best_effort(ctx, to_open).await;
    Ok(open_report(opened, skipped))
}

/// Tries every url concurrently and counts the tabs created by the time all
/// attempts settle or the grace period runs out, whichever comes first.
/// Attempts still pending at that point keep running in the background.
async fn open_best_effort(ctx: &ActionContext, urls: Vec<String>) -> usize {
    let opened = Arc::new(AtomicUsize::new(0));
    let tabs = ctx.tabs.clone();
    let counter = opened.clone();
    let attempts = tokio::spawn(async move {
        join_all(urls.iter().map(|url| {
            let tabs = &tabs;
            let counter = &counter;
            async move {
                match tabs.create_tab(url).await {
                    Ok(()) => {
                        counter.fetch_add(1, Ordering::SeqCst);
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        }))
        .await;
    });
    match tokio::time::timeout(ctx.open_grace_period, attempts).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("Tab creation task failed: {}", e),
        Err(_) => warn!(
            "Tab creation still pending after {:?}, reporting what settled",
            ctx.open_grace_period
        ),
    }
    opened.load(Ordering::SeqCst)
}

pub fn open_report(opened: usize, skipped: usize) -> Status {
    if opened == 0 {
        return Status::error(OPEN_FAILED);
    }
    let mut message = format!("Opened {} tab{}.", opened, if opened == 1 { "" } else { "s" });
    if skipped > 0 {
        message.push_str(&format!(" Skipped {} already open.", skipped));
    }
    Status::success(message)
}

/// Removes the entry at `position` in group `id`, dropping the group if that
/// was its last url. Works by position because a group may hold the same url twice.
pub async fn remove_url_from_group(ctx: &ActionContext, id: i64, position: usize) -> Status {
    finish("remove-url", try_remove_url_from_group(ctx, id, position).await, REMOVE_FAILED)
}

async fn try_remove_url_from_group(ctx: &ActionContext, id: i64, position: usize) -> Result<Status, ActionError> {
    let mut groups = ctx.load().await?;
    let mut removed = false;
    match groups.iter_mut().find(|group| group.id == id) {
        Some(group) if position < group.urls.len() => {
            group.urls.remove(position);
            removed = true;
        }
        Some(_) => debug!("Group {} has no url at position {}", id, position),
        None => debug!("Remove target {} is gone", id),
    }
    groups.retain(|group| !group.urls.is_empty());
    ctx.store.write(&groups).await?;
    if removed {
        Ok(Status::success("Tab removed from group."))
    } else {
        Ok(Status::info(NOTHING_REMOVED))
    }
}

/// Deletes group `id`; the collection is written back even if it was absent.
pub async fn delete_group(ctx: &ActionContext, id: i64) -> Status {
    finish("delete", try_delete_group(ctx, id).await, DELETE_FAILED)
}

async fn try_delete_group(ctx: &ActionContext, id: i64) -> Result<Status, ActionError> {
    let mut groups = ctx.load().await?;
    groups.retain(|group| group.id != id);
    ctx.store.write(&groups).await?;
    Ok(Status::success("Tab group deleted."))
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LinkView {
    pub position: usize,
    pub url: String,
    pub label: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct GroupView {
    pub id: i64,
    pub name: String,
    pub links: Vec<LinkView>,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        GroupView {
            id: group.id,
            name: group.name.clone(),
            links: group
                .urls
                .iter()
                .enumerate()
                .map(|(position, url)| LinkView {
                    position,
                    url: url.clone(),
                    label: display_hostname(url),
                })
                .collect(),
        }
    }
}

/// What the saved-groups list shows.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Overview {
    pub groups: Vec<GroupView>,
    pub summary: Summary,
    pub status: Option<Status>,
}

/// Normalized view of the stored groups. Read-only.
pub async fn overview(ctx: &ActionContext) -> Overview {
    match ctx.load().await {
        Ok(groups) => Overview {
            groups: groups.iter().map(GroupView::from).collect(),
            summary: summarize(&groups),
            status: None,
        },
        Err(e) => {
            warn!("overview failed: {}", e);
            Overview {
                groups: Vec::new(),
                summary: Summary::default(),
                status: Some(Status::error(LOAD_FAILED)),
            }
        }
    }
}
