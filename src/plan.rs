//! Fold a finished tree into the proposed actions and the omitted entries.

use crate::types::{Action, File, Omit, Verdict, join_rel};

/// Pre-order: a node, then its descendants, then its next sibling.
///
/// `filter` (when given) gates both the action on a node and the descent into it.
pub fn walk_descending<'a>(
    files: &'a [File],
    filter: Option<&dyn Fn(&File) -> bool>,
    action: &mut dyn FnMut(&'a File),
) {
    for file in files {
        if filter.is_none_or(|f| f(file)) {
            action(file);
            walk_descending(&file.contents, filter, action);
        }
    }
}

/// Post-order: a node's descendants, then the node, then its next sibling.
///
/// `filter` (when given) gates both the action on a node and the descent into it.
pub fn walk_ascending<'a>(
    files: &'a [File],
    filter: Option<&dyn Fn(&File) -> bool>,
    action: &mut dyn FnMut(&'a File),
) {
    for file in files {
        if filter.is_none_or(|f| f(file)) {
            walk_ascending(&file.contents, filter, action);
            action(file);
        }
    }
}

/// Renames to perform, children before their parents.
///
/// Both paths use the original parent, so executing the list in order renames every entry
/// while its ancestors still carry their original names.
pub fn build_actions(files: &[File]) -> Vec<Action> {
    let mut actions = Vec::new();
    let matched: &dyn Fn(&File) -> bool = &|file: &File| file.verdict == Verdict::Matched;
    walk_ascending(files, Some(matched), &mut |file| {
        if file.actionable() {
            actions.push(Action {
                old_path: join_rel(&file.parent, &file.name),
                new_path: join_rel(&file.parent, &file.new_name),
            });
        }
    });
    actions
}

/// Every scanned entry whose pattern did not match, ancestors first.
///
/// Descent is unconditional. Entries at depths without a pattern are neither actions nor omits.
pub fn build_omitted(files: &[File]) -> Vec<Omit> {
    let mut omitted = Vec::new();
    walk_descending(files, None, &mut |file| {
        if file.verdict == Verdict::NotMatched {
            omitted.push(Omit { path: file.path() });
        }
    });
    omitted
}
