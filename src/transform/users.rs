//! User dimension aggregation
//!
//! Groups play events by `userId`. Each descriptive field takes the smallest
//! value under byte-wise string ordering seen for that user, ignoring nulls.
//! This is not "latest level"; a user who upgraded from `free` to `paid`
//! is reported as `free`.

use crate::source::LogEvent;
use crate::warehouse::UserRecord;
use rayon::prelude::*;
use std::collections::HashMap;

type UserGroups = HashMap<Option<String>, UserRecord>;

/// One row per distinct user id, sorted by user id
///
/// Events without a user id form a single group with a null `user_id`.
pub fn aggregate_users(events: &[LogEvent]) -> Vec<UserRecord> {
    let groups = events
        .par_iter()
        .fold(UserGroups::new, |mut groups, event| {
            let row = groups
                .entry(event.user_id.clone())
                .or_insert_with(|| UserRecord {
                    user_id: event.user_id.clone(),
                    ..Default::default()
                });
            min_into(&mut row.first_name, event.first_name.as_deref());
            min_into(&mut row.last_name, event.last_name.as_deref());
            min_into(&mut row.gender, event.gender.as_deref());
            min_into(&mut row.level, event.level.as_deref());
            groups
        })
        .reduce(UserGroups::new, merge_groups);

    let mut users: Vec<UserRecord> = groups.into_values().collect();
    users.sort_by(|a, b| a.user_id.cmp(&b.user_id));
    users
}

fn merge_groups(mut left: UserGroups, right: UserGroups) -> UserGroups {
    for (key, row) in right {
        match left.get_mut(&key) {
            Some(existing) => {
                min_into(&mut existing.first_name, row.first_name.as_deref());
                min_into(&mut existing.last_name, row.last_name.as_deref());
                min_into(&mut existing.gender, row.gender.as_deref());
                min_into(&mut existing.level, row.level.as_deref());
            }
            None => {
                left.insert(key, row);
            }
        }
    }
    left
}

fn min_into(current: &mut Option<String>, candidate: Option<&str>) {
    let Some(candidate) = candidate else {
        return;
    };
    let smaller = match current.as_deref() {
        Some(existing) => candidate < existing,
        None => true,
    };
    if smaller {
        *current = Some(candidate.to_string());
    }
}
