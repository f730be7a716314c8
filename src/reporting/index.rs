//! Lookup indexes over the raw collections.
//!
//! Built once per data refresh so row decoration joins in O(1) instead
//! of scanning the collections per row.

use std::collections::HashMap;

use crate::client::dto::PhotoRow;
use crate::domain::{CatalogItem, Photo, Project, User, WorkLogItem};

/// Catalog entries keyed by id.
pub fn catalog_by_id(catalog: &[CatalogItem]) -> HashMap<i64, &CatalogItem> {
    catalog.iter().map(|c| (c.id, c)).collect()
}

/// Projects keyed by id.
pub fn projects_by_id(projects: &[Project]) -> HashMap<i64, &Project> {
    projects.iter().map(|p| (p.id, p)).collect()
}

/// Resolved technician display names keyed by user id.
pub fn user_name_by_id(users: &[User]) -> HashMap<i64, String> {
    users.iter().map(|u| (u.id, u.display_name())).collect()
}

/// Line items grouped by parent work-log id. Items without a positive
/// parent id are orphans and are dropped.
pub fn items_by_log(items: &[WorkLogItem]) -> HashMap<i64, Vec<&WorkLogItem>> {
    let mut map: HashMap<i64, Vec<&WorkLogItem>> = HashMap::new();
    for item in items {
        let Some(log_id) = item.work_logs_id.filter(|id| *id > 0) else {
            continue;
        };
        map.entry(log_id).or_default().push(item);
    }
    map
}

/// Photos grouped by parent work-log id, unwrapping the nested shape
/// and dropping rows without a usable URL.
pub fn photos_by_log(rows: Vec<PhotoRow>) -> HashMap<i64, Vec<Photo>> {
    let mut map: HashMap<i64, Vec<Photo>> = HashMap::new();
    for row in rows {
        if let Some((log_id, photo)) = row.into_photo() {
            map.entry(log_id).or_default().push(photo);
        }
    }
    map
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: i64, parent: Option<i64>) -> WorkLogItem {
        WorkLogItem {
            id,
            work_logs_id: parent,
            ..Default::default()
        }
    }

    #[test]
    fn items_group_by_parent_and_keep_input_order() {
        let items = vec![item(1, Some(10)), item(2, Some(20)), item(3, Some(10))];
        let map = items_by_log(&items);
        let ids: Vec<i64> = map[&10].iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(map[&20].len(), 1);
    }

    #[test]
    fn orphan_items_are_dropped() {
        let items = vec![item(1, None), item(2, Some(0)), item(3, Some(-4))];
        assert!(items_by_log(&items).is_empty());
    }

    #[test]
    fn photos_group_and_drop_unusable_rows() {
        let rows: Vec<PhotoRow> = serde_json::from_value(json!([
            {"work_logs_id": 7, "id": 1, "url": "https://f/1.jpg"},
            {"work_logs_id": 7, "photo": {"id": 2, "url": "https://f/2.jpg"}},
            {"work_logs_id": 7, "id": 3},
            {"work_logs_id": 0, "id": 4, "url": "https://f/4.jpg"},
        ]))
        .unwrap();
        let map = photos_by_log(rows);
        assert_eq!(map[&7].len(), 2);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn user_names_resolve_through_the_display_chain() {
        let users = vec![
            User {
                id: 1,
                name: Some("Mario R.".into()),
                ..Default::default()
            },
            User {
                id: 2,
                ..Default::default()
            },
        ];
        let names = user_name_by_id(&users);
        assert_eq!(names[&1], "Mario R.");
        assert_eq!(names[&2], "Tecnico #2");
    }
}
