//! Pure query helpers over checkpoint lists: filter, sort and formatting.

use super::filter::{SortField, SortOrder};
use super::model::Checkpoint;
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_MAX_AGE_DAYS: i64 = 30;

const SIZE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

pub fn default_max_age() -> Duration {
    Duration::days(DEFAULT_MAX_AGE_DAYS)
}

/// Keeps checkpoints that match the search text AND carry every requested tag.
///
/// The search is a case-insensitive substring match against the name or the
/// description. With no search text and no tags the input comes back as is.
pub fn filter_checkpoints(
    items: &[Checkpoint],
    search: Option<&str>,
    tags: &[String],
) -> Vec<Checkpoint> {
    let needle = search
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase());

    if needle.is_none() && tags.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|checkpoint| {
            let text_match = match &needle {
                None => true,
                Some(needle) => {
                    checkpoint.name.to_lowercase().contains(needle)
                        || checkpoint
                            .description
                            .as_ref()
                            .is_some_and(|d| d.to_lowercase().contains(needle))
                }
            };
            text_match && tags.iter().all(|tag| checkpoint.has_tag(tag))
        })
        .cloned()
        .collect()
}

/// Sort key extracted per field. Keys of one field always share a variant.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Bytes(i64),
    Rank(u8),
    Time(DateTime<Utc>),
}

fn sort_key(checkpoint: &Checkpoint, field: SortField) -> SortKey {
    match field {
        SortField::Name => SortKey::Text(checkpoint.name.to_lowercase()),
        SortField::Size => SortKey::Bytes(checkpoint.compressed_size),
        SortField::Priority => SortKey::Rank(checkpoint.priority.rank()),
        SortField::CreatedAt => SortKey::Time(checkpoint.created_at),
    }
}

/// Returns a sorted copy. Ascending order is stable; descending is its exact
/// reverse.
pub fn sort_checkpoints(items: &[Checkpoint], sort_by: SortField, order: SortOrder) -> Vec<Checkpoint> {
    let mut sorted = items.to_vec();
    sorted.sort_by_cached_key(|checkpoint| sort_key(checkpoint, sort_by));
    if order == SortOrder::Desc {
        sorted.reverse();
    }
    sorted
}

/// Human-readable size, one decimal, scaled up to GB at most.
///
/// Negative values are never scaled.
pub fn format_checkpoint_size(bytes: i64) -> String {
    let mut size = bytes as f64;
    let mut unit = 0;

    while size >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", size, SIZE_UNITS[unit])
}

/// Relative age such as `"5m ago"`; older than the default max age falls back
/// to the calendar date.
pub fn format_checkpoint_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now - created_at;

    if age < Duration::minutes(1) {
        "just now".to_string()
    } else if age < Duration::hours(1) {
        format!("{}m ago", age.num_minutes())
    } else if age < Duration::days(1) {
        format!("{}h ago", age.num_hours())
    } else if age < default_max_age() {
        format!("{}d ago", age.num_days())
    } else {
        created_at.format("%Y-%m-%d").to_string()
    }
}

/// One-line description used by list views and the CLI.
pub fn checkpoint_summary(checkpoint: &Checkpoint) -> String {
    let mut line = format!(
        "{} [{}] {}",
        checkpoint.name,
        checkpoint.priority,
        format_checkpoint_size(checkpoint.compressed_size)
    );
    for tag in &checkpoint.tags {
        line.push_str(" #");
        line.push_str(tag);
    }
    if checkpoint.is_auto_generated {
        line.push_str(" (auto)");
    }
    line
}

/// True when the checkpoint is strictly older than `max_age`.
pub fn is_checkpoint_expired(checkpoint: &Checkpoint, max_age: Duration, now: DateTime<Utc>) -> bool {
    now - checkpoint.created_at > max_age
}

/// compressed / uncompressed, or `None` for an empty payload.
pub fn compression_ratio(checkpoint: &Checkpoint) -> Option<f64> {
    if checkpoint.uncompressed_size <= 0 {
        return None;
    }
    Some(checkpoint.compressed_size as f64 / checkpoint.uncompressed_size as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::CheckpointPriority;
    use chrono::TimeZone;

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn checkpoint(
        name: &str,
        description: Option<&str>,
        tags: &[&str],
        priority: CheckpointPriority,
        size: i64,
        day: i64,
    ) -> Checkpoint {
        Checkpoint {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: "session-1".to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            priority,
            created_at: base_time() + Duration::days(day),
            compressed_size: size,
            uncompressed_size: size * 4,
            is_auto_generated: false,
            metadata: serde_json::Value::Null,
        }
    }

    fn fixtures() -> Vec<Checkpoint> {
        let mut auto = checkpoint("Auto checkpoint", None, &[], CheckpointPriority::Medium, 100, 4);
        auto.is_auto_generated = true;
        vec![
            checkpoint(
                "Database Migration",
                Some("Schema v2 rollout"),
                &["database", "migration", "critical"],
                CheckpointPriority::High,
                2048,
                0,
            ),
            checkpoint("Database Fix", None, &["database", "bugfix"], CheckpointPriority::Medium, 1024, 1),
            checkpoint(
                "UI Refresh",
                Some("Refresh the dashboard layout"),
                &["frontend"],
                CheckpointPriority::Low,
                512,
                2,
            ),
            checkpoint(
                "Auth Flow",
                Some("Switch login to OAuth"),
                &["auth", "migration"],
                CheckpointPriority::High,
                4096,
                3,
            ),
            auto,
        ]
    }

    fn names(items: &[Checkpoint]) -> Vec<&str> {
        items.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_filter_without_criteria_returns_everything() {
        let items = fixtures();
        assert_eq!(filter_checkpoints(&items, None, &[]), items);
        assert_eq!(filter_checkpoints(&items, Some(""), &[]), items);
    }

    #[test]
    fn test_filter_tags_use_and_semantics() {
        let items = fixtures();
        let tags = vec!["database".to_string(), "migration".to_string()];
        let result = filter_checkpoints(&items, Some(""), &tags);
        assert_eq!(names(&result), vec!["Database Migration"]);
    }

    #[test]
    fn test_filter_search_matches_name_or_description() {
        let items = fixtures();
        assert_eq!(
            names(&filter_checkpoints(&items, Some("DATABASE"), &[])),
            vec!["Database Migration", "Database Fix"]
        );
        assert_eq!(
            names(&filter_checkpoints(&items, Some("dashboard"), &[])),
            vec!["UI Refresh"]
        );
        assert!(filter_checkpoints(&items, Some("nothing like this"), &[]).is_empty());
    }

    #[test]
    fn test_filter_combines_search_and_tags() {
        let items = fixtures();
        let tags = vec!["migration".to_string()];
        assert_eq!(
            names(&filter_checkpoints(&items, Some("oauth"), &tags)),
            vec!["Auth Flow"]
        );
    }

    #[test]
    fn test_sort_by_name() {
        let items = fixtures();
        let asc = sort_checkpoints(&items, SortField::Name, SortOrder::Asc);
        assert_eq!(
            names(&asc),
            vec!["Auth Flow", "Auto checkpoint", "Database Fix", "Database Migration", "UI Refresh"]
        );

        let mut desc = sort_checkpoints(&items, SortField::Name, SortOrder::Desc);
        desc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let items = fixtures();
        let before = items.clone();
        let _ = sort_checkpoints(&items, SortField::Size, SortOrder::Asc);
        assert_eq!(items, before);
    }

    #[test]
    fn test_sort_by_size_priority_and_date() {
        let items = fixtures();
        assert_eq!(
            names(&sort_checkpoints(&items, SortField::Size, SortOrder::Asc)),
            vec!["Auto checkpoint", "UI Refresh", "Database Fix", "Database Migration", "Auth Flow"]
        );

        // stable: equal ranks keep input order
        assert_eq!(
            names(&sort_checkpoints(&items, SortField::Priority, SortOrder::Asc)),
            vec!["UI Refresh", "Database Fix", "Auto checkpoint", "Database Migration", "Auth Flow"]
        );

        assert_eq!(
            names(&sort_checkpoints(&items, SortField::CreatedAt, SortOrder::Desc))[0],
            "Auto checkpoint"
        );
    }

    #[test]
    fn test_format_size_boundaries() {
        assert_eq!(format_checkpoint_size(0), "0.0 B");
        assert_eq!(format_checkpoint_size(1023), "1023.0 B");
        assert_eq!(format_checkpoint_size(1024), "1.0 KB");
        assert_eq!(format_checkpoint_size(1536), "1.5 KB");
        assert_eq!(format_checkpoint_size(1024 * 1024), "1.0 MB");
        assert_eq!(format_checkpoint_size(1024 * 1024 * 1024), "1.0 GB");
        assert_eq!(format_checkpoint_size(1024_i64.pow(4)), "1024.0 GB");
        assert_eq!(format_checkpoint_size(-1024), "-1024.0 B");
    }

    #[test]
    fn test_expiry_is_strict() {
        let now = base_time() + Duration::days(40);
        let max_age = default_max_age();

        let mut item = fixtures().remove(0);
        item.created_at = now - max_age;
        assert!(!is_checkpoint_expired(&item, max_age, now));

        item.created_at = now - max_age - Duration::milliseconds(1);
        assert!(is_checkpoint_expired(&item, max_age, now));

        item.created_at = now;
        assert!(!is_checkpoint_expired(&item, max_age, now));
    }

    #[test]
    fn test_format_age() {
        let now = base_time();
        assert_eq!(format_checkpoint_age(now - Duration::seconds(30), now), "just now");
        assert_eq!(format_checkpoint_age(now + Duration::seconds(30), now), "just now");
        assert_eq!(format_checkpoint_age(now - Duration::minutes(5), now), "5m ago");
        assert_eq!(format_checkpoint_age(now - Duration::hours(3), now), "3h ago");
        assert_eq!(format_checkpoint_age(now - Duration::days(2), now), "2d ago");
        assert_eq!(format_checkpoint_age(now - Duration::days(45), now), "2024-01-16");
    }

    #[test]
    fn test_summary_and_ratio() {
        let items = fixtures();
        assert_eq!(
            checkpoint_summary(&items[0]),
            "Database Migration [high] 2.0 KB #database #migration #critical"
        );
        assert_eq!(checkpoint_summary(&items[4]), "Auto checkpoint [medium] 100.0 B (auto)");
        assert_eq!(compression_ratio(&items[0]), Some(0.25));

        let mut empty = items[0].clone();
        empty.uncompressed_size = 0;
        assert_eq!(compression_ratio(&empty), None);
    }
}
