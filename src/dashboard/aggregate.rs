//! Pure aggregations over the user record export
//!
//! These are presentation-layer rollups for the dashboard; none of them
//! touch the store directly.

use crate::db::{ActivityKind, UserRecord};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline totals across every user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub users: usize,
    pub searches: usize,
    pub chats: usize,
    pub files: usize,
}

pub fn totals(users: &[UserRecord]) -> Totals {
    Totals {
        users: users.len(),
        searches: users.iter().map(|u| u.searches.len()).sum(),
        chats: users.iter().map(|u| u.chats.len()).sum(),
        files: users.iter().map(|u| u.files.len()).sum(),
    }
}

/// Activity count for one day and one activity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub kind: ActivityKind,
    pub count: usize,
}

/// Per-day activity counts within the date range (inclusive), ordered by
/// date, then search/chat/file. Days with no activity are omitted.
pub fn daily_counts(users: &[UserRecord], from: NaiveDate, to: NaiveDate) -> Vec<DailyCount> {
    let mut buckets: BTreeMap<(NaiveDate, u8), usize> = BTreeMap::new();
    for (kind, timestamp) in all_activity(users) {
        let date = timestamp.date_naive();
        if date >= from && date <= to {
            *buckets.entry((date, kind_order(kind))).or_default() += 1;
        }
    }

    buckets
        .into_iter()
        .map(|((date, order), count)| DailyCount {
            date,
            kind: kind_from_order(order),
            count,
        })
        .collect()
}

/// Share of each activity type within the date range
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub searches: usize,
    pub chats: usize,
    pub files: usize,
}

pub fn distribution(users: &[UserRecord], from: NaiveDate, to: NaiveDate) -> Distribution {
    let mut dist = Distribution {
        searches: 0,
        chats: 0,
        files: 0,
    };
    for (kind, timestamp) in all_activity(users) {
        let date = timestamp.date_naive();
        if date < from || date > to {
            continue;
        }
        match kind {
            ActivityKind::Search => dist.searches += 1,
            ActivityKind::Chat => dist.chats += 1,
            ActivityKind::File => dist.files += 1,
        }
    }
    dist
}

/// Per-user activity counts, for the engagement distribution
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserEngagement {
    pub identity: i64,
    pub searches: usize,
    pub chats: usize,
    pub files: usize,
}

pub fn engagement(users: &[UserRecord]) -> Vec<UserEngagement> {
    users
        .iter()
        .map(|u| UserEngagement {
            identity: u.identity,
            searches: u.searches.len(),
            chats: u.chats.len(),
            files: u.files.len(),
        })
        .collect()
}

fn all_activity(
    users: &[UserRecord],
) -> impl Iterator<Item = (ActivityKind, DateTime<Utc>)> + '_ {
    users.iter().flat_map(|u| {
        let searches = u
            .searches
            .iter()
            .map(|e| (ActivityKind::Search, e.timestamp));
        let chats = u.chats.iter().map(|e| (ActivityKind::Chat, e.timestamp));
        let files = u.files.iter().map(|e| (ActivityKind::File, e.timestamp));
        searches.chain(chats).chain(files)
    })
}

fn kind_order(kind: ActivityKind) -> u8 {
    match kind {
        ActivityKind::Search => 0,
        ActivityKind::Chat => 1,
        ActivityKind::File => 2,
    }
}

fn kind_from_order(order: u8) -> ActivityKind {
    match order {
        0 => ActivityKind::Search,
        1 => ActivityKind::Chat,
        _ => ActivityKind::File,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ChatEntry, FileEntry, SearchEntry};
    use chrono::TimeZone;

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, day, hour, 0, 0).unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, day).unwrap()
    }

    fn user(identity: i64) -> UserRecord {
        UserRecord {
            identity,
            display_name: None,
            handle: None,
            contact: Some("+10000000000".to_string()),
            created_at: ts(1, 0),
            searches: Vec::new(),
            chats: Vec::new(),
            files: Vec::new(),
        }
    }

    fn fixture() -> Vec<UserRecord> {
        let mut ada = user(1);
        ada.searches.push(SearchEntry {
            query: "rust".to_string(),
            results_count: 3,
            timestamp: ts(1, 9),
        });
        ada.searches.push(SearchEntry {
            query: "tokio".to_string(),
            results_count: 3,
            timestamp: ts(1, 15),
        });
        ada.chats.push(ChatEntry {
            user_message: "hi".to_string(),
            bot_response: "hello".to_string(),
            timestamp: ts(2, 10),
        });

        let mut grace = user(2);
        grace.files.push(FileEntry {
            file_id: "f-1".to_string(),
            file_name: Some("a.pdf".to_string()),
            file_type: "application/pdf".to_string(),
            analysis: None,
            timestamp: ts(3, 12),
        });

        vec![ada, grace]
    }

    #[test]
    fn test_totals() {
        let totals = totals(&fixture());
        assert_eq!(
            totals,
            Totals {
                users: 2,
                searches: 2,
                chats: 1,
                files: 1,
            }
        );
    }

    #[test]
    fn test_daily_counts_grouped_and_ordered() {
        let counts = daily_counts(&fixture(), date(1), date(31));
        assert_eq!(
            counts,
            vec![
                DailyCount {
                    date: date(1),
                    kind: ActivityKind::Search,
                    count: 2,
                },
                DailyCount {
                    date: date(2),
                    kind: ActivityKind::Chat,
                    count: 1,
                },
                DailyCount {
                    date: date(3),
                    kind: ActivityKind::File,
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn test_daily_counts_respect_range() {
        let counts = daily_counts(&fixture(), date(2), date(2));
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].kind, ActivityKind::Chat);
    }

    #[test]
    fn test_distribution_respects_range() {
        let dist = distribution(&fixture(), date(1), date(2));
        assert_eq!(
            dist,
            Distribution {
                searches: 2,
                chats: 1,
                files: 0,
            }
        );
    }

    #[test]
    fn test_engagement_per_user() {
        let engagement = engagement(&fixture());
        assert_eq!(engagement.len(), 2);
        assert_eq!(engagement[0].identity, 1);
        assert_eq!(engagement[0].searches, 2);
        assert_eq!(engagement[1].identity, 2);
        assert_eq!(engagement[1].files, 1);
    }

    #[test]
    fn test_empty_export() {
        assert_eq!(totals(&[]).users, 0);
        assert!(daily_counts(&[], date(1), date(31)).is_empty());
        assert!(engagement(&[]).is_empty());
    }
}
