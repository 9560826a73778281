// Contribution calendar aggregate.
// Approximates a year of daily contributions from push events, grouped into weeks with streaks.

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};

use crate::cache::{keys, minutes};
use crate::error::Result;
use crate::github::Event;
use crate::github::endpoints::MAX_PER_PAGE;

use super::GitHubInsights;

pub const CONTRIBUTIONS_TTL: Duration = minutes(120);

/// Days in the calendar window, ending today inclusive.
pub const WINDOW_DAYS: u64 = 365;

/// GitHub serves at most 300 public events, in pages of at most 100.
const MAX_EVENT_PAGES: u32 = 3;

/// One calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionDay {
    pub date: NaiveDate,
    pub count: u32,
    /// Intensity bucket 0..=4, see [`contribution_level`].
    pub level: u8,
}

/// Days from a Sunday through the following Saturday. The first and last
/// week of the window may be partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionWeek {
    /// First date placed in this week, not necessarily a Sunday.
    pub first_day: NaiveDate,
    pub days: Vec<ContributionDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionData {
    pub username: String,
    /// Exactly [`WINDOW_DAYS`] consecutive days, oldest first.
    pub days: Vec<ContributionDay>,
    pub weeks: Vec<ContributionWeek>,
    pub total_contributions: u64,
    pub longest_streak: u32,
    pub current_streak: u32,
    pub fetched_at: DateTime<Utc>,
}

/// Bucket a daily count: 0, 1-3, 4-6, 7-9, 10+.
pub fn contribution_level(count: u32) -> u8 {
    match count {
        0 => 0,
        1..=3 => 1,
        4..=6 => 2,
        7..=9 => 3,
        _ => 4,
    }
}

/// First day of the window ending on `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WINDOW_DAYS - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Commits per day from push events, with every day of the window present.
///
/// Events outside the window are ignored.
pub fn daily_counts(events: &[Event], today: NaiveDate) -> BTreeMap<NaiveDate, u32> {
    let mut counts: BTreeMap<NaiveDate, u32> = window_start(today)
        .iter_days()
        .take_while(|d| *d <= today)
        .map(|d| (d, 0))
        .collect();

    for event in events {
        let commits = event.push_commit_count();
        if commits == 0 {
            continue;
        }
        if let Some(count) = counts.get_mut(&event.created_at.date_naive()) {
            *count = count.saturating_add(commits as u32);
        }
    }

    counts
}

/// Sorted days with levels.
pub fn build_days(counts: &BTreeMap<NaiveDate, u32>) -> Vec<ContributionDay> {
    counts
        .iter()
        .map(|(&date, &count)| ContributionDay {
            date,
            count,
            level: contribution_level(count),
        })
        .collect()
}

/// Split sorted days into weeks, starting a new week at each Sunday.
pub fn group_weeks(days: &[ContributionDay]) -> Vec<ContributionWeek> {
    let mut weeks = Vec::new();
    let mut current: Vec<ContributionDay> = Vec::new();

    for day in days {
        if day.date.weekday() == Weekday::Sun && !current.is_empty() {
            weeks.push(into_week(std::mem::take(&mut current)));
        }
        current.push(*day);
    }
    if !current.is_empty() {
        weeks.push(into_week(current));
    }

    weeks
}

fn into_week(days: Vec<ContributionDay>) -> ContributionWeek {
    ContributionWeek {
        first_day: days[0].date,
        days,
    }
}

/// Longest run of consecutive dates with a non-zero count.
pub fn longest_streak(days: &[ContributionDay]) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for day in days {
        if day.count == 0 {
            run = 0;
        } else if run > 0 && previous.and_then(|p| p.succ_opt()) == Some(day.date) {
            run += 1;
        } else {
            run = 1;
        }
        longest = longest.max(run);
        previous = Some(day.date);
    }

    longest
}

/// Consecutive contributing days ending today.
///
/// Stops at the first day that has no contributions or is not in `counts`.
pub fn current_streak(counts: &BTreeMap<NaiveDate, u32>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);

    while let Some(date) = day {
        match counts.get(&date) {
            Some(&count) if count > 0 => streak += 1,
            _ => break,
        }
        day = date.pred_opt();
    }

    streak
}

impl GitHubInsights {
    /// Get the contribution calendar for `username` (or the default user), cached for two hours.
    pub async fn get_contribution_data(&self, username: Option<&str>) -> Result<ContributionData> {
        let username = self.resolve_username(username)?;
        let key = keys::contributions_key(&username);
        self.cached_or_fetch(&key, CONTRIBUTIONS_TTL, "contribution data", || {
            self.fetch_contribution_data(&username)
        })
        .await
    }

    async fn fetch_contribution_data(&self, username: &str) -> Result<ContributionData> {
        let events = self.fetch_recent_events(username).await?;
        let today = self.clock.today();

        let counts = daily_counts(&events, today);
        let days = build_days(&counts);
        let weeks = group_weeks(&days);
        let total_contributions = days.iter().map(|d| u64::from(d.count)).sum();

        Ok(ContributionData {
            username: username.to_string(),
            longest_streak: longest_streak(&days),
            current_streak: current_streak(&counts, today),
            days,
            weeks,
            total_contributions,
            fetched_at: self.clock.now(),
        })
    }

    /// Up to 300 recent events, stopping at the first short page.
    async fn fetch_recent_events(&self, username: &str) -> Result<Vec<Event>> {
        let mut events = Vec::new();
        for page in 1..=MAX_EVENT_PAGES {
            let batch = self
                .client
                .get_user_events(username, page, MAX_PER_PAGE)
                .await?;
            let short = batch.len() < MAX_PER_PAGE as usize;
            events.extend(batch);
            if short {
                break;
            }
        }
        Ok(events)
    }
}
