use std::collections::HashMap;

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::workflows::registration::domain::{Registration, Role, RoleDetails};

/// Days covered by the daily registration trend.
pub const TREND_WINDOW_DAYS: i64 = 30;

const TOP_SPECIALIZATION_COUNT: usize = 5;

/// Registrations created on one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// How often one specialization appears across mentor registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecializationCount {
    pub specialization: String,
    pub count: usize,
}

/// Mentors grouped by their declared years of experience.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExperienceBucket {
    pub years: String,
    pub count: usize,
}

/// Week-over-week intake movement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyGrowth {
    pub last_week: usize,
    pub previous_week: usize,
    /// `None` when the previous week had no registrations to compare against.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_rate_percent: Option<f32>,
}

/// Chart-ready aggregate over the full registration list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_registrations: usize,
    pub mentor_count: usize,
    pub beneficiary_count: usize,
    pub daily_trend: Vec<DailyCount>,
    pub top_specializations: Vec<SpecializationCount>,
    pub experience_levels: Vec<ExperienceBucket>,
    pub weekly_growth: WeeklyGrowth,
}

/// Aggregate the registration list into chart-ready summaries. Pure; the
/// caller supplies `today` so report windows are reproducible.
pub fn summarize(registrations: &[Registration], today: NaiveDate) -> AnalyticsSummary {
    let mentor_count = registrations
        .iter()
        .filter(|registration| registration.role() == Role::Mentor)
        .count();
    let beneficiary_count = registrations.len() - mentor_count;

    AnalyticsSummary {
        total_registrations: registrations.len(),
        mentor_count,
        beneficiary_count,
        daily_trend: daily_trend(registrations, today),
        top_specializations: top_specializations(registrations),
        experience_levels: experience_levels(registrations),
        weekly_growth: weekly_growth(registrations, today),
    }
}

/// One zero-filled entry per day over the trailing window, oldest first.
fn daily_trend(registrations: &[Registration], today: NaiveDate) -> Vec<DailyCount> {
    (0..TREND_WINDOW_DAYS)
        .rev()
        .map(|offset| {
            let date = today - Duration::days(offset);
            let count = registrations
                .iter()
                .filter(|registration| registration.created_at.date_naive() == date)
                .count();
            DailyCount { date, count }
        })
        .collect()
}

fn top_specializations(registrations: &[Registration]) -> Vec<SpecializationCount> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for registration in registrations {
        let RoleDetails::Mentor {
            specializations, ..
        } = &registration.details
        else {
            continue;
        };
        for specialization in specializations.split(',') {
            let specialization = specialization.trim();
            if !specialization.is_empty() {
                *counts.entry(specialization.to_string()).or_default() += 1;
            }
        }
    }

    let mut ranked: Vec<SpecializationCount> = counts
        .into_iter()
        .map(|(specialization, count)| SpecializationCount {
            specialization,
            count,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.specialization.cmp(&b.specialization))
    });
    ranked.truncate(TOP_SPECIALIZATION_COUNT);
    ranked
}

fn experience_levels(registrations: &[Registration]) -> Vec<ExperienceBucket> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for registration in registrations {
        let RoleDetails::Mentor {
            years_of_experience,
            ..
        } = &registration.details
        else {
            continue;
        };
        let years = years_of_experience.trim();
        if !years.is_empty() {
            *counts.entry(years.to_string()).or_default() += 1;
        }
    }

    let mut buckets: Vec<ExperienceBucket> = counts
        .into_iter()
        .map(|(years, count)| ExperienceBucket { years, count })
        .collect();
    buckets.sort_by(|a, b| a.years.cmp(&b.years));
    buckets
}

fn weekly_growth(registrations: &[Registration], today: NaiveDate) -> WeeklyGrowth {
    let week_ago = today - Duration::days(7);
    let two_weeks_ago = today - Duration::days(14);

    let last_week = registrations
        .iter()
        .filter(|registration| {
            let date = registration.created_at.date_naive();
            date > week_ago && date <= today
        })
        .count();
    let previous_week = registrations
        .iter()
        .filter(|registration| {
            let date = registration.created_at.date_naive();
            date > two_weeks_ago && date <= week_ago
        })
        .count();

    let growth_rate_percent = (previous_week > 0).then(|| {
        (last_week as f32 - previous_week as f32) / previous_week as f32 * 100.0
    });

    WeeklyGrowth {
        last_week,
        previous_week,
        growth_rate_percent,
    }
}
