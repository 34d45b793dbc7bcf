//! `optimize_posting_schedule`: best posting hours from past performance.
//!
//! Samples are bucketed by UTC hour and ranked by mean engagement, ties going
//! to the earlier hour. Without usable history the platform defaults apply.
//! The caller's timezone is echoed back but not applied.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use studio_kernel::StudioContext;
use studio_primitives::Platform;
use studio_prompts::profile;
use studio_tools::{
    ArgumentSchema, CallContext, FieldSpec, ToolDescriptor, ToolResult, from_args,
};

/// Tool name.
pub const NAME: &str = "optimize_posting_schedule";

/// Number of hours and days recommended.
pub const RECOMMENDATIONS: usize = 3;

/// One historical post.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct PostingSample {
    /// RFC 3339 publish time; wins over `hour` when it parses.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Publish hour, 0-23.
    #[serde(default)]
    pub hour: Option<u32>,
    /// View count.
    #[serde(default)]
    pub views: f64,
    /// Engagement measure.
    #[serde(default)]
    pub engagement: f64,
}

/// Aggregates for one hour of the day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HourStats {
    /// Hour of day, UTC.
    pub hour: u32,
    /// Samples in the bucket.
    pub samples: usize,
    /// Mean views.
    pub avg_views: f64,
    /// Mean engagement.
    pub avg_engagement: f64,
}

#[derive(Clone, Copy, Debug, Default)]
struct Totals {
    count: usize,
    views: f64,
    engagement: f64,
}

impl Totals {
    fn add(&mut self, sample: &PostingSample) {
        self.count += 1;
        self.views += sample.views;
        self.engagement += sample.engagement;
    }

    #[allow(clippy::cast_precision_loss)]
    fn means(self) -> (f64, f64) {
        let n = self.count.max(1) as f64;
        (self.views / n, self.engagement / n)
    }
}

/// Hour and weekday aggregates of a sample set.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleAnalysis {
    hours: Vec<HourStats>,
    days: Vec<(Weekday, f64)>,
    skipped: Vec<usize>,
}

impl ScheduleAnalysis {
    /// Buckets the samples. Samples with neither a parsable timestamp nor a
    /// valid hour are recorded in [`Self::skipped`].
    #[must_use]
    pub fn from_samples(samples: &[PostingSample]) -> Self {
        let mut hours: BTreeMap<u32, Totals> = BTreeMap::new();
        let mut days: BTreeMap<u32, (Weekday, Totals)> = BTreeMap::new();
        let mut skipped = Vec::new();

        for (idx, sample) in samples.iter().enumerate() {
            let published = sample
                .timestamp
                .as_deref()
                .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
                .map(|ts| ts.with_timezone(&Utc));

            let hour = match (published, sample.hour) {
                (Some(ts), _) => ts.hour(),
                (None, Some(hour)) if hour < 24 => hour,
                _ => {
                    skipped.push(idx);
                    continue;
                }
            };
            hours.entry(hour).or_default().add(sample);
            if let Some(ts) = published {
                let weekday = ts.weekday();
                days.entry(weekday.num_days_from_monday())
                    .or_insert((weekday, Totals::default()))
                    .1
                    .add(sample);
            }
        }

        Self {
            hours: hours
                .into_iter()
                .map(|(hour, totals)| {
                    let (avg_views, avg_engagement) = totals.means();
                    HourStats {
                        hour,
                        samples: totals.count,
                        avg_views,
                        avg_engagement,
                    }
                })
                .collect(),
            days: days
                .into_values()
                .map(|(weekday, totals)| (weekday, totals.means().1))
                .collect(),
            skipped,
        }
    }

    /// Per-hour aggregates in hour order.
    #[must_use]
    pub fn hours(&self) -> &[HourStats] {
        &self.hours
    }

    /// Indices of samples that could not be placed.
    #[must_use]
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// Whether any sample was usable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }

    /// Hours by descending mean engagement, ascending hour on ties.
    #[must_use]
    pub fn ranked_hours(&self) -> Vec<&HourStats> {
        let mut ranked: Vec<&HourStats> = self.hours.iter().collect();
        ranked.sort_by(|a, b| {
            b.avg_engagement
                .total_cmp(&a.avg_engagement)
                .then(a.hour.cmp(&b.hour))
        });
        ranked
    }

    /// Top hours formatted `HH:00`.
    #[must_use]
    pub fn recommended_times(&self, limit: usize) -> Vec<String> {
        self.ranked_hours()
            .into_iter()
            .take(limit)
            .map(|stats| format_hour(stats.hour))
            .collect()
    }

    /// Strongest weekdays by mean engagement; empty without timestamps.
    #[must_use]
    pub fn best_days(&self, limit: usize) -> Vec<&'static str> {
        let mut ranked = self.days.clone();
        ranked.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then(a.0.num_days_from_monday().cmp(&b.0.num_days_from_monday()))
        });
        ranked
            .into_iter()
            .take(limit)
            .map(|(weekday, _)| weekday_name(weekday))
            .collect()
    }
}

fn format_hour(hour: u32) -> String {
    format!("{hour:02}:00")
}

const fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleArgs {
    platform: Platform,
    timezone: String,
    #[serde(default)]
    historical_data: Vec<PostingSample>,
}

/// Describes the tool.
///
/// # Errors
///
/// Returns a descriptor error only if the static definition is malformed.
pub fn descriptor() -> ToolResult<ToolDescriptor> {
    ToolDescriptor::new(
        NAME,
        "Recommend posting times from past performance or platform defaults",
        ArgumentSchema::new()
            .field(
                "platform",
                FieldSpec::string("Target platform")
                    .one_of(&Platform::names(&Platform::PUBLISHING))
                    .default("youtube"),
            )
            .field(
                "timezone",
                FieldSpec::string("Audience timezone label, echoed back").default("UTC"),
            )
            .field(
                "historical_data",
                FieldSpec::array(
                    "Past posts",
                    FieldSpec::object_with(
                        "Post performance",
                        ArgumentSchema::new()
                            .field("timestamp", FieldSpec::string("RFC 3339 publish time"))
                            .field("hour", FieldSpec::integer("Publish hour").range(0.0, 23.0))
                            .field("views", FieldSpec::number("Views").at_least(0.0).default(0))
                            .field(
                                "engagement",
                                FieldSpec::number("Engagement").at_least(0.0).default(0),
                            ),
                    ),
                ),
            ),
    )
}

/// Runs the tool. Makes no external calls.
///
/// # Errors
///
/// Only argument deserialization can fail.
#[allow(clippy::unused_async)]
pub async fn run(_studio: StudioContext, ctx: CallContext, args: Value) -> ToolResult<Value> {
    let args: ScheduleArgs = from_args(args)?;
    let analysis = ScheduleAnalysis::from_samples(&args.historical_data);
    for idx in analysis.skipped() {
        ctx.warn(&format!(
            "historical_data[{idx}] has no usable timestamp or hour, skipped"
        ));
    }

    let defaults = profile(args.platform);
    if analysis.is_empty() {
        return Ok(json!({
            "platform": args.platform,
            "timezone": args.timezone,
            "source": "platform_default",
            "recommended_times": defaults
                .default_posting_hours
                .iter()
                .map(|hour| format_hour(u32::from(*hour)))
                .collect::<Vec<_>>(),
            "best_days": defaults.best_days,
        }));
    }

    let mut best_days = analysis.best_days(RECOMMENDATIONS);
    if best_days.is_empty() {
        best_days = defaults.best_days.to_vec();
    }
    Ok(json!({
        "platform": args.platform,
        "timezone": args.timezone,
        "source": "historical",
        "recommended_times": analysis.recommended_times(RECOMMENDATIONS),
        "best_days": best_days,
        "hourly_performance": analysis.hours(),
    }))
}
