//! Deterministic mock dataset
//!
//! Backs the stub HTTP service and the client's fallback path. Every value
//! derives from `mock.seed` and the as-of date, so two datasets built from
//! the same inputs are identical.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analytics::{self, kpi, KpiDelta, Polarity};
use crate::config::{AnalyticsConfig, MockConfig, SentinelConfig};
use crate::types::{
    Company, CompanyOverview, CompanySearchRequest, DashboardSummary, DataType, ForecastPoint,
    KpiCard, Post, PostCategory, PostStatus, Quarter, QuarterlyRiskRecord, RiskDistribution,
    RiskLevel, RiskSignal, RiskStatusBucket, RiskStatusTrendPayload, TimeRange, TrendPoint,
    TrendUnit, DEMO_ADMIN_ID, DEMO_ANALYST_ID,
};
use crate::view::{self, ListQuery, SortMode, StatusFilter};

const NAME_PREFIXES: &[&str] = &[
    "Hanul", "Daeseong", "Mirae", "Seorin", "Nuri", "Taeyang", "Kumho", "Bora", "Cheonji", "Haesol",
    "Arum", "Dongbang",
];
const NAME_SUFFIXES: &[&str] = &[
    "Logistics", "Materials", "Precision", "Electronics", "Chemical", "Foods", "Metals", "Textiles",
];
const INDUSTRIES: &[&str] = &[
    "Manufacturing", "Wholesale", "Transport", "Construction", "IT Services", "Food Processing",
];
const REGIONS: &[&str] = &["Seoul", "Busan", "Incheon", "Daegu", "Gwangju", "Daejeon", "Ulsan"];
const SIGNAL_TITLES: &[&str] = &[
    "Payment delay reported",
    "Credit rating downgrade",
    "Litigation filed",
    "Key customer concentration",
    "Negative media coverage",
    "Tax arrears notice",
];

/// Forecast quarters appended to each company's score series.
const FORECAST_HORIZON: usize = 2;

#[derive(Debug, Clone)]
pub struct MockDataset {
    seed: u64,
    as_of: NaiveDate,
    quarters: Vec<Quarter>,
    companies: Vec<Company>,
    records: Vec<QuarterlyRiskRecord>,
    dwell_window: usize,
    trend_actual_quarters: usize,
}

impl MockDataset {
    /// Dataset as of today.
    pub fn from_config(config: &SentinelConfig) -> Self {
        Self::generate(&config.mock, &config.analytics, Utc::now().date_naive())
    }

    pub fn generate(mock: &MockConfig, analytics: &AnalyticsConfig, as_of: NaiveDate) -> Self {
        let mut rng = StdRng::seed_from_u64(mock.seed);

        let history_len = (2 * analytics.dwell_window_quarters)
            .max(analytics.trend_actual_quarters)
            .max(1);
        let last = Quarter::from_date(as_of);
        let mut first = last;
        for _ in 1..history_len {
            first = first.prev();
        }
        let quarters = first.range(history_len);
        let updated_at = at_nine(as_of);

        let mut companies = Vec::with_capacity(mock.company_count);
        let mut records = Vec::with_capacity(mock.company_count * history_len);

        for i in 0..mock.company_count {
            let id = format!("C{:04}", i + 1);
            let name = format!(
                "{} {}",
                NAME_PREFIXES[i % NAME_PREFIXES.len()],
                NAME_SUFFIXES[(i / NAME_PREFIXES.len() + i) % NAME_SUFFIXES.len()]
            );

            let mut level = pick_initial_level(&mut rng);
            for q in &quarters {
                records.push(QuarterlyRiskRecord::new(&id, &name, *q, level));
                level = step_level(level, &mut rng);
            }

            let current = records.last().map_or(RiskLevel::Min, |r| r.risk_level);
            let mut tags = Vec::new();
            if current == RiskLevel::Risk {
                tags.push("watchlist".to_string());
            }
            if rng.gen_bool(0.3) {
                tags.push("key-supplier".to_string());
            }

            companies.push(Company {
                id,
                name,
                business_number: format!(
                    "{:03}-{:02}-{:05}",
                    rng.gen_range(100..1000),
                    rng.gen_range(10..100),
                    rng.gen_range(0..100_000)
                ),
                industry: INDUSTRIES[rng.gen_range(0..INDUSTRIES.len())].to_string(),
                region: REGIONS[rng.gen_range(0..REGIONS.len())].to_string(),
                risk_level: current,
                risk_score: round1(score_for(current, &mut rng)),
                updated_at: updated_at - Duration::hours(rng.gen_range(0..24 * 30)),
                tags,
            });
        }

        tracing::debug!(
            companies = companies.len(),
            records = records.len(),
            first = %first,
            last = %last,
            "Mock dataset generated"
        );

        Self {
            seed: mock.seed,
            as_of,
            quarters,
            companies,
            records,
            dwell_window: analytics.dwell_window_quarters,
            trend_actual_quarters: analytics.trend_actual_quarters,
        }
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    pub fn companies(&self) -> &[Company] {
        &self.companies
    }

    pub fn records(&self) -> &[QuarterlyRiskRecord] {
        &self.records
    }

    /// Latest observed quarter.
    pub fn current_quarter(&self) -> Option<Quarter> {
        self.quarters.last().copied()
    }

    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn records_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a QuarterlyRiskRecord> + 'a {
        self.records.iter().filter(move |r| r.entity_id == id)
    }

    /// Keyword/code search.
    ///
    /// The keyword also matches business numbers with the dashes left out.
    pub fn search(&self, request: &CompanySearchRequest) -> Vec<Company> {
        let keyword = request.keyword.trim();
        let digits: String = keyword.chars().filter(|c| c.is_ascii_digit()).collect();
        let by_number = !digits.is_empty() && digits.len() == keyword.chars().filter(|c| *c != '-').count();

        let query = ListQuery {
            search_text: if by_number { String::new() } else { keyword.to_string() },
            status_filter: request.risk_level.map(StatusFilter::Risk),
            sort_mode: SortMode::RiskDesc,
            ..ListQuery::default()
        };

        let limit = request.limit.unwrap_or(usize::MAX);
        view::apply(&self.companies, &query)
            .into_iter()
            .filter(|c| !by_number || c.business_number.replace('-', "").contains(&digits))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Forecast, KPIs and signals for one company.
    pub fn overview(&self, id: &str) -> Option<CompanyOverview> {
        let index = self.companies.iter().position(|c| c.id == id)?;
        let company = self.companies[index].clone();
        let mut rng = StdRng::seed_from_u64(self.seed.wrapping_add(7_919 * (index as u64 + 1)));

        let history: Vec<QuarterlyRiskRecord> = self.records_for(id).cloned().collect();

        let mut forecast: Vec<ForecastPoint> = history
            .iter()
            .map(|r| ForecastPoint {
                quarter: r.quarter,
                score: round1(score_for(r.risk_level, &mut rng)),
                data_type: DataType::Actual,
                lower: None,
                upper: None,
            })
            .collect();
        // Pin the latest actual to the headline score
        if let Some(last) = forecast.last_mut() {
            last.score = company.risk_score;
        }

        let mut quarter = self.current_quarter()?;
        let mut score = company.risk_score;
        for step in 1..=FORECAST_HORIZON {
            quarter = quarter.next();
            score = (score + rng.gen_range(-8.0..8.0)).clamp(1.0, 99.0);
            let band = 4.0 * step as f64;
            forecast.push(ForecastPoint {
                quarter,
                score: round1(score),
                data_type: DataType::Forecast,
                lower: Some(round1((score - band).max(0.0))),
                upper: Some(round1((score + band).min(100.0))),
            });
        }

        let actual: Vec<&ForecastPoint> = forecast.iter().filter(|p| p.data_type == DataType::Actual).collect();
        let previous_score = actual.len().checked_sub(2).map(|i| actual[i].score);
        let score_card = kpi::kpi_card(
            "riskScore",
            "Risk score",
            KpiDelta::from_values(Some(company.risk_score), previous_score, Polarity::LowerIsBetter),
            1,
            "",
        );

        let dwell = analytics::summarize(&history, self.dwell_window);
        let elevated_in = |window: &[Quarter]| -> Option<f64> {
            if window.is_empty() {
                return None;
            }
            let n = history
                .iter()
                .filter(|r| window.contains(&r.quarter) && r.risk_level.is_elevated())
                .count();
            Some(n as f64)
        };
        let elevated_card = kpi::kpi_card(
            "elevatedQuarters",
            "Quarters at risk",
            KpiDelta::from_values(
                elevated_in(&dwell.current_window),
                elevated_in(&dwell.previous_window),
                Polarity::LowerIsBetter,
            ),
            0,
            "Q",
        );

        let recent_start = history.len().saturating_sub(3);
        let now = at_nine(self.as_of);
        let signals = history[recent_start..]
            .iter()
            .filter(|r| r.risk_level.is_elevated())
            .map(|r| RiskSignal {
                title: SIGNAL_TITLES[rng.gen_range(0..SIGNAL_TITLES.len())].to_string(),
                severity: r.risk_level,
                detected_at: now - Duration::days(rng.gen_range(1..90)),
                source: format!("{} review", r.quarter),
            })
            .collect();

        Some(CompanyOverview {
            company,
            forecast,
            kpis: vec![score_card, elevated_card, kpi::dwell_card(&dwell)],
            signals,
        })
    }

    /// Dashboard KPIs, daily alert trend and tier distribution.
    pub fn dashboard_summary(&self, range: TimeRange) -> DashboardSummary {
        let days = range.days() as i64;
        let mut rng = StdRng::seed_from_u64(self.seed ^ (days as u64).rotate_left(17));

        let distribution = self.distribution_at(self.current_quarter());
        let previous_distribution = self.distribution_at(self.current_quarter().map(Quarter::prev));

        let daily = |rng: &mut StdRng, date: NaiveDate| TrendPoint {
            date,
            alerts: rng.gen_range(0..=distribution.risk * 2 + distribution.warn / 2 + 1),
            high_risk: rng.gen_range(0..=distribution.risk),
        };

        // Previous period first so the current trend stays aligned to `as_of`
        let previous_alerts: u32 = (0..days)
            .map(|i| daily(&mut rng, self.as_of - Duration::days(2 * days - 1 - i)).alerts)
            .sum();
        let trend: Vec<TrendPoint> = (0..days)
            .map(|i| daily(&mut rng, self.as_of - Duration::days(days - 1 - i)))
            .collect();
        let alerts: u32 = trend.iter().map(|p| p.alerts).sum();

        let monitored = self.companies.len() as f64;
        let kpis: Vec<KpiCard> = vec![
            kpi::kpi_card(
                "monitored",
                "Monitored companies",
                KpiDelta::from_values(Some(monitored), Some(monitored), Polarity::HigherIsBetter),
                0,
                "",
            ),
            kpi::kpi_card(
                "highRisk",
                "High-risk companies",
                KpiDelta::from_values(
                    Some(f64::from(distribution.risk)),
                    self.current_quarter().map(|_| f64::from(previous_distribution.risk)),
                    Polarity::LowerIsBetter,
                ),
                0,
                "",
            ),
            kpi::kpi_card(
                "alerts",
                "Alerts",
                KpiDelta::from_values(Some(f64::from(alerts)), Some(f64::from(previous_alerts)), Polarity::LowerIsBetter),
                0,
                "",
            ),
            kpi::dwell_card(&analytics::summarize(&self.records, self.dwell_window)),
        ];

        DashboardSummary {
            range,
            kpis,
            trend,
            distribution,
        }
    }

    /// Raw risk status trend as a backend would send it.
    ///
    /// Carries one bucket per observed quarter of the full history, so the
    /// oldest buckets fall outside the chart window. The oldest window
    /// quarter is left out and the latest actual quarter is sent twice, as
    /// flaky feeds do, so every reconciliation path is exercised.
    pub fn risk_trend_payload(&self) -> RiskStatusTrendPayload {
        let Some(last) = self.current_quarter() else {
            let q = Quarter::from_date(self.as_of);
            return RiskStatusTrendPayload {
                window_quarters: vec![q.next()],
                forecast_quarter: q.next(),
                trend: Vec::new(),
                unit: TrendUnit::Count,
            };
        };

        let actual = self.trend_actual_quarters.min(self.quarters.len());
        let forecast_quarter = last.next();
        let mut window_quarters: Vec<Quarter> = self.quarters[self.quarters.len() - actual..].to_vec();
        window_quarters.push(forecast_quarter);

        let mut trend: Vec<RiskStatusBucket> = self
            .quarters
            .iter()
            .map(|q| {
                let d = self.distribution_at(Some(*q));
                RiskStatusBucket {
                    quarter: *q,
                    data_type: DataType::Actual,
                    normal: f64::from(d.min),
                    caution: f64::from(d.warn),
                    risk: f64::from(d.risk),
                }
            })
            .collect();

        let current = self.distribution_at(Some(last));
        let mut rng = StdRng::seed_from_u64(self.seed.rotate_right(7));
        let shift = (f64::from(current.warn) * rng.gen_range(0.0..0.3)).round();
        trend.push(RiskStatusBucket {
            quarter: forecast_quarter,
            data_type: DataType::Forecast,
            normal: f64::from(current.min),
            caution: f64::from(current.warn) - shift,
            risk: f64::from(current.risk) + shift,
        });

        if actual >= 2 {
            let gap = window_quarters[0];
            trend.retain(|b| b.quarter != gap);
        }
        if let Some(resent) = trend.iter().find(|b| b.quarter == last).copied() {
            // Late correction with the tiers swapped; the first copy wins.
            trend.push(RiskStatusBucket {
                caution: resent.risk,
                risk: resent.caution,
                ..resent
            });
        }

        RiskStatusTrendPayload {
            window_quarters,
            forecast_quarter,
            trend,
            unit: TrendUnit::Count,
        }
    }

    /// Seed posts for an empty Decision Room.
    pub fn seed_posts(&self) -> Vec<Post> {
        let t = at_nine(self.as_of);
        let high_risk: Vec<&str> = self
            .companies
            .iter()
            .filter(|c| c.risk_level == RiskLevel::Risk)
            .map(|c| c.name.as_str())
            .take(3)
            .collect();

        vec![
            Post {
                id: "notice-welcome".to_string(),
                category: PostCategory::Notice,
                title: "Quarterly risk review schedule".to_string(),
                body: "Risk tiers are refreshed at the start of every quarter. \
                       Review flagged partners within two weeks of the refresh."
                    .to_string(),
                author: "Sentinel Admin".to_string(),
                author_id: DEMO_ADMIN_ID.to_string(),
                tags: vec!["schedule".to_string()],
                status: PostStatus::Open,
                created_at: t - Duration::days(14),
                updated_at: t - Duration::days(14),
                answers: Vec::new(),
                attachments: Vec::new(),
            },
            Post {
                id: "qna-watchlist".to_string(),
                category: PostCategory::Qna,
                title: "How is the watchlist tag assigned?".to_string(),
                body: format!(
                    "Currently tagged: {}. What triggers the tag?",
                    if high_risk.is_empty() { "none".to_string() } else { high_risk.join(", ") }
                ),
                author: "Risk Analyst".to_string(),
                author_id: DEMO_ANALYST_ID.to_string(),
                tags: vec!["watchlist".to_string()],
                status: PostStatus::Open,
                created_at: t - Duration::days(3),
                updated_at: t - Duration::days(3),
                answers: Vec::new(),
                attachments: Vec::new(),
            },
        ]
    }

    fn distribution_at(&self, quarter: Option<Quarter>) -> RiskDistribution {
        let mut d = RiskDistribution::default();
        let Some(quarter) = quarter else {
            return d;
        };
        for r in self.records.iter().filter(|r| r.quarter == quarter) {
            match r.risk_level {
                RiskLevel::Min => d.min += 1,
                RiskLevel::Warn => d.warn += 1,
                RiskLevel::Risk => d.risk += 1,
            }
        }
        d
    }
}

fn at_nine(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(9)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn pick_initial_level(rng: &mut StdRng) -> RiskLevel {
    match rng.gen_range(0..10) {
        0..=5 => RiskLevel::Min,
        6..=8 => RiskLevel::Warn,
        _ => RiskLevel::Risk,
    }
}

/// One quarter of a sticky random walk over tiers.
fn step_level(level: RiskLevel, rng: &mut StdRng) -> RiskLevel {
    let roll: f64 = rng.gen();
    let (to_min, to_warn) = match level {
        RiskLevel::Min => (0.80, 0.95),
        RiskLevel::Warn => (0.30, 0.80),
        RiskLevel::Risk => (0.10, 0.45),
    };
    if roll < to_min {
        RiskLevel::Min
    } else if roll < to_warn {
        RiskLevel::Warn
    } else {
        RiskLevel::Risk
    }
}

/// Score consistent with [`RiskLevel::from_score`].
fn score_for(level: RiskLevel, rng: &mut StdRng) -> f64 {
    match level {
        RiskLevel::Min => rng.gen_range(5.0..39.5),
        RiskLevel::Warn => rng.gen_range(40.0..69.5),
        RiskLevel::Risk => rng.gen_range(70.0..98.0),
    }
}
