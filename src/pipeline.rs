//! Stage orchestration with an explicit, owned cache.
//!
//! Every stage is a pure function of the sources; the cache only avoids
//! recomputing them within one session. Entries expire after the configured
//! TTL and `invalidate` drops them all.
use crate::comment::make_comment;
use crate::countries::{focus_codes, scoring_universe, CountryGroups};
use crate::error::Result;
use crate::indicators::{DEBT, INFLATION};
use crate::interpolate::interpolate_panel;
use crate::loader::{build_history_panel, build_panel, LoadReport, Universe};
use crate::outlook::{projection_outlook, rule_outlook, Outlook, ProjectionOutlook, ProjectionPanel};
use crate::panel::Panel;
use crate::provider::{LocalSource, ProjectionSource, RemoteSource};
use crate::reports::CountrySnapshot;
use crate::scoring::{score_cross_section, ScoredTable};
use crate::trend::{compute_slopes, SlopeRecord};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

#[derive(Debug)]
struct Entry<T> {
    value: Arc<T>,
    built_at: Instant,
}

#[derive(Debug)]
struct Slot<T> {
    entry: Option<Entry<T>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<T> Slot<T> {
    fn fresh(&self, ttl: Option<Duration>) -> Option<Arc<T>> {
        let e = self.entry.as_ref()?;
        match ttl {
            Some(ttl) if e.built_at.elapsed() > ttl => None,
            _ => Some(Arc::clone(&e.value)),
        }
    }

    fn store(&mut self, value: T) -> Arc<T> {
        let value = Arc::new(value);
        self.entry = Some(Entry { value: Arc::clone(&value), built_at: Instant::now() });
        value
    }
}

/// Memoized stage outputs.
#[derive(Debug, Default)]
pub struct StageCache {
    ttl: Option<Duration>,
    raw: Slot<(Panel, LoadReport)>,
    interpolated: Slot<Panel>,
    scored: Slot<ScoredTable>,
    history: Slot<(Panel, LoadReport)>,
    slopes: Slot<Vec<SlopeRecord>>,
    snapshot: Slot<CountrySnapshot>,
    projection: Slot<ProjectionPanel>,
}

impl StageCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self { ttl, ..Default::default() }
    }

    pub fn invalidate(&mut self) {
        *self = Self::new(self.ttl);
    }
}

/// Year ranges for the two panels the pipeline builds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizon {
    pub start_year: i32,
    pub end_year: i32,
    pub history_start_year: i32,
}

pub struct Pipeline {
    local: Box<dyn LocalSource>,
    remote: Box<dyn RemoteSource>,
    projection: Box<dyn ProjectionSource>,
    groups: CountryGroups,
    scoring_universe: Universe,
    history_universe: Universe,
    cache: StageCache,
}

/// Rule-based outlook and comment for one country.
#[derive(Debug, Clone, PartialEq)]
pub struct CountryAssessment {
    pub country: String,
    pub score: Option<f64>,
    pub rating: Option<&'static str>,
    pub outlook: Outlook,
    pub comment: String,
}

impl Pipeline {
    pub fn new(
        local: Box<dyn LocalSource>,
        remote: Box<dyn RemoteSource>,
        projection: Box<dyn ProjectionSource>,
        horizon: Horizon,
        cache_ttl: Option<Duration>,
    ) -> Self {
        Self {
            local,
            remote,
            projection,
            groups: CountryGroups::default(),
            scoring_universe: Universe {
                countries: scoring_universe(),
                start_year: horizon.start_year,
                end_year: horizon.end_year,
            },
            history_universe: Universe {
                countries: focus_codes(),
                start_year: horizon.history_start_year,
                end_year: horizon.end_year,
            },
            cache: StageCache::new(cache_ttl),
        }
    }

    pub fn with_groups(mut self, groups: CountryGroups) -> Self {
        self.groups = groups;
        self.cache.invalidate();
        self
    }

    pub fn with_universes(mut self, scoring: Universe, history: Universe) -> Self {
        self.scoring_universe = scoring;
        self.history_universe = history;
        self.cache.invalidate();
        self
    }

    pub fn scoring_year(&self) -> i32 {
        self.scoring_universe.end_year
    }

    pub fn invalidate(&mut self) {
        debug!("stage cache invalidated");
        self.cache.invalidate();
    }

    /// Merged local + remote panel, before interpolation.
    pub fn raw_panel(&mut self) -> Result<Arc<(Panel, LoadReport)>> {
        if let Some(v) = self.cache.raw.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let built = build_panel(self.local.as_ref(), self.remote.as_ref(), &self.scoring_universe)?;
        Ok(self.cache.raw.store(built))
    }

    pub fn interpolated_panel(&mut self) -> Result<Arc<Panel>> {
        if let Some(v) = self.cache.interpolated.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let raw = self.raw_panel()?;
        Ok(self.cache.interpolated.store(interpolate_panel(&raw.0)))
    }

    pub fn scored(&mut self) -> Result<Arc<ScoredTable>> {
        if let Some(v) = self.cache.scored.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let panel = self.interpolated_panel()?;
        let table = score_cross_section(&panel, self.scoring_year(), &self.groups);
        Ok(self.cache.scored.store(table))
    }

    /// Remote-only panel of the focus countries over the long window,
    /// interpolated and with derived columns.
    pub fn history(&mut self) -> Result<Arc<(Panel, LoadReport)>> {
        if let Some(v) = self.cache.history.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let (panel, report) = build_history_panel(self.remote.as_ref(), &self.history_universe);
        Ok(self.cache.history.store((interpolate_panel(&panel), report)))
    }

    pub fn slopes(&mut self) -> Result<Arc<Vec<SlopeRecord>>> {
        if let Some(v) = self.cache.slopes.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let history = self.history()?;
        Ok(self.cache.slopes.store(compute_slopes(&history.0)))
    }

    pub fn snapshot(&mut self) -> Result<Arc<CountrySnapshot>> {
        if let Some(v) = self.cache.snapshot.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let history = self.history()?;
        let scored = self.scored()?;
        Ok(self.cache.snapshot.store(CountrySnapshot::build(&history.0, &scored)))
    }

    /// Rule-based outlook plus comment for one country at the latest
    /// snapshot year.
    pub fn assess(&mut self, country: &str) -> Result<CountryAssessment> {
        let snapshot = self.snapshot()?;
        let slopes = self.slopes()?;
        let row = snapshot.latest(country)?;
        let slope = slopes
            .iter()
            .find(|s| s.country == country)
            .cloned()
            .unwrap_or_else(|| SlopeRecord { country: country.to_string(), ..Default::default() });

        let outlook = rule_outlook(row.values.get(DEBT).copied(), row.values.get(INFLATION).copied(), &slope);
        let score = row.scored.as_ref().map(|s| s.score);
        let rating = row.scored.as_ref().map(|s| s.rating);
        let z = row.scored.as_ref().map(|s| s.z.clone()).unwrap_or_default();
        let comment = make_comment(score, rating, Some(outlook), &z);
        info!(country, outlook = %outlook, "assessed country");
        Ok(CountryAssessment { country: country.to_string(), score, rating, outlook, comment })
    }

    pub fn projection_panel(&mut self) -> Result<Arc<ProjectionPanel>> {
        if let Some(v) = self.cache.projection.fresh(self.cache.ttl) {
            return Ok(v);
        }
        let panel = ProjectionPanel::load(self.projection.as_ref())?;
        Ok(self.cache.projection.store(panel))
    }

    pub fn projection_outlook(&mut self, country_code: &str) -> Result<ProjectionOutlook> {
        let panel = self.projection_panel()?;
        projection_outlook(&panel, country_code)
    }
}
