//! Fixtures shared by the unit tests of this crate.

use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crate::DEFAULT_DETAIL_YEAR;
use crate::artifacts::{ArtifactKind, ArtifactPaths, ArtifactSource};
use crate::error::{DashboardError, Result};
use crate::model::{LinearModel, Regressor};
use crate::prediction::FEATURE_COUNT;
use crate::table::{ACTUAL_COLUMN, DATETIME_COLUMN, PREDICTED_COLUMN, TimeSeriesTable};

pub const MAIN_CSV: &str = "\
Datetime,Kps,Predicted_Kp
2007-01-01 00:00:00,2.0,2.3
2007-01-01 03:00:00,3.0,2.7
2007-01-01 06:00:00,4.3,3.9
2007-01-01 09:00:00,1.7,2.0
";

pub const DETAIL_CSV: &str = "\
Datetime,Kp_index,Dst
2006-12-31 21:00:00,9.0,-80
2007-01-01 00:00:00,1.5,-5
2007-02-15 12:00:00,2.5,-12
2007-03-01 06:00:00,3.5,-20
2008-01-01 00:00:00,8.0,-60
";

/// Linear model with all-ones weights, so predictions are input sums.
pub fn summing_model() -> LinearModel {
    LinearModel::new(0.0, vec![1.0; FEATURE_COUNT])
}

pub fn main_table() -> TimeSeriesTable {
    let df = df!(
        DATETIME_COLUMN => &[
            "2007-01-01 00:00:00",
            "2007-01-01 03:00:00",
            "2007-01-01 06:00:00",
            "2007-01-01 09:00:00",
        ],
        ACTUAL_COLUMN => &[2.0, 3.0, 4.3, 1.7],
        PREDICTED_COLUMN => &[2.3, 2.7, 3.9, 2.0]
    )
    .unwrap();
    TimeSeriesTable::from_dataframe(df).unwrap()
}

/// Detail rows before filtering; three of the five fall in 2007.
pub fn detail_table_unfiltered() -> TimeSeriesTable {
    let df = df!(
        DATETIME_COLUMN => &[
            "2006-12-31 21:00:00",
            "2007-01-01 00:00:00",
            "2007-02-15 12:00:00",
            "2007-03-01 06:00:00",
            "2008-01-01 00:00:00",
        ],
        "Kp_index" => &[9.0, 1.5, 2.5, 3.5, 8.0],
        "Dst" => &[-80i64, -5, -12, -20, -60]
    )
    .unwrap();
    TimeSeriesTable::from_dataframe(df).unwrap()
}

/// Writes the fixture model and CSVs into `dir`.
pub fn write_fixture_files(dir: &Path) -> ArtifactPaths {
    let paths = ArtifactPaths {
        model: dir.join("model.json"),
        main_table: dir.join("kpmart.csv"),
        detail_table: dir.join("dfc_output.csv"),
    };
    std::fs::write(&paths.model, serde_json::to_string(&summing_model()).unwrap()).unwrap();
    std::fs::write(&paths.main_table, MAIN_CSV).unwrap();
    std::fs::write(&paths.detail_table, DETAIL_CSV).unwrap();
    paths
}

/// Summing model that counts its predictions.
struct CountingModel {
    inner: LinearModel,
    calls: Arc<AtomicUsize>,
}

impl Regressor for CountingModel {
    fn n_features(&self) -> usize {
        self.inner.n_features()
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.predict(features)
    }
}

/// In-memory source that counts how often each artifact is loaded.
#[derive(Default)]
pub struct StubSource {
    pub model_loads: AtomicUsize,
    pub main_loads: AtomicUsize,
    pub detail_loads: AtomicUsize,
    /// Predictions made by every model this source handed out
    pub predictions: Arc<AtomicUsize>,
    delay: Duration,
    model_failures: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every load sleeps first, widening the window for racing callers.
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// The first `times` model loads fail.
    pub fn failing_model_loads(self, times: usize) -> Self {
        self.model_failures.store(times, Ordering::SeqCst);
        self
    }

    fn wait(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

impl ArtifactSource for StubSource {
    fn load_model(&self) -> Result<Arc<dyn Regressor>> {
        self.model_loads.fetch_add(1, Ordering::SeqCst);
        self.wait();
        let failing = self
            .model_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DashboardError::load(ArtifactKind::Model, "stub failure"));
        }
        Ok(Arc::new(CountingModel {
            inner: summing_model(),
            calls: Arc::clone(&self.predictions),
        }))
    }

    fn load_main_table(&self) -> Result<TimeSeriesTable> {
        self.main_loads.fetch_add(1, Ordering::SeqCst);
        self.wait();
        Ok(main_table())
    }

    fn load_detail_table(&self) -> Result<TimeSeriesTable> {
        self.detail_loads.fetch_add(1, Ordering::SeqCst);
        self.wait();
        detail_table_unfiltered().filter_year(DEFAULT_DETAIL_YEAR)
    }
}

/// Layer counting ERROR events, for checking a failure is reported once.
#[derive(Clone, Default)]
pub struct ErrorEventCounter(Arc<AtomicUsize>);

impl ErrorEventCounter {
    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for ErrorEventCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}
