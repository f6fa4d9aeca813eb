use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, trace};

use crate::error::{DashboardError, Result};
use crate::model::{LinearModel, Regressor};
use crate::prediction::FEATURE_COUNT;
use crate::table::{ACTUAL_COLUMN, PREDICTED_COLUMN, TimeSeriesTable};

/// The heavyweight inputs the dashboard is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    MainTable,
    DetailTable,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Model => "model",
            ArtifactKind::MainTable => "main table",
            ArtifactKind::DetailTable => "detail table",
        };
        f.write_str(name)
    }
}

/// Where artifacts come from. Loads are blocking and run off the async
/// executor; the store guarantees each one is invoked at most once per
/// successful load.
pub trait ArtifactSource: Send + Sync + 'static {
    fn load_model(&self) -> Result<Arc<dyn Regressor>>;

    /// Must contain `Kps` and `Predicted_Kp`.
    fn load_main_table(&self) -> Result<TimeSeriesTable>;

    /// Already restricted to the detail year.
    fn load_detail_table(&self) -> Result<TimeSeriesTable>;
}

/// File locations of the three artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub main_table: PathBuf,
    pub detail_table: PathBuf,
}

/// Reads a JSON linear model and two CSV tables from disk.
#[derive(Debug, Clone)]
pub struct FileArtifactSource {
    paths: ArtifactPaths,
    detail_year: i32,
}

impl FileArtifactSource {
    pub fn new(paths: ArtifactPaths, detail_year: i32) -> Self {
        Self { paths, detail_year }
    }
}

impl ArtifactSource for FileArtifactSource {
    fn load_model(&self) -> Result<Arc<dyn Regressor>> {
        let model = LinearModel::from_file(&self.paths.model)
            .map_err(|e| DashboardError::load(ArtifactKind::Model, e))?;
        if model.n_features() != FEATURE_COUNT {
            return Err(DashboardError::load(
                ArtifactKind::Model,
                format!(
                    "model takes {} features, the dashboard submits {}",
                    model.n_features(),
                    FEATURE_COUNT
                ),
            ));
        }
        Ok(Arc::new(model))
    }

    fn load_main_table(&self) -> Result<TimeSeriesTable> {
        TimeSeriesTable::read_csv(&self.paths.main_table)
            .and_then(|table| {
                table.require_columns(&[ACTUAL_COLUMN, PREDICTED_COLUMN])?;
                Ok(table)
            })
            .map_err(|e| DashboardError::load(ArtifactKind::MainTable, e))
    }

    fn load_detail_table(&self) -> Result<TimeSeriesTable> {
        TimeSeriesTable::read_csv(&self.paths.detail_table)
            .and_then(|table| table.filter_year(self.detail_year))
            .map_err(|e| DashboardError::load(ArtifactKind::DetailTable, e))
    }
}

/// Lazily loaded, process-wide artifacts.
///
/// Each artifact sits in its own `OnceCell`: the first caller loads it,
/// concurrent callers wait for that load, and every later caller gets the
/// same `Arc`. A failed load leaves the cell empty so the next request tries
/// again.
pub struct ArtifactStore {
    source: Arc<dyn ArtifactSource>,
    model: OnceCell<Arc<dyn Regressor>>,
    main_table: OnceCell<Arc<TimeSeriesTable>>,
    detail_table: OnceCell<Arc<TimeSeriesTable>>,
}

impl ArtifactStore {
    pub fn new(source: Arc<dyn ArtifactSource>) -> Self {
        Self {
            source,
            model: OnceCell::new(),
            main_table: OnceCell::new(),
            detail_table: OnceCell::new(),
        }
    }

    /// Store backed by files on disk.
    pub fn from_files(paths: ArtifactPaths, detail_year: i32) -> Self {
        Self::new(Arc::new(FileArtifactSource::new(paths, detail_year)))
    }

    pub async fn model(&self) -> Result<Arc<dyn Regressor>> {
        load_once(&self.model, ArtifactKind::Model, &self.source, |source: &dyn ArtifactSource| {
            source.load_model()
        })
        .await
    }

    pub async fn main_table(&self) -> Result<Arc<TimeSeriesTable>> {
        load_once(&self.main_table, ArtifactKind::MainTable, &self.source, |source: &dyn ArtifactSource| {
            source.load_main_table().map(Arc::new)
        })
        .await
    }

    pub async fn detail_table(&self) -> Result<Arc<TimeSeriesTable>> {
        load_once(&self.detail_table, ArtifactKind::DetailTable, &self.source, |source: &dyn ArtifactSource| {
            source.load_detail_table().map(Arc::new)
        })
        .await
    }

    pub fn is_loaded(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Model => self.model.initialized(),
            ArtifactKind::MainTable => self.main_table.initialized(),
            ArtifactKind::DetailTable => self.detail_table.initialized(),
        }
    }

    /// Loads everything up front instead of on first request.
    #[instrument(skip(self))]
    pub async fn preload(&self) -> Result<()> {
        self.model().await?;
        self.main_table().await?;
        self.detail_table().await?;
        debug!("All artifacts preloaded");
        Ok(())
    }
}

async fn load_once<T, F>(
    cell: &OnceCell<T>,
    kind: ArtifactKind,
    source: &Arc<dyn ArtifactSource>,
    load: F,
) -> Result<T>
where
    T: Clone + Send + 'static,
    F: FnOnce(&dyn ArtifactSource) -> Result<T> + Send + 'static,
{
    if let Some(value) = cell.get() {
        trace!(%kind, "Artifact cache hit");
        return Ok(value.clone());
    }

    let value = cell
        .get_or_try_init(|| async move {
            info!(%kind, "Loading artifact");
            let started = Instant::now();
            let source = Arc::clone(source);

            let loaded = tokio::task::spawn_blocking(move || load(source.as_ref()))
                .await
                .map_err(|e| DashboardError::Runtime(format!("Loader for {} failed: {}", kind, e)))??;

            info!(%kind, elapsed_ms = started.elapsed().as_millis() as u64, "Artifact loaded");
            Ok::<T, DashboardError>(loaded)
        })
        .await?;

    Ok(value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubSource, write_fixture_files};
    use std::sync::atomic::Ordering;

    #[tokio::test]
    async fn test_repeated_calls_return_same_instance() {
        let source = Arc::new(StubSource::new());
        let store = ArtifactStore::new(source.clone());

        let first_model = store.model().await.unwrap();
        let second_model = store.model().await.unwrap();
        let first_main = store.main_table().await.unwrap();
        let second_main = store.main_table().await.unwrap();
        let first_detail = store.detail_table().await.unwrap();
        let second_detail = store.detail_table().await.unwrap();

        assert!(Arc::ptr_eq(&first_model, &second_model));
        assert!(Arc::ptr_eq(&first_main, &second_main));
        assert!(Arc::ptr_eq(&first_detail, &second_detail));
        assert_eq!(source.model_loads.load(Ordering::SeqCst), 1);
        assert_eq!(source.main_loads.load(Ordering::SeqCst), 1);
        assert_eq!(source.detail_loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_access_loads_once() {
        let source = Arc::new(StubSource::slow(std::time::Duration::from_millis(50)));
        let store = Arc::new(ArtifactStore::new(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.main_table().await.unwrap() })
            })
            .collect();

        let mut tables = Vec::new();
        for handle in handles {
            tables.push(handle.await.unwrap());
        }

        assert_eq!(source.main_loads.load(Ordering::SeqCst), 1);
        assert!(tables.iter().all(|table| Arc::ptr_eq(table, &tables[0])));
    }

    #[tokio::test]
    async fn test_loads_are_lazy_and_independent() {
        let source = Arc::new(StubSource::new());
        let store = ArtifactStore::new(source.clone());

        assert!(!store.is_loaded(ArtifactKind::Model));
        store.main_table().await.unwrap();

        assert!(store.is_loaded(ArtifactKind::MainTable));
        assert!(!store.is_loaded(ArtifactKind::Model));
        assert_eq!(source.model_loads.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_load_is_not_cached() {
        let source = Arc::new(StubSource::new().failing_model_loads(1));
        let store = ArtifactStore::new(source.clone());

        let err = store.model().await.err().unwrap();
        assert!(matches!(err, DashboardError::Load { artifact: ArtifactKind::Model, .. }));
        assert!(!store.is_loaded(ArtifactKind::Model));

        assert!(store.model().await.is_ok());
        assert_eq!(source.model_loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_preload() {
        let source = Arc::new(StubSource::new());
        let store = ArtifactStore::new(source.clone());

        store.preload().await.unwrap();

        assert!(store.is_loaded(ArtifactKind::Model));
        assert!(store.is_loaded(ArtifactKind::MainTable));
        assert!(store.is_loaded(ArtifactKind::DetailTable));
    }

    #[tokio::test]
    async fn test_file_source_filters_detail_year() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_files(dir.path());
        let store = ArtifactStore::from_files(paths, 2007);

        let detail = store.detail_table().await.unwrap();
        assert_eq!(detail.len(), 3);
        assert!(detail.datetimes().iter().all(|dt| chrono::Datelike::year(dt) == 2007));

        let model = store.model().await.unwrap();
        assert_eq!(model.n_features(), 16);

        let main = store.main_table().await.unwrap();
        assert_eq!(main.len(), 4);
    }

    #[tokio::test]
    async fn test_file_source_reports_missing_and_malformed_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = write_fixture_files(dir.path());
        paths.model = dir.path().join("absent.json");
        std::fs::write(&paths.main_table, "Datetime,Kps\n2007-01-01,1.0\n").unwrap();
        let store = ArtifactStore::from_files(paths, 2007);

        assert!(matches!(
            store.model().await.err().unwrap(),
            DashboardError::Load { artifact: ArtifactKind::Model, .. }
        ));
        let err = store.main_table().await.err().unwrap();
        assert!(matches!(err, DashboardError::Load { artifact: ArtifactKind::MainTable, .. }));
        assert!(err.to_string().contains(PREDICTED_COLUMN));
    }

    #[tokio::test]
    async fn test_model_with_wrong_width_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_files(dir.path());
        std::fs::write(&paths.model, r#"{"intercept": 0.0, "coefficients": [1, 1, 1]}"#).unwrap();
        let store = ArtifactStore::from_files(paths, 2007);

        let err = store.model().await.err().unwrap();
        assert!(matches!(err, DashboardError::Load { artifact: ArtifactKind::Model, .. }));
        assert!(err.to_string().contains("takes 3 features"));
        assert!(!store.is_loaded(ArtifactKind::Model));
    }

    #[tokio::test]
    async fn test_detail_year_without_rows_still_loads() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_fixture_files(dir.path());
        let store = ArtifactStore::from_files(paths, 1990);

        let detail = store.detail_table().await.unwrap();
        assert!(detail.is_empty());
        assert_eq!(detail.accessor().column_names(), vec!["Kp_index", "Dst"]);
    }
}
