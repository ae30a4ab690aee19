//! Explicit render session
//!
//! Owns the current field, the current parameter snapshot and the latest
//! streamline set. Callers drive regeneration either synchronously
//! ([`Session::regenerate`]) or on tokio's blocking pool
//! ([`Session::spawn_generation`] + [`Session::poll`] / [`Session::wait`]).
//! Starting a new background pass cancels the one in flight; only the most
//! recent pass can ever install its result.

use crate::config::RenderParameters;
use crate::error::{FlowError, Result};
use crate::export::svg_document;
use crate::field::{Field, FlowGrid};
use crate::flow::{CancelToken, Generation, GenerationStats, StyledStreamline};
use crate::pipeline::{generate_async, run_generation};
use futures::FutureExt;
use std::path::Path;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// State of the session's streamline set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStatus {
    /// Nothing generated since the last field or parameter change
    Idle,
    /// A background pass is running
    Busy,
    /// The streamline set matches the current field and parameters
    Ready,
}

struct Job {
    handle: JoinHandle<Result<Generation>>,
    cancel: CancelToken,
}

pub struct Session {
    field: Option<Arc<Field>>,
    params: RenderParameters,
    streamlines: Vec<StyledStreamline>,
    stats: Option<GenerationStats>,
    job: Option<Job>,
}

impl Session {
    pub fn new(params: RenderParameters) -> Self {
        Self {
            field: None,
            params,
            streamlines: Vec::new(),
            stats: None,
            job: None,
        }
    }

    /// Replace the field; any in-flight pass and the current result are dropped
    pub fn load_grid(&mut self, grid: &FlowGrid) -> Result<()> {
        let field = Field::new(grid)?;
        log::info!(
            "Loaded {}x{} flow field (max speed {:.4})",
            field.width(),
            field.height(),
            field.max_speed()
        );
        self.cancel();
        self.field = Some(Arc::new(field));
        self.clear_result();
        Ok(())
    }

    /// Load a grid JSON file
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let grid = FlowGrid::from_path(path)?;
        self.load_grid(&grid)
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_deref()
    }

    pub fn parameters(&self) -> &RenderParameters {
        &self.params
    }

    /// Replace the parameter snapshot
    ///
    /// A changed snapshot cancels any in-flight pass and drops the current result.
    pub fn set_parameters(&mut self, params: RenderParameters) {
        if params != self.params {
            self.cancel();
            self.params = params;
            self.clear_result();
        }
    }

    pub fn streamlines(&self) -> &[StyledStreamline] {
        &self.streamlines
    }

    pub fn stats(&self) -> Option<GenerationStats> {
        self.stats
    }

    /// Generate on the calling thread
    ///
    /// Fails with `FlowError::Busy` while a background pass is running.
    pub fn regenerate(&mut self) -> Result<&[StyledStreamline]> {
        if self.job.is_some() {
            return Err(FlowError::Busy);
        }
        let field = self.field.clone().ok_or(FlowError::NoField)?;
        let generation = run_generation(&field, &self.params, &CancelToken::new())?;
        self.install(generation);
        Ok(&self.streamlines)
    }

    /// Start a background pass, cancelling any pass already running
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn_generation(&mut self) -> Result<()> {
        let field = self.field.clone().ok_or(FlowError::NoField)?;
        self.cancel();

        let cancel = CancelToken::new();
        let handle = tokio::spawn(generate_async(field, self.params.clone(), cancel.clone()));
        self.job = Some(Job { handle, cancel });
        log::debug!("Background generation started");
        Ok(())
    }

    /// Check on the background pass without blocking
    ///
    /// A finished pass is installed and reported as `Ready`; its error, if
    /// any, is returned instead.
    pub fn poll(&mut self) -> Result<GenerationStatus> {
        let Some(job) = self.job.as_mut() else {
            return Ok(self.settled_status());
        };

        match (&mut job.handle).now_or_never() {
            None => Ok(GenerationStatus::Busy),
            Some(joined) => {
                self.job = None;
                let generation = joined.map_err(|e| FlowError::Join(e.to_string()))??;
                self.install(generation);
                Ok(GenerationStatus::Ready)
            }
        }
    }

    /// Wait for the background pass and install its result
    ///
    /// Returns the current result immediately when nothing is running.
    pub async fn wait(&mut self) -> Result<&[StyledStreamline]> {
        if let Some(job) = self.job.take() {
            let generation = job
                .handle
                .await
                .map_err(|e| FlowError::Join(e.to_string()))??;
            self.install(generation);
        }
        Ok(&self.streamlines)
    }

    /// Cancel the background pass, if any; the previous result is kept
    pub fn cancel(&mut self) {
        if let Some(job) = self.job.take() {
            job.cancel.cancel();
            log::debug!("Background generation cancelled");
        }
    }

    /// Serialize the current streamline set
    pub fn export_svg(&self) -> Result<String> {
        let field = self.field.as_ref().ok_or(FlowError::NoField)?;
        Ok(svg_document(
            field.width(),
            field.height(),
            &self.streamlines,
            &self.params.svg_options(),
        ))
    }

    fn settled_status(&self) -> GenerationStatus {
        if self.stats.is_some() {
            GenerationStatus::Ready
        } else {
            GenerationStatus::Idle
        }
    }

    fn install(&mut self, generation: Generation) {
        self.streamlines = generation.streamlines;
        self.stats = Some(generation.stats);
    }

    fn clear_result(&mut self) {
        self.streamlines.clear();
        self.stats = None;
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(RenderParameters::default())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(size: usize) -> FlowGrid {
        let depth: Vec<Vec<f64>> = (0..size)
            .map(|_| (0..size).map(|x| x as f64 / (size - 1) as f64).collect())
            .collect();
        FlowGrid::new(
            size,
            size,
            vec![vec![1.0; size]; size],
            vec![vec![0.3; size]; size],
            depth,
        )
        .unwrap()
    }

    fn params() -> RenderParameters {
        RenderParameters {
            density: 1.0,
            seed: Some(21),
            ..RenderParameters::default()
        }
    }

    #[test]
    fn test_operations_need_a_field() {
        let mut session = Session::new(params());
        assert!(matches!(session.regenerate(), Err(FlowError::NoField)));
        assert!(matches!(session.export_svg(), Err(FlowError::NoField)));
        assert_eq!(session.poll().unwrap(), GenerationStatus::Idle);
    }

    #[test]
    fn test_regenerate_then_parameter_change_goes_stale() {
        let mut session = Session::new(params());
        session.load_grid(&grid(50)).unwrap();
        let count = session.regenerate().unwrap().len();
        assert!(count > 0);
        assert_eq!(session.poll().unwrap(), GenerationStatus::Ready);
        assert_eq!(session.stats().map(|s| s.kept), Some(count));

        // identical parameters keep the result
        session.set_parameters(params());
        assert_eq!(session.poll().unwrap(), GenerationStatus::Ready);

        session.set_parameters(RenderParameters {
            density: 2.0,
            ..params()
        });
        assert_eq!(session.poll().unwrap(), GenerationStatus::Idle);
        assert!(session.streamlines().is_empty());
    }

    #[test]
    fn test_bad_grid_keeps_previous_field() {
        let mut session = Session::new(params());
        session.load_grid(&grid(20)).unwrap();
        let bad = FlowGrid {
            width: 1,
            height: 5,
            u: vec![vec![0.0]; 5],
            v: vec![vec![0.0]; 5],
            depth: vec![vec![0.0]; 5],
        };
        assert!(session.load_grid(&bad).is_err());
        assert_eq!(session.field().map(|f| f.width()), Some(20));
    }

    #[tokio::test]
    async fn test_background_generation_matches_sync() {
        let mut sync = Session::new(params());
        sync.load_grid(&grid(50)).unwrap();
        let expected = sync.regenerate().unwrap().to_vec();

        let mut session = Session::new(params());
        session.load_grid(&grid(50)).unwrap();
        session.spawn_generation().unwrap();
        assert!(matches!(session.regenerate(), Err(FlowError::Busy)));
        let lines = session.wait().await.unwrap();
        assert_eq!(lines, expected.as_slice());
        assert_eq!(session.poll().unwrap(), GenerationStatus::Ready);
    }

    #[tokio::test]
    async fn test_respawn_cancels_previous_pass() {
        let mut session = Session::new(params());
        session.load_grid(&grid(40)).unwrap();
        session.spawn_generation().unwrap();
        session.spawn_generation().unwrap();
        let lines = session.wait().await.unwrap();
        assert!(!lines.is_empty());
    }

    #[tokio::test]
    async fn test_parameter_change_discards_running_pass() {
        let mut session = Session::new(params());
        session.load_grid(&grid(50)).unwrap();
        session.spawn_generation().unwrap();
        session.set_parameters(RenderParameters {
            density: 2.0,
            ..params()
        });
        assert!(session.wait().await.unwrap().is_empty());
        assert_eq!(session.poll().unwrap(), GenerationStatus::Idle);
        assert_eq!(session.stats(), None);

        // the next pass runs with the new snapshot
        session.spawn_generation().unwrap();
        session.wait().await.unwrap();
        assert_eq!(session.stats().map(|s| s.seeds), Some(196));
    }

    #[tokio::test]
    async fn test_export_after_wait() {
        let mut session = Session::new(params());
        session.load_grid(&grid(40)).unwrap();
        session.spawn_generation().unwrap();
        let kept = session.wait().await.unwrap().len();
        let svg = session.export_svg().unwrap();
        assert_eq!(svg.matches("<path").count(), kept);
    }
}
