//! Asynchronous and parallel engine APIs.
//!
//! [`AsyncEngine`] wraps an [`Engine`] for use from async code, reading
//! script files with non-blocking I/O. [`ParallelCompiler`] parses and
//! compiles independent sources on a thread pool; compilers share no state,
//! so each source gets its own.
//!
//! # Example
//!
//! ```ignore
//! use datum_script::AsyncEngine;
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = AsyncEngine::new();
//!     let result = engine.eval_file("script.ds").await.unwrap();
//!     println!("{}", result);
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::fs;
use tokio::sync::RwLock;

use crate::runtime::value::Value;
use crate::{Engine, Error};

/// An asynchronous engine.
///
/// Evaluations take a write lock, so programs never interleave on the shared
/// global scope.
#[derive(Debug, Clone, Default)]
pub struct AsyncEngine {
    engine: Arc<RwLock<Engine>>,
}

impl AsyncEngine {
    /// Creates a new async engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluates source code.
    ///
    /// Parsing and compilation happen before the lock is taken.
    pub async fn eval(&self, source: &str) -> Result<Value, Error> {
        let program = crate::compile(source)?;
        let mut engine = self.engine.write().await;
        engine.run(&program)
    }

    /// Evaluates a script file, reading it with tokio's async file I/O.
    pub async fn eval_file(&self, path: impl AsRef<Path>) -> Result<Value, Error> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)
            .await
            .map_err(|e| Error::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        self.eval(&source).await
    }

    /// Evaluates multiple script files concurrently.
    ///
    /// Files are read concurrently; results are returned in input order.
    pub async fn eval_files(&self, paths: &[impl AsRef<Path>]) -> Vec<Result<Value, Error>> {
        let futures: Vec<_> = paths.iter().map(|p| self.eval_file(p)).collect();
        futures::future::join_all(futures).await
    }

    /// Reads a global.
    pub async fn get_global(&self, name: &str) -> Option<Value> {
        self.engine.read().await.get_global(name)
    }

    /// Takes the lines written by `print` since the last call.
    pub async fn take_output(&self) -> Vec<String> {
        self.engine.write().await.take_output()
    }
}

impl From<Engine> for AsyncEngine {
    fn from(engine: Engine) -> Self {
        Self {
            engine: Arc::new(RwLock::new(engine)),
        }
    }
}

/// Compiles independent sources on a thread pool.
#[cfg(all(feature = "async", feature = "parallel"))]
#[derive(Debug)]
pub struct ParallelCompiler {
    /// Thread pool for CPU-bound work
    pool: rayon::ThreadPool,
}

#[cfg(all(feature = "async", feature = "parallel"))]
impl ParallelCompiler {
    /// Creates a parallel compiler with the default number of threads.
    pub fn new() -> Result<Self, Error> {
        Self::build(rayon::ThreadPoolBuilder::new())
    }

    /// Creates a parallel compiler with a specific number of threads.
    pub fn with_threads(num_threads: usize) -> Result<Self, Error> {
        Self::build(rayon::ThreadPoolBuilder::new().num_threads(num_threads))
    }

    fn build(builder: rayon::ThreadPoolBuilder) -> Result<Self, Error> {
        let pool = builder
            .build()
            .map_err(|e| Error::InternalError(format!("Failed to create thread pool: {}", e)))?;
        Ok(Self { pool })
    }

    /// Compiles multiple sources in parallel. Results are in input order.
    pub fn compile_parallel(&self, sources: &[&str]) -> Vec<Result<crate::Program, Error>> {
        use rayon::prelude::*;

        self.pool
            .install(|| sources.par_iter().map(|source| crate::compile(source)).collect())
    }

    /// Parses multiple sources in parallel. Results are in input order.
    pub fn parse_parallel(&self, sources: &[&str]) -> Vec<Result<crate::CstNode, Error>> {
        use rayon::prelude::*;

        self.pool
            .install(|| sources.par_iter().map(|source| crate::parse(source)).collect())
    }
}
