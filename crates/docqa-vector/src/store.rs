//! On-disk index snapshot.
//!
//! A snapshot is a LanceDB database in a fixed directory holding a `chunks`
//! table (one row per chunk with its vector) and a `meta` table with the
//! fingerprint of the file set it was built from. Snapshots are written
//! whole: `overwrite` removes the directory before recreating it.
use std::path::{Path, PathBuf};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, OnceLock};

use anyhow::{anyhow, Context, Result};
use arrow_array::cast::AsArray;
use arrow_array::types::Float32Type;
use arrow_array::{FixedSizeListArray, RecordBatch, StringArray, UInt32Array, UInt64Array};
use chrono::Utc;
use futures::TryStreamExt;
use lancedb::query::ExecutableQuery;
use lancedb::Connection;
use std::sync::Arc;
use tracing::{debug, info};

use docqa_core::{Chunk, Error};

use crate::fingerprint::Fingerprint;
use crate::schema::{build_chunks_schema, CHUNKS_TABLE, META_TABLE};
use crate::table::{create_with_batches, get_meta, has_table, open_db, write_meta};

const WRITE_BATCH_ROWS: usize = 1000;

pub const META_FINGERPRINT: &str = "fingerprint";
pub const META_EMBEDDER_ID: &str = "embedder_id";
pub const META_DIM: &str = "dim";
pub const META_CREATED_AT: &str = "created_at";

/// A chunk together with its embedding, in snapshot order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub vector: Vec<f32>,
}

/// Build locks shared by every store opened on the same directory path.
fn build_lock_for(dir: &Path) -> docqa_core::Result<Arc<Mutex<()>>> {
    static LOCKS: OnceLock<Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>> = OnceLock::new();
    let mut locks = LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .map_err(|_| Error::storage("snapshot lock registry poisoned"))?;
    Ok(locks.entry(dir.to_path_buf()).or_default().clone())
}

pub struct SnapshotStore {
    dir: PathBuf,
    runtime: tokio::runtime::Runtime,
    build_lock: Arc<Mutex<()>>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> docqa_core::Result<Self> {
        let dir = dir.into();
        let runtime = tokio::runtime::Runtime::new().map_err(Error::storage)?;
        let build_lock = build_lock_for(&dir)?;
        Ok(Self { dir, runtime, build_lock })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Serializes builds against this directory across all stores in the process.
    pub(crate) fn lock_build(&self) -> docqa_core::Result<MutexGuard<'_, ()>> {
        self.build_lock.lock().map_err(|_| Error::storage("snapshot build lock poisoned"))
    }

    fn uri(&self) -> String {
        self.dir.to_string_lossy().to_string()
    }

    async fn connect(&self) -> Result<Option<Connection>> {
        if !self.dir.is_dir() { return Ok(None); }
        Ok(Some(open_db(&self.uri()).await?))
    }

    pub fn exists(&self) -> docqa_core::Result<bool> {
        self.runtime
            .block_on(async {
                match self.connect().await? {
                    Some(conn) => has_table(&conn, CHUNKS_TABLE).await,
                    None => Ok(false),
                }
            })
            .map_err(Error::storage)
    }

    pub fn is_empty(&self) -> docqa_core::Result<bool> {
        self.runtime
            .block_on(async {
                let Some(conn) = self.connect().await? else { return Ok(true) };
                if !has_table(&conn, CHUNKS_TABLE).await? { return Ok(true); }
                let table = conn.open_table(CHUNKS_TABLE).execute().await?;
                Ok::<_, anyhow::Error>(table.count_rows(None).await? == 0)
            })
            .map_err(Error::storage)
    }

    pub fn fingerprint(&self) -> docqa_core::Result<Option<Fingerprint>> {
        self.meta(META_FINGERPRINT).map(|v| v.map(Fingerprint::from_hex))
    }

    pub fn embedder_id(&self) -> docqa_core::Result<Option<String>> {
        self.meta(META_EMBEDDER_ID)
    }

    /// Vector width recorded when the snapshot was written.
    pub fn dim(&self) -> docqa_core::Result<Option<usize>> {
        self.meta(META_DIM).map(|v| v.and_then(|d| d.parse().ok()))
    }

    fn meta(&self, key: &str) -> docqa_core::Result<Option<String>> {
        self.runtime
            .block_on(async {
                match self.connect().await? {
                    Some(conn) => get_meta(&conn, META_TABLE, key).await,
                    None => Ok(None),
                }
            })
            .map_err(Error::storage)
    }

    /// All stored chunks and vectors in insertion order.
    pub fn load(&self) -> docqa_core::Result<Vec<IndexedChunk>> {
        self.runtime.block_on(self.load_async()).map_err(Error::storage)
    }

    async fn load_async(&self) -> Result<Vec<IndexedChunk>> {
        let conn = self.connect().await?.ok_or_else(|| anyhow!("no snapshot at {}", self.dir.display()))?;
        let table = conn.open_table(CHUNKS_TABLE).execute().await?;
        let mut rows: Vec<(u64, IndexedChunk)> = Vec::new();
        let mut stream = table.query().execute().await?;
        while let Some(batch) = stream.try_next().await? {
            rows.extend(decode_batch(&batch)?);
        }
        rows.sort_by_key(|(position, _)| *position);
        debug!("loaded {} rows from {}", rows.len(), self.dir.display());
        Ok(rows.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Replace whatever is on disk with a fresh snapshot of `entries`.
    pub fn overwrite(&self, fingerprint: &Fingerprint, embedder_id: &str, entries: &[IndexedChunk]) -> docqa_core::Result<()> {
        if self.dir.exists() {
            std::fs::remove_dir_all(&self.dir).map_err(Error::storage)?;
        }
        std::fs::create_dir_all(&self.dir).map_err(Error::storage)?;
        self.runtime
            .block_on(self.write_async(fingerprint, embedder_id, entries))
            .map_err(Error::storage)?;
        info!("wrote snapshot of {} chunks to {}", entries.len(), self.dir.display());
        Ok(())
    }

    async fn write_async(&self, fingerprint: &Fingerprint, embedder_id: &str, entries: &[IndexedChunk]) -> Result<()> {
        let dim = entries.first().map(|e| e.vector.len()).unwrap_or(0);
        let dim = i32::try_from(dim).context("embedding dimension too large")?;
        let conn = open_db(&self.uri()).await?;
        let schema = build_chunks_schema(dim);
        let mut batches = Vec::new();
        for (offset, rows) in entries.chunks(WRITE_BATCH_ROWS).enumerate() {
            batches.push(encode_batch(offset * WRITE_BATCH_ROWS, rows, dim)?);
        }
        create_with_batches(&conn, CHUNKS_TABLE, schema, batches).await?;
        write_meta(
            &conn,
            META_TABLE,
            &[
                (META_FINGERPRINT, fingerprint.to_string()),
                (META_EMBEDDER_ID, embedder_id.to_string()),
                (META_DIM, dim.to_string()),
                (META_CREATED_AT, Utc::now().to_rfc3339()),
            ],
        )
        .await
    }
}

fn encode_batch(start: usize, rows: &[IndexedChunk], dim: i32) -> Result<RecordBatch> {
    let mut positions = Vec::with_capacity(rows.len());
    let mut texts = Vec::with_capacity(rows.len());
    let mut sources = Vec::with_capacity(rows.len());
    let mut pages = Vec::with_capacity(rows.len());
    let mut vectors: Vec<Option<Vec<Option<f32>>>> = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        positions.push((start + i) as u64);
        texts.push(row.chunk.text.clone());
        sources.push(row.chunk.source_name.clone());
        pages.push(row.chunk.page_number);
        vectors.push(Some(row.vector.iter().map(|&x| Some(x)).collect()));
    }
    Ok(RecordBatch::try_new(
        build_chunks_schema(dim),
        vec![
            Arc::new(UInt64Array::from(positions)),
            Arc::new(StringArray::from(texts)),
            Arc::new(StringArray::from(sources)),
            Arc::new(UInt32Array::from(pages)),
            Arc::new(FixedSizeListArray::from_iter_primitive::<Float32Type, _, _>(vectors.into_iter(), dim)),
        ],
    )?)
}

fn decode_batch(batch: &RecordBatch) -> Result<Vec<(u64, IndexedChunk)>> {
    let positions = batch
        .column_by_name("position")
        .and_then(|c| c.as_any().downcast_ref::<UInt64Array>())
        .ok_or_else(|| anyhow!("chunks.position column missing"))?;
    let texts = batch
        .column_by_name("text")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("chunks.text column missing"))?;
    let sources = batch
        .column_by_name("source_name")
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| anyhow!("chunks.source_name column missing"))?;
    let pages = batch
        .column_by_name("page_number")
        .and_then(|c| c.as_any().downcast_ref::<UInt32Array>())
        .ok_or_else(|| anyhow!("chunks.page_number column missing"))?;
    let vectors = batch
        .column_by_name("vector")
        .and_then(|c| c.as_any().downcast_ref::<FixedSizeListArray>())
        .ok_or_else(|| anyhow!("chunks.vector column missing"))?;
    let mut out = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        let list = vectors.value(i);
        let vector = list.as_primitive::<Float32Type>().values().iter().copied().collect::<Vec<f32>>();
        let chunk = Chunk::new(texts.value(i), sources.value(i), pages.value(i));
        out.push((positions.value(i), IndexedChunk { chunk, vector }));
    }
    Ok(out)
}
