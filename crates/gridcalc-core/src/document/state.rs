use crate::error::Result;
use dashmap::DashMap;
use gridcalc_engine::engine::{CellKey, DisplayMap, Engine, EngineConfig};
use std::path::PathBuf;
use std::sync::Arc;

/// Thread-safe sparse store of raw cell text.
pub type Grid = Arc<DashMap<CellKey, String>>;

/// UI-agnostic workbook state: the cell store plus the last recompute.
pub struct Workbook {
    /// Raw cell text (DashMap is internally sharded, Arc clones are cheap)
    pub grid: Grid,
    /// Formula engine used for recomputes
    pub engine: Engine,
    /// File the workbook was loaded from
    pub file_path: Option<PathBuf>,
    /// Display text from the last recompute
    pub(crate) display: DisplayMap,
    /// Whether cells changed since the last recompute
    pub(crate) dirty: bool,
}

impl Workbook {
    /// Create an empty workbook.
    ///
    /// This constructor is side-effect free: it does not touch the filesystem.
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Workbook {
            grid: Arc::new(DashMap::new()),
            engine: Engine::new(config),
            file_path: None,
            display: DisplayMap::new(),
            dirty: false,
        }
    }

    /// Create a workbook from a `.grd` snapshot file.
    pub fn with_file(path: PathBuf, config: EngineConfig) -> Result<Self> {
        let mut workbook = Self::with_config(config);
        workbook.grid = crate::storage::parse_grd(&path)?;
        workbook.file_path = Some(path);
        workbook.dirty = true;
        Ok(workbook)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
