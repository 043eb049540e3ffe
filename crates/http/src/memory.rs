use crate::GridFetcher;
use async_trait::async_trait;
use indexmap::IndexMap;
use sheetseek_core::{Grid, SeekError, SeekResult, SheetInfo};

/// Serves fixed grids for one source. Useful offline and in tests.
///
/// Sheet ids are the position of the sheet in insertion order. Ranges are
/// ignored; the whole grid is always returned.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFetcher {
    source_id: String,
    sheets: IndexMap<String, Grid>,
}

impl InMemoryFetcher {
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            sheets: IndexMap::new(),
        }
    }

    /// Add or replace a sheet.
    #[must_use]
    pub fn with_sheet(mut self, name: impl Into<String>, grid: Grid) -> Self {
        self.sheets.insert(name.into(), grid);
        self
    }

    fn check_source(&self, source_id: &str) -> SeekResult<()> {
        if source_id == self.source_id {
            Ok(())
        } else {
            Err(SeekError::network(format!("unknown source '{source_id}'")))
        }
    }
}

#[async_trait]
impl GridFetcher for InMemoryFetcher {
    async fn fetch_available_sheets(&self, source_id: &str) -> SeekResult<Vec<SheetInfo>> {
        self.check_source(source_id)?;
        Ok(self
            .sheets
            .keys()
            .enumerate()
            .map(|(i, name)| SheetInfo {
                id: i.to_string(),
                name: name.clone(),
            })
            .collect())
    }

    async fn fetch_range(
        &self,
        source_id: &str,
        sheet_name: &str,
        _range: Option<&str>,
    ) -> SeekResult<Grid> {
        self.check_source(source_id)?;
        self.sheets
            .get(sheet_name)
            .cloned()
            .ok_or_else(|| SeekError::not_found(sheet_name))
    }
}
