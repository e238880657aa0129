//! The viewer's single state slot.
//!
//! A load or sheet switch produces a fresh [`SheetView`] and swaps it in
//! whole; nothing is mutated in place. Loads are tagged with a
//! [`LoadTicket`] so that, when several are in flight, only the most recently
//! started one may commit.

use crate::error::{LogsheetError, Result};
use crate::file_info::FileInfo;
use crate::loader::load_sheet;
use crate::parser;
use crate::render::{render_page, PageModel, RenderOptions};
use crate::types::{SheetView, Workbook};

/// Issued by [`ViewerState::begin_load`]; only the newest ticket can commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

#[derive(Debug, Default)]
pub struct ViewerState {
    workbook: Option<Workbook>,
    view: Option<SheetView>,
    file_info: Option<FileInfo>,
    last_error: Option<String>,
    generation: u64,
}

impl ViewerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation = self.generation.wrapping_add(1);
        LoadTicket(self.generation)
    }

    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Parse `data`, load its first sheet and commit the result.
    ///
    /// On failure the previous workbook, view and file info stay in place and
    /// the error message is kept for display.
    ///
    /// # Errors
    /// [`LogsheetError::Superseded`] when a newer load has started since
    /// `ticket` was issued; the state is left untouched. Otherwise any parse
    /// or load error.
    pub fn finish_load(&mut self, ticket: LoadTicket, data: &[u8], info: FileInfo) -> Result<()> {
        if !self.is_current(ticket) {
            log::debug!("dropping stale load of {:?}", info.name);
            return Err(LogsheetError::Superseded);
        }

        let loaded = parser::parse(data)
            .and_then(|workbook| load_sheet(&workbook, None).map(|view| (workbook, view)));
        match loaded {
            Ok((workbook, view)) => {
                log::debug!(
                    "loaded {:?}: {} sheets, showing {:?}",
                    info.name,
                    workbook.sheets.len(),
                    view.sheet_name
                );
                self.workbook = Some(workbook);
                self.view = Some(view);
                self.file_info = Some(info);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to load {:?}: {err}", info.name);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// [`begin_load`](Self::begin_load) followed by
    /// [`finish_load`](Self::finish_load).
    ///
    /// # Errors
    /// See [`finish_load`](Self::finish_load).
    pub fn load(&mut self, data: &[u8], info: FileInfo) -> Result<()> {
        let ticket = self.begin_load();
        self.finish_load(ticket, data, info)
    }

    /// Show another sheet of the current workbook.
    ///
    /// # Errors
    /// [`LogsheetError::SheetNotFound`] when no workbook is loaded or it has
    /// no sheet by that name. The current view is kept.
    pub fn switch_sheet(&mut self, name: &str) -> Result<()> {
        let result = match &self.workbook {
            Some(workbook) => load_sheet(workbook, Some(name)),
            None => Err(LogsheetError::SheetNotFound(name.to_string())),
        };
        match result {
            Ok(view) => {
                self.view = Some(view);
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to switch to sheet {name:?}: {err}");
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.workbook
            .as_ref()
            .map(|wb| wb.sheet_names().collect())
            .unwrap_or_default()
    }

    /// Name of the sheet currently shown.
    pub fn active_sheet(&self) -> Option<&str> {
        self.view.as_ref().map(|v| v.sheet_name.as_str())
    }

    pub fn workbook(&self) -> Option<&Workbook> {
        self.workbook.as_ref()
    }

    pub fn view(&self) -> Option<&SheetView> {
        self.view.as_ref()
    }

    pub fn file_info(&self) -> Option<&FileInfo> {
        self.file_info.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn page_model(&self) -> PageModel<'_> {
        PageModel {
            workbook: self.workbook(),
            active_sheet: self.active_sheet(),
            file_info: self.file_info(),
            error: self.last_error(),
            view: self.view(),
        }
    }

    /// Render the whole page from the current state.
    pub fn render_html(&self, options: &RenderOptions) -> String {
        render_page(&self.page_model(), options)
    }
}
