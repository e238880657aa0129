//! `SheetViewer` - the entry point exported to JavaScript.
//!
//! Wraps the [`ViewerState`] slot and, in the browser, keeps a mounted root
//! element in sync with it:
//! - the file input loads the chosen file (latest selection wins)
//! - sheet tab clicks switch the active sheet
//!
//! Event handlers are registered by `mount`, no JavaScript wiring required.

mod state;

pub use state::{LoadTicket, ViewerState};

use std::cell::{Ref, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use js_sys::{Promise, Uint8Array};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::{future_to_promise, spawn_local, JsFuture};
#[cfg(target_arch = "wasm32")]
use web_sys::{Element, Event, File, HtmlElement, HtmlInputElement};

#[cfg(target_arch = "wasm32")]
use crate::error::LogsheetError;
use crate::file_info::FileInfo;
use crate::render::RenderOptions;

/// DOM listeners attached to the mounted root.
#[cfg(target_arch = "wasm32")]
struct Mount {
    root: HtmlElement,
    click: Closure<dyn FnMut(Event)>,
    change: Closure<dyn FnMut(Event)>,
}

#[cfg(target_arch = "wasm32")]
impl Mount {
    fn detach(&self) {
        let _ = self
            .root
            .remove_event_listener_with_callback("click", self.click.as_ref().unchecked_ref());
        let _ = self
            .root
            .remove_event_listener_with_callback("change", self.change.as_ref().unchecked_ref());
    }
}

/// The viewer exported to JavaScript.
#[wasm_bindgen]
pub struct SheetViewer {
    state: Rc<RefCell<ViewerState>>,
    options: Rc<RenderOptions>,
    #[cfg(target_arch = "wasm32")]
    mount: Option<Mount>,
}

impl Default for SheetViewer {
    fn default() -> Self {
        Self::with_options(RenderOptions::default())
    }
}

impl SheetViewer {
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            state: Rc::new(RefCell::new(ViewerState::new())),
            options: Rc::new(options),
            #[cfg(target_arch = "wasm32")]
            mount: None,
        }
    }

    /// Read access to the state slot.
    pub fn state(&self) -> Ref<'_, ViewerState> {
        self.state.borrow()
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }
}

// ============================================================================
// WASM32 Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl SheetViewer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self::default()
    }

    /// Load workbook bytes with the metadata of the file they came from.
    pub fn load(
        &mut self,
        data: &[u8],
        name: String,
        size: f64,
        mime_type: String,
        last_modified: f64,
    ) -> Result<(), JsValue> {
        let info = file_info_from_js(name, size, mime_type, last_modified);
        let result = self.state.borrow_mut().load(data, info);
        self.refresh();
        result.map_err(JsValue::from)
    }

    /// Read a `File` and load it. Resolves to `true` when this load was
    /// committed and `false` when a newer load replaced it; rejects with the
    /// load error otherwise.
    #[wasm_bindgen(js_name = "loadFile")]
    pub fn load_file(&self, file: File) -> Promise {
        let state = Rc::clone(&self.state);
        let target = self.mount_target();
        future_to_promise(async move {
            let committed = read_and_load(&state, file, target.as_ref()).await?;
            Ok(JsValue::from_bool(committed))
        })
    }

    #[wasm_bindgen(js_name = "switchSheet")]
    pub fn switch_sheet(&mut self, name: &str) -> Result<(), JsValue> {
        let result = self.state.borrow_mut().switch_sheet(name);
        self.refresh();
        result.map_err(JsValue::from)
    }

    #[wasm_bindgen(js_name = "renderHtml")]
    pub fn render_html(&self) -> String {
        self.state.borrow().render_html(&self.options)
    }

    #[wasm_bindgen(js_name = "sheetNames")]
    pub fn sheet_names(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        serde_wasm_bindgen::to_value(&state.sheet_names())
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    #[wasm_bindgen(js_name = "activeSheet")]
    pub fn active_sheet(&self) -> Option<String> {
        self.state.borrow().active_sheet().map(str::to_string)
    }

    #[wasm_bindgen(js_name = "lastError")]
    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().last_error().map(str::to_string)
    }

    /// The current `SheetView` as a JS object, or `null` when none is loaded.
    #[wasm_bindgen(js_name = "viewJs")]
    pub fn view_js(&self) -> Result<JsValue, JsValue> {
        let state = self.state.borrow();
        match state.view() {
            Some(view) => serde_wasm_bindgen::to_value(view)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}"))),
            None => Ok(JsValue::NULL),
        }
    }

    /// Render into `root` and keep it updated on tab clicks and file choice.
    pub fn mount(&mut self, root: HtmlElement) -> Result<(), JsValue> {
        if let Some(previous) = self.mount.take() {
            previous.detach();
        }

        let click = {
            let state = Rc::clone(&self.state);
            let options = Rc::clone(&self.options);
            let root = root.clone();
            Closure::wrap(Box::new(move |event: Event| {
                let Some(name) = clicked_sheet(&event) else {
                    return;
                };
                let result = state.borrow_mut().switch_sheet(&name);
                if let Err(err) = result {
                    report_error(&err);
                }
                root.set_inner_html(&state.borrow().render_html(&options));
            }) as Box<dyn FnMut(Event)>)
        };

        let change = {
            let state = Rc::clone(&self.state);
            let options = Rc::clone(&self.options);
            let root = root.clone();
            Closure::wrap(Box::new(move |event: Event| {
                let Some(file) = chosen_file(&event) else {
                    return;
                };
                let state = Rc::clone(&state);
                let target = (root.clone(), Rc::clone(&options));
                spawn_local(async move {
                    if let Err(err) = read_and_load(&state, file, Some(&target)).await {
                        web_sys::console::error_1(&err);
                    }
                });
            }) as Box<dyn FnMut(Event)>)
        };

        root.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        root.add_event_listener_with_callback("change", change.as_ref().unchecked_ref())?;
        root.set_inner_html(&self.render_html());

        self.mount = Some(Mount {
            root,
            click,
            change,
        });
        Ok(())
    }

    /// Remove listeners added by `mount`. The rendered markup stays.
    pub fn unmount(&mut self) {
        if let Some(mount) = self.mount.take() {
            mount.detach();
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl SheetViewer {
    fn refresh(&self) {
        if let Some(mount) = &self.mount {
            mount.root.set_inner_html(&self.render_html());
        }
    }

    fn mount_target(&self) -> Option<(HtmlElement, Rc<RenderOptions>)> {
        self.mount
            .as_ref()
            .map(|m| (m.root.clone(), Rc::clone(&self.options)))
    }
}

#[cfg(target_arch = "wasm32")]
impl Drop for SheetViewer {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Read the file, then commit it unless a newer load started meanwhile.
/// Returns `false` when the load was superseded.
#[cfg(target_arch = "wasm32")]
async fn read_and_load(
    state: &Rc<RefCell<ViewerState>>,
    file: File,
    target: Option<&(HtmlElement, Rc<RenderOptions>)>,
) -> Result<bool, JsValue> {
    let ticket = state.borrow_mut().begin_load();
    let info = file_info_from_js(file.name(), file.size(), file.type_(), file.last_modified());

    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = Uint8Array::new(&buffer).to_vec();

    let result = state.borrow_mut().finish_load(ticket, &bytes, info);
    if matches!(result, Err(LogsheetError::Superseded)) {
        return Ok(false);
    }
    if let Some((root, options)) = target {
        root.set_inner_html(&state.borrow().render_html(options));
    }
    result.map(|()| true).map_err(JsValue::from)
}

#[cfg(target_arch = "wasm32")]
fn clicked_sheet(event: &Event) -> Option<String> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let tab = target.closest("[data-sheet]").ok()??;
    tab.get_attribute("data-sheet")
}

#[cfg(target_arch = "wasm32")]
fn chosen_file(event: &Event) -> Option<File> {
    let input = event.target()?.dyn_into::<HtmlInputElement>().ok()?;
    if input.type_() != "file" {
        return None;
    }
    input.files()?.get(0)
}

#[cfg(target_arch = "wasm32")]
fn report_error(err: &LogsheetError) {
    web_sys::console::error_1(&JsValue::from_str(&err.to_string()));
}

#[cfg(target_arch = "wasm32")]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn file_info_from_js(name: String, size: f64, mime_type: String, last_modified: f64) -> FileInfo {
    FileInfo::new(
        name,
        size.max(0.0) as u64,
        mime_type,
        last_modified as i64,
    )
}

// ============================================================================
// Non-WASM32 Implementation
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl SheetViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Errors
    /// See [`ViewerState::finish_load`].
    pub fn load(&mut self, data: &[u8], info: FileInfo) -> crate::error::Result<()> {
        self.state.borrow_mut().load(data, info)
    }

    /// # Errors
    /// See [`ViewerState::switch_sheet`].
    pub fn switch_sheet(&mut self, name: &str) -> crate::error::Result<()> {
        self.state.borrow_mut().switch_sheet(name)
    }

    pub fn render_html(&self) -> String {
        self.state.borrow().render_html(&self.options)
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.state
            .borrow()
            .sheet_names()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
