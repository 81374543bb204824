use crate::backtracking_search::{find_fill, FillFailure, SearchOptions, TieBreak};
use crate::grid_config::{generate_grid_config_from_template_string, render_grid};
use crate::word_list::WordList;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn initialize() {
    // Set the panic hook for better error messages
    crate::set_panic_hook();
}

/// Load the word list content, fetching it first if we were given an http(s) URL. Anything
/// else is treated as the word list itself.
async fn load_word_list_contents(word_list_source: String) -> Result<String, JsError> {
    if !(word_list_source.starts_with("http://") || word_list_source.starts_with("https://")) {
        return Ok(word_list_source);
    }

    use wasm_bindgen::JsCast;
    let window = web_sys::window().ok_or_else(|| JsError::new("No window available"))?;
    let resp_value = wasm_bindgen_futures::JsFuture::from(window.fetch_with_str(&word_list_source))
        .await
        .map_err(|_| JsError::new("Failed to fetch word list"))?;
    let response: web_sys::Response = resp_value
        .dyn_into()
        .map_err(|_| JsError::new("Unexpected fetch response"))?;
    if !response.ok() {
        return Err(JsError::new("Network response was not OK"));
    }
    let text_promise = response
        .text()
        .map_err(|_| JsError::new("Failed to read word list response"))?;
    let text = wasm_bindgen_futures::JsFuture::from(text_promise)
        .await
        .map_err(|_| JsError::new("Failed to read word list response"))?;

    text.as_string()
        .ok_or_else(|| JsError::new("Word list response was not text"))
}

/// WASM-compatible function to fill a crossword grid. Returns the filled grid as text, with
/// blocked cells drawn as `#`.
#[wasm_bindgen]
pub async fn fill_grid(
    grid_content: &str,
    word_list_source: String,
    seed: Option<u64>,
    max_states: Option<usize>,
) -> Result<String, JsError> {
    let word_list_contents = load_word_list_contents(word_list_source).await?;
    let word_list = WordList::from_str_contents(&word_list_contents);

    if word_list.is_empty() {
        return Err(JsError::new("Word list is empty"));
    }

    let config = generate_grid_config_from_template_string(grid_content)
        .map_err(|e| JsError::new(&e.to_string()))?;

    let options = SearchOptions {
        tie_break: seed.map_or(TieBreak::LowestId, TieBreak::Seeded),
        look_ahead: true,
        max_states,
        ..SearchOptions::default()
    };

    let result = find_fill(&config, &word_list, &options).map_err(|failure| match failure {
        FillFailure::HardFailure => JsError::new("Unfillable grid"),
        other => JsError::new(&format!("No fill found within budget ({other:?})")),
    })?;

    Ok(render_grid(&config, &word_list, &result.assignment)
        .replace(crate::grid_config::BLOCKED_CELL_GLYPH, "#"))
}
