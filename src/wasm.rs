//! JavaScript bindings for the ledger engine, for hosts that keep notes
//! in the browser. Section labels may be passed as a string or as a section
//! descriptor object `{ heading: { text } }`.

use js_sys::{Array, Date, Reflect};
use wasm_bindgen::prelude::*;

use crate::{
    heading::HeadingLabel,
    ledger::{self, RowFields, TableRow},
    rating::formatted_day_rating,
    section,
    store::NoteRef,
    Error,
};

fn to_js_error(error: Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

/// Resolve a JS label argument into a [`HeadingLabel`], failing fast on
/// anything that is neither a string nor a descriptor with `heading.text`,
/// and on labels no heading could carry.
fn heading_label(value: &JsValue) -> Result<HeadingLabel, JsValue> {
    if let Some(text) = value.as_string() {
        return HeadingLabel::Text(text).checked().map_err(to_js_error);
    }
    if !value.is_object() {
        return Err(to_js_error(Error::InvalidLabel(format!(
            "expected a string or {{ heading: {{ text }} }}, got {value:?}"
        ))));
    }

    let heading = Reflect::get(value, &JsValue::from_str("heading"))?;
    if !heading.is_object() {
        return Err(to_js_error(Error::InvalidLabel(
            "section descriptor has no `heading` object".to_string(),
        )));
    }
    let text = Reflect::get(&heading, &JsValue::from_str("text"))?
        .as_string()
        .ok_or_else(|| {
            to_js_error(Error::InvalidLabel(
                "section descriptor heading has no `text` string".to_string(),
            ))
        })?;
    HeadingLabel::from(text).checked().map_err(to_js_error)
}

#[wasm_bindgen(js_name = sectionContent)]
pub fn section_content(document: &str, label: JsValue) -> Result<Option<String>, JsValue> {
    let label = heading_label(&label)?;
    Ok(section::section_content(document, label.normalized()).map(str::to_string))
}

#[wasm_bindgen(js_name = replaceSectionContent)]
pub fn replace_section_content(
    document: &str,
    label: JsValue,
    content: &str,
) -> Result<String, JsValue> {
    let label = heading_label(&label)?;
    section::replace_section_content(document, label.normalized(), content).map_err(to_js_error)
}

#[wasm_bindgen(js_name = formattedDayRating)]
pub fn formatted_rating(rating: i32) -> String {
    formatted_day_rating(i64::from(rating))
}

/// Record a new ledger row, stamped with the host's locale time.
#[wasm_bindgen(js_name = upsertTableRow)]
pub fn upsert_table_row(
    document: &str,
    label: JsValue,
    note_name: String,
    note_uuid: String,
    rating: Option<i32>,
    events: Option<String>,
) -> Result<String, JsValue> {
    let label = heading_label(&label)?;
    let row = TableRow::format(&RowFields {
        note: NoteRef::new(note_name, note_uuid),
        rating: rating.map(i64::from),
        events,
        captured_at: String::from(Date::new_0().to_locale_string("default", &JsValue::UNDEFINED)),
    });
    Ok(ledger::upsert(document, label.normalized(), &row))
}

#[wasm_bindgen(js_name = ledgerRows)]
pub fn ledger_rows(document: &str, label: JsValue) -> Result<JsValue, JsValue> {
    let label = heading_label(&label)?;
    Ok(match ledger::ledger_rows(document, label.normalized()) {
        Some(rows) => rows
            .into_iter()
            .map(JsValue::from_str)
            .collect::<Array>()
            .into(),
        None => JsValue::UNDEFINED,
    })
}
