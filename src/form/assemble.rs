use std::collections::HashMap;
use std::path::Path;

use anyhow::Context;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, info};

use super::mapper::FormPlan;
use super::{FieldValue, FormError};

/// Field attributes a widget may inherit from its parent field.
const INHERITED_FIELD_KEYS: &[&[u8]] = &[b"FT", b"Ff", b"DA", b"Q", b"MaxLen"];
/// Page attributes a page may inherit from its page-tree ancestors.
const INHERITED_PAGE_KEYS: &[&[u8]] = &[b"Resources", b"MediaBox", b"CropBox", b"Rotate"];
const MAX_TREE_DEPTH: usize = 32;

/// The two-page fillable form: page 0 short-term layout, page 1 long-term.
pub struct Template {
    doc: Document,
    layouts: [ObjectId; 2],
}

impl Template {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let doc = Document::load(path).with_context(|| format!("opening template {}", path.display()))?;
        Self::from_document(doc).with_context(|| format!("reading template {}", path.display()))
    }

    pub fn from_document(doc: Document) -> Result<Self, FormError> {
        let pages = doc.get_pages();
        let short = *pages.get(&1).ok_or(FormError::MissingPage(0))?;
        let long = *pages.get(&2).ok_or(FormError::MissingPage(1))?;
        Ok(Template {
            doc,
            layouts: [short, long],
        })
    }

    /// Build one document holding the pages of every plan, in plan order.
    ///
    /// Each page is a fresh copy of its layout page. Every named widget on a
    /// copy is renamed with the plan's per-page suffix and detached from the
    /// template's field tree, so names stay unique across the whole output.
    pub fn fill(&self, plans: &[FormPlan]) -> Result<Document, FormError> {
        let mut doc = self.doc.clone();
        let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
        let pages_root = doc
            .get_object(catalog_id)?
            .as_dict()?
            .get(b"Pages")?
            .as_reference()?;

        let mut kids = Vec::new();
        let mut fields = Vec::new();
        for plan in plans {
            let layout = self.layouts[plan.doc.term().template_page()];
            let page_template = resolved_page(&doc, layout)?;
            for page in &plan.pages {
                let values = plan.qualified_values(page);
                let suffix = plan.doc.page_suffix(page.number);
                let id = copy_page(&mut doc, &page_template, pages_root, &suffix, &values, &mut fields)?;
                kids.push(Object::Reference(id));
            }
            debug!(doc = %plan.doc, pages = plan.pages.len(), "layout copied");
        }

        let count = kids.len() as i64;
        let root = doc.get_object_mut(pages_root)?.as_dict_mut()?;
        root.set("Kids", kids);
        root.set("Count", count);

        update_acroform(&mut doc, catalog_id, fields)?;
        doc.prune_objects();
        Ok(doc)
    }
}

/// Fill and write one document.
pub fn write(template: &Template, plans: &[FormPlan], path: &Path) -> anyhow::Result<usize> {
    let mut doc = template.fill(plans)?;
    let pages = doc.get_pages().len();
    doc.save(path).with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), pages, "form written");
    Ok(pages)
}

/// Page dictionary with inheritable attributes pulled down from the page tree.
fn resolved_page(doc: &Document, page_id: ObjectId) -> Result<Dictionary, FormError> {
    let mut page = doc.get_object(page_id)?.as_dict()?.clone();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        if depth == MAX_TREE_DEPTH {
            return Err(FormError::Malformed("page tree too deep"));
        }
        let node = doc.get_object(id)?.as_dict()?;
        for key in INHERITED_PAGE_KEYS {
            if !page.has(key) {
                if let Ok(value) = node.get(key) {
                    page.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    page.remove(b"StructParents");
    Ok(page)
}

fn copy_page(
    doc: &mut Document,
    template: &Dictionary,
    parent: ObjectId,
    suffix: &str,
    values: &HashMap<String, FieldValue>,
    fields: &mut Vec<Object>,
) -> Result<ObjectId, FormError> {
    let page_id = doc.new_object_id();
    let mut page = template.clone();
    page.set("Parent", Object::Reference(parent));

    let mut annots = Vec::new();
    for annot in annotations(doc, template)? {
        let mut widget = match annot {
            Object::Reference(id) => doc.get_object(id)?.as_dict()?.clone(),
            Object::Dictionary(dict) => dict,
            _ => continue,
        };
        widget.set("P", Object::Reference(page_id));
        widget.remove(b"StructParent");

        let Some(name) = partial_name(&widget) else {
            annots.push(Object::Reference(doc.add_object(widget)));
            continue;
        };

        inherit_field_keys(doc, &mut widget)?;
        widget.remove(b"Parent");
        let full_name = format!("{}_{}", name, suffix);
        if let Some(value) = values.get(&full_name) {
            set_value(&mut widget, value);
        }
        widget.set("T", Object::string_literal(encode_text(&full_name)));

        let id = doc.add_object(widget);
        annots.push(Object::Reference(id));
        fields.push(Object::Reference(id));
    }

    page.set("Annots", annots);
    doc.objects.insert(page_id, Object::Dictionary(page));
    Ok(page_id)
}

fn annotations(doc: &Document, page: &Dictionary) -> Result<Vec<Object>, FormError> {
    match page.get(b"Annots") {
        Ok(Object::Reference(id)) => Ok(doc.get_object(*id)?.as_array()?.clone()),
        Ok(Object::Array(items)) => Ok(items.clone()),
        _ => Ok(Vec::new()),
    }
}

fn inherit_field_keys(doc: &Document, widget: &mut Dictionary) -> Result<(), FormError> {
    let mut parent = widget.get(b"Parent").and_then(Object::as_reference).ok();
    let mut depth = 0;
    while let Some(id) = parent {
        if depth == MAX_TREE_DEPTH {
            return Err(FormError::Malformed("field tree too deep"));
        }
        let node = doc.get_object(id)?.as_dict()?;
        for key in INHERITED_FIELD_KEYS {
            if !widget.has(key) {
                if let Ok(value) = node.get(key) {
                    widget.set(key.to_vec(), value.clone());
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
        depth += 1;
    }
    Ok(())
}

fn set_value(widget: &mut Dictionary, value: &FieldValue) {
    match value {
        FieldValue::Text(text) => {
            widget.set("V", Object::string_literal(encode_text(text)));
            // Stale appearance would hide the value; viewers regenerate it.
            widget.remove(b"AP");
        }
        FieldValue::Check(state) => {
            widget.set("V", Object::Name(state.as_bytes().to_vec()));
            widget.set("AS", Object::Name(state.as_bytes().to_vec()));
        }
    }
}

fn update_acroform(doc: &mut Document, catalog_id: ObjectId, fields: Vec<Object>) -> Result<(), FormError> {
    let catalog = doc.get_object_mut(catalog_id)?.as_dict_mut()?;
    // The copied pages are not part of the template's structure tree.
    catalog.remove(b"StructTreeRoot");
    let existing = catalog.get(b"AcroForm").ok().map(|form| form.as_reference().ok());
    let acroform_id = match existing {
        Some(id) => id,
        None => {
            catalog.set("AcroForm", Dictionary::new());
            None
        }
    };

    let acroform = match acroform_id {
        Some(id) => doc.get_object_mut(id)?.as_dict_mut()?,
        None => doc
            .get_object_mut(catalog_id)?
            .as_dict_mut()?
            .get_mut(b"AcroForm")?
            .as_dict_mut()?,
    };
    acroform.set("Fields", fields);
    acroform.set("NeedAppearances", true);
    acroform.remove(b"XFA");
    Ok(())
}

/// `/T` of a widget, if it names its own field.
pub fn partial_name(widget: &Dictionary) -> Option<String> {
    widget
        .get(b"T")
        .and_then(Object::as_str)
        .ok()
        .map(decode_text)
}

/// PDF text string → UTF-8 (UTF-16BE with BOM, otherwise single-byte).
pub fn decode_text(bytes: &[u8]) -> String {
    match bytes {
        [0xFE, 0xFF, rest @ ..] => {
            let units: Vec<u16> = rest
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        _ => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn encode_text(text: &str) -> Vec<u8> {
    if text.is_ascii() {
        return text.as_bytes().to_vec();
    }
    let mut out = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}

// ── Tests ──
