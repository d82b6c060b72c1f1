//! In-memory stand-in for the two-page Form 8949 template.

use std::collections::BTreeMap;

use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use super::assemble::{decode_text, partial_name};

fn rect() -> Object {
    Object::Array([0, 0, 100, 12].into_iter().map(Object::Integer).collect())
}

/// Fillable document with one page per prefix, laid out like the real form:
/// text widgets `f{p}_1[0]..f{p}_119[0]` and checkboxes `c{p}_1[0]`/`c{p}_1[1]`,
/// all kids of a `Page{p}[0]` field that carries the inherited `FT`/`DA`.
pub(crate) fn build_template(prefixes: &[u8]) -> Document {
    let mut doc = Document::with_version("1.7");
    let root_pages_id = doc.new_object_id();
    let branch_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "Helv" => font_id },
    });

    let mut page_refs = Vec::new();
    let mut fields = Vec::new();
    for &prefix in prefixes {
        let page_id = doc.new_object_id();
        let group_id = doc.new_object_id();
        let mut annots = Vec::new();

        for n in 1..=119u32 {
            let widget = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "T" => Object::string_literal(format!("f{}_{}[0]", prefix, n)),
                "Parent" => group_id,
                "P" => page_id,
                "Rect" => rect(),
            });
            annots.push(Object::Reference(widget));
        }
        for (k, on_state) in [(0, "1"), (1, "2")] {
            let on = doc.add_object(Stream::new(Dictionary::new(), b"0 g 0 0 8 8 re f".to_vec()));
            let off = doc.add_object(Stream::new(Dictionary::new(), Vec::new()));
            let widget = doc.add_object(dictionary! {
                "Type" => "Annot",
                "Subtype" => "Widget",
                "FT" => "Btn",
                "T" => Object::string_literal(format!("c{}_1[{}]", prefix, k)),
                "Parent" => group_id,
                "P" => page_id,
                "AS" => "Off",
                "AP" => dictionary! { "N" => dictionary! { on_state => on, "Off" => off } },
                "Rect" => rect(),
            });
            annots.push(Object::Reference(widget));
        }

        doc.objects.insert(
            group_id,
            Object::Dictionary(dictionary! {
                "T" => Object::string_literal(format!("Page{}[0]", prefix)),
                "FT" => "Tx",
                "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
                "Kids" => annots.clone(),
            }),
        );
        fields.push(Object::Reference(group_id));

        let content = doc.add_object(Stream::new(
            Dictionary::new(),
            format!("BT /Helv 12 Tf 72 740 Td (Form 8949 layout {}) Tj ET", prefix).into_bytes(),
        ));
        doc.objects.insert(
            page_id,
            Object::Dictionary(dictionary! {
                "Type" => "Page",
                "Parent" => branch_id,
                "Contents" => content,
                "Annots" => annots,
            }),
        );
        page_refs.push(Object::Reference(page_id));
    }

    let count = page_refs.len() as i64;
    doc.objects.insert(
        branch_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Parent" => root_pages_id,
            "Kids" => page_refs,
            "Count" => count,
            "MediaBox" => [0, 0, 612, 792].into_iter().map(Object::Integer).collect::<Vec<_>>(),
            "Resources" => resources_id,
        }),
    );
    doc.objects.insert(
        root_pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(branch_id)],
            "Count" => count,
        }),
    );

    let xfa = doc.add_object(Stream::new(Dictionary::new(), b"<xdp:xdp/>".to_vec()));
    let acroform = doc.add_object(dictionary! {
        "Fields" => fields,
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "XFA" => xfa,
    });
    let catalog = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => root_pages_id,
        "AcroForm" => acroform,
    });
    doc.trailer.set("Root", catalog);
    doc
}

pub(crate) fn two_page_template() -> Document {
    build_template(&[1, 2])
}

/// Per page, in page order: widget name → current value.
pub(crate) fn page_fields(doc: &Document) -> Vec<BTreeMap<String, Option<String>>> {
    doc.get_pages()
        .into_values()
        .map(|page_id| {
            let page = doc.get_object(page_id).unwrap().as_dict().unwrap();
            let annots = match page.get(b"Annots").unwrap() {
                Object::Reference(id) => doc.get_object(*id).unwrap().as_array().unwrap().clone(),
                other => other.as_array().unwrap().clone(),
            };
            annots
                .iter()
                .filter_map(|annot| {
                    let widget = doc.get_object(annot.as_reference().ok()?).ok()?.as_dict().ok()?;
                    let name = partial_name(widget)?;
                    let value = widget.get(b"V").ok().and_then(|v| match v {
                        Object::Name(n) => Some(String::from_utf8_lossy(n).into_owned()),
                        other => other.as_str().ok().map(decode_text),
                    });
                    Some((name, value))
                })
                .collect()
        })
        .collect()
}
