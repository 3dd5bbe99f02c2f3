//! Enumeration output
//!
//! Text listing in the style of bcdedit, or the JSON exchange form.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use bcd::known_ids::display_id;
use bcd::{BcdObject, EnumerateResponse, InheritSubType, ObjectSubType, ObjectType};

/// Width of the name column
const NAME_WIDTH: usize = 24;

/// Elements whose values are object identifiers, one per line
const ID_LIST_ELEMENTS: &[&str] = &["Inherit", "DisplayOrder"];

/// JSON form of an enumeration
pub fn render_json(objects: &BTreeMap<String, BcdObject>) -> serde_json::Result<String> {
    serde_json::to_string(&EnumerateResponse::from_objects(objects.values()))
}

/// Text listing of an enumeration, objects ordered by description
pub fn render_text(objects: &BTreeMap<String, BcdObject>) -> String {
    let mut sorted: Vec<&BcdObject> = objects.values().collect();
    sorted.sort_by_key(|object| object.description());

    let mut out = String::new();
    for object in sorted {
        write_object(&mut out, object);
    }
    out
}

fn header(object: &BcdObject) -> String {
    let description = object.description();
    let application_name = || match description.application_type().name() {
        Some(name) => name.to_string(),
        None => format!("unknown type ({description})"),
    };
    match description.object_type() {
        ObjectType::Application => application_name(),
        ObjectType::Inherit => match description.object_subtype() {
            ObjectSubType::Inherit(InheritSubType::InheritableByApplication) => {
                format!("{} (inherited)", application_name())
            }
            ObjectSubType::Inherit(InheritSubType::InheritableByDevice) => {
                "Device options (inherited)".to_string()
            }
            _ => format!("Inherited\nobject_description: {description}"),
        },
        ObjectType::Device => "Device options".to_string(),
        ObjectType::Unknown(_) => format!(
            "OBJECT[ID: {}]:\nobject_description: {description}",
            object.id()
        ),
    }
}

/// Continuation lines of a multi-line value start under the value column
fn indent_continuation(value: &str) -> String {
    value.replace('\n', &format!("\n{:width$}", "", width = NAME_WIDTH + 1))
}

fn write_line(out: &mut String, name: &str, value: &str) {
    let _ = writeln!(
        out,
        "{name:<width$} {}",
        indent_continuation(value),
        width = NAME_WIDTH
    );
}

fn write_object(out: &mut String, object: &BcdObject) {
    let _ = writeln!(out, "{}", header(object));
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + 1));
    write_line(out, "Identifier", display_id(object.id()));

    for element in object.sorted_elements() {
        let name = object.element_name(element.key());
        let text = element.to_string();
        if ID_LIST_ELEMENTS.contains(&name) {
            let ids: Vec<&str> = text.split('\n').map(display_id).collect();
            write_line(out, name, &ids.join("\n"));
        } else {
            write_line(out, name, &text);
        }
    }
    out.push('\n');
}
