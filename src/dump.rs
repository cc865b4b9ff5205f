// Type table dump as an indented XML tree.
//
// One <type> element per type (the sentinel is skipped), attributes in
// alphabetical order, optional attributes only when their source field is
// present. Template, member and interface entries become child elements.

use std::io::{self, Write};

use crate::tag::types::{TypeFlags, TypeTable, raw_index};

/// Write the whole type table as an XML document.
pub fn write_types_xml<W: Write>(types: &TypeTable, w: &mut W) -> io::Result<()> {
    writeln!(w, r#"<?xml version="1.0" encoding="utf-8"?>"#)?;
    writeln!(w, "<types>")?;

    for (id, t) in types.iter() {
        let mut attrs: Vec<(&str, String)> = vec![
            ("alignment", t.alignment().unwrap_or(0).to_string()),
            ("byteSize", t.byte_size().unwrap_or(0).to_string()),
            ("flags", t.flags.bits().to_string()),
        ];
        if let Some(hash) = t.hash.filter(|&h| h != 0) {
            attrs.push(("hash", hash.to_string()));
        }
        attrs.push(("id", id.to_string()));
        attrs.push(("name", t.name.clone()));
        if let Some(parent) = t.parent {
            attrs.push(("parent", parent.to_string()));
        }
        if t.flags.contains(TypeFlags::POINTER) {
            attrs.push(("pointer", raw_index(t.pointee).to_string()));
        }
        if let Some(sub) = t.sub_type_flags {
            attrs.push(("subTypeFlags", sub.to_string()));
        }
        if let Some(version) = t.version {
            attrs.push(("version", version.to_string()));
        }

        let empty = t.templates.is_empty() && t.members.is_empty() && t.interfaces.is_empty();
        open_tag(w, 1, "type", &attrs, empty)?;
        if empty {
            continue;
        }

        for tmpl in &t.templates {
            let attrs = [("name", tmpl.name.clone()), ("value", tmpl.value.to_string())];
            open_tag(w, 2, "template", &attrs, true)?;
        }
        for m in &t.members {
            let attrs = [
                ("flags", m.flags.to_string()),
                ("name", m.name.clone()),
                ("offset", m.offset.to_string()),
                ("type", raw_index(m.type_ref).to_string()),
            ];
            open_tag(w, 2, "member", &attrs, true)?;
        }
        for i in &t.interfaces {
            let attrs = [
                ("flags", i.value.to_string()),
                ("type", raw_index(i.type_ref).to_string()),
            ];
            open_tag(w, 2, "interface", &attrs, true)?;
        }
        writeln!(w, "  </type>")?;
    }

    writeln!(w, "</types>")
}

/// Render the type table to a string.
pub fn types_xml_string(types: &TypeTable) -> String {
    let mut out = Vec::new();
    // Writing to a Vec cannot fail.
    let _ = write_types_xml(types, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

fn open_tag<W: Write>(
    w: &mut W,
    depth: usize,
    name: &str,
    attrs: &[(&str, String)],
    self_closing: bool,
) -> io::Result<()> {
    write!(w, "{:width$}<{name}", "", width = depth * 2)?;
    for (key, value) in attrs {
        write!(w, " {key}=\"{}\"", escape(value))?;
    }
    if self_closing {
        writeln!(w, " />")
    } else {
        writeln!(w, ">")
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
