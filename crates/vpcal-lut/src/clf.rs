//! Common LUT Format (CLF) reader and writer.
//!
//! CLF is the Academy's XML LUT container. The calibration pipeline writes
//! its per-channel EOTF correction as a single `LUT1D` node and can bake
//! display pipelines as a `LUT3D` node; those are the node types handled
//! here.
//!
//! # File Structure
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <ProcessList id="Wall1_CS_EOTF" compCLFversion="3.0">
//!   <Description>EOTF correction</Description>
//!   <LUT1D inBitDepth="32f" outBitDepth="32f">
//!     <Array dim="4096 3">
//! 0 0 0
//! ...
//!     </Array>
//!   </LUT1D>
//! </ProcessList>
//! ```
//!
//! `LUT1D` arrays are written one `R G B` row per entry. `LUT3D` arrays are
//! written with blue varying fastest, as CLF requires.
//!
//! # Example
//!
//! ```rust
//! use vpcal_lut::{Lut1D, clf::{ProcessList, ProcessNode}};
//!
//! let lut = Lut1D::identity(16).unwrap();
//! let mut pl = ProcessList::new("identity");
//! pl.nodes.push(ProcessNode::Lut1D(lut));
//!
//! let xml = vpcal_lut::clf::to_string(&pl).unwrap();
//! let back = vpcal_lut::clf::parse_clf(xml.as_bytes()).unwrap();
//! assert_eq!(back.nodes.len(), 1);
//! ```

use std::io::{BufRead, BufReader, Write};
use std::fs::File;
use std::path::Path;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::{Lut1D, Lut3D, LutError, LutResult};

/// CLF version written by this crate.
pub const CLF_VERSION: &str = "3.0";

/// Process nodes this crate can't evaluate.
const UNSUPPORTED_NODES: &[&str] = &[
    "Matrix",
    "Range",
    "ASC_CDL",
    "Log",
    "Exponent",
    "InvertLUT1D",
    "InvertLUT3D",
    "ExposureContrast",
    "FixedFunction",
    "GradingPrimary",
];

/// A processing node.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessNode {
    /// Per-channel 1D LUT.
    Lut1D(Lut1D),
    /// 3D cube.
    Lut3D(Lut3D),
}

impl ProcessNode {
    fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        match self {
            ProcessNode::Lut1D(lut) => lut.apply_rgb(rgb),
            ProcessNode::Lut3D(lut) => lut.apply(rgb),
        }
    }
}

/// A CLF document: ordered processing nodes plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessList {
    /// Unique identifier.
    pub id: String,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// Description lines.
    pub descriptions: Vec<String>,
    /// Input colour space descriptor.
    pub input_descriptor: Option<String>,
    /// Output colour space descriptor.
    pub output_descriptor: Option<String>,
    /// CLF version.
    pub version: String,
    /// Nodes, applied first to last.
    pub nodes: Vec<ProcessNode>,
}

impl ProcessList {
    /// Creates an empty process list.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            descriptions: Vec::new(),
            input_descriptor: None,
            output_descriptor: None,
            version: CLF_VERSION.into(),
            nodes: Vec::new(),
        }
    }

    /// Adds a description line.
    pub fn with_description(mut self, text: impl Into<String>) -> Self {
        self.descriptions.push(text.into());
        self
    }

    /// Applies every node in order.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        self.nodes.iter().fold(rgb, |acc, node| node.apply(acc))
    }

    /// Applies the inverse of every node in reverse order.
    ///
    /// Only `LUT1D` nodes are invertible.
    pub fn apply_inverse(&self, rgb: [f32; 3]) -> LutResult<[f32; 3]> {
        self.nodes.iter().rev().try_fold(rgb, |acc, node| match node {
            ProcessNode::Lut1D(lut) => Ok(lut.apply_inverse_rgb(acc)),
            ProcessNode::Lut3D(_) => Err(LutError::Unsupported(
                "inverse of a LUT3D node".into(),
            )),
        })
    }
}

/// Reads a CLF file.
pub fn read_clf(path: impl AsRef<Path>) -> LutResult<ProcessList> {
    let file = File::open(path.as_ref())?;
    parse_clf(BufReader::new(file))
}

/// Parses CLF from a reader.
pub fn parse_clf<R: BufRead>(reader: R) -> LutResult<ProcessList> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut result: Option<ProcessList> = None;
    let mut text = String::new();
    let mut in_array = false;
    let mut array = String::new();
    let mut dims: Vec<usize> = Vec::new();

    loop {
        match xml.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "ProcessList" => {
                        let mut pl = ProcessList::new("");
                        for attr in e.attributes().flatten() {
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            match attr.key.as_ref() {
                                b"id" => pl.id = value,
                                b"name" => pl.name = Some(value),
                                b"compCLFversion" => pl.version = value,
                                _ => {}
                            }
                        }
                        result = Some(pl);
                    }
                    "Array" => {
                        in_array = true;
                        array.clear();
                        dims.clear();
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"dim" {
                                dims = String::from_utf8_lossy(&attr.value)
                                    .split_whitespace()
                                    .map(|s| {
                                        s.parse::<usize>().map_err(|_| {
                                            LutError::ParseError(format!("bad Array dim '{s}'"))
                                        })
                                    })
                                    .collect::<LutResult<_>>()?;
                            }
                        }
                    }
                    other if UNSUPPORTED_NODES.contains(&other) => {
                        return Err(LutError::Unsupported(format!("CLF node '{other}'")));
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let decoded = e
                    .decode()
                    .map_err(|err| LutError::ParseError(format!("bad text: {err}")))?;
                let t = quick_xml::escape::unescape(&decoded)
                    .map_err(|err| LutError::ParseError(format!("bad text: {err}")))?;
                if in_array {
                    array.push_str(&t);
                    array.push(' ');
                } else {
                    text = t.into_owned();
                }
            }
            Ok(Event::End(ref e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                match name.as_str() {
                    "Array" => in_array = false,
                    "Description" | "InputDescriptor" | "OutputDescriptor" => {
                        if let Some(pl) = result.as_mut() {
                            let value = std::mem::take(&mut text);
                            match name.as_str() {
                                "Description" => pl.descriptions.push(value),
                                "InputDescriptor" => pl.input_descriptor = Some(value),
                                _ => pl.output_descriptor = Some(value),
                            }
                        }
                    }
                    "LUT1D" | "LUT3D" => {
                        let pl = result.as_mut().ok_or_else(|| {
                            LutError::ParseError(format!("{name} outside ProcessList"))
                        })?;
                        let node = if name == "LUT1D" {
                            ProcessNode::Lut1D(lut1d_from_array(&dims, &array)?)
                        } else {
                            ProcessNode::Lut3D(lut3d_from_array(&dims, &array)?)
                        };
                        pl.nodes.push(node);
                    }
                    _ => {}
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(LutError::ParseError(format!("XML error: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    result.ok_or_else(|| LutError::ParseError("missing ProcessList element".into()))
}

fn parse_values(text: &str) -> LutResult<Vec<f32>> {
    text.split_whitespace()
        .map(|s| {
            s.parse::<f32>()
                .map_err(|_| LutError::ParseError(format!("bad array value '{s}'")))
        })
        .collect()
}

fn lut1d_from_array(dims: &[usize], text: &str) -> LutResult<Lut1D> {
    let [n, channels] = dims else {
        return Err(LutError::ParseError(format!(
            "LUT1D Array needs 2 dims, got {dims:?}"
        )));
    };
    let values = parse_values(text)?;
    if values.len() != n * channels {
        return Err(LutError::ParseError(format!(
            "LUT1D Array dim {n}x{channels} but {} values",
            values.len()
        )));
    }
    match channels {
        1 => Lut1D::from_data(values, 0.0, 1.0),
        3 => {
            let column = |c: usize| values.iter().skip(c).step_by(3).copied().collect();
            Lut1D::from_rgb(column(0), column(1), column(2), 0.0, 1.0)
        }
        other => Err(LutError::InvalidSize(format!(
            "LUT1D with {other} channels"
        ))),
    }
}

fn lut3d_from_array(dims: &[usize], text: &str) -> LutResult<Lut3D> {
    let [n, n1, n2, 3] = dims else {
        return Err(LutError::ParseError(format!(
            "LUT3D Array needs dims 'N N N 3', got {dims:?}"
        )));
    };
    let n = *n;
    if n != *n1 || n != *n2 {
        return Err(LutError::InvalidSize(format!("non-cubic LUT3D {dims:?}")));
    }
    let values = parse_values(text)?;
    if values.len() != n * n * n * 3 {
        return Err(LutError::ParseError(format!(
            "LUT3D Array dim {n}^3 but {} values",
            values.len()
        )));
    }
    let mut lut = Lut3D::identity(n)?;
    // file order is blue fastest
    for (i, rgb) in values.chunks_exact(3).enumerate() {
        let b = i % n;
        let g = (i / n) % n;
        let r = i / (n * n);
        let idx = lut.index(r, g, b);
        lut.data[idx] = [rgb[0], rgb[1], rgb[2]];
    }
    Ok(lut)
}

/// Writes a CLF file.
pub fn write_clf(path: impl AsRef<Path>, clf: &ProcessList) -> LutResult<()> {
    let mut file = File::create(path.as_ref())?;
    file.write_all(to_string(clf)?.as_bytes())?;
    Ok(())
}

/// Serializes a process list to CLF XML.
pub fn to_string(clf: &ProcessList) -> LutResult<String> {
    let mut out = Vec::new();
    write_clf_to(&mut out, clf)?;
    String::from_utf8(out).map_err(|e| LutError::Xml(e.to_string()))
}

/// Writes CLF to any writer.
pub fn write_clf_to<W: Write>(writer: W, clf: &ProcessList) -> LutResult<()> {
    let mut xml = Writer::new_with_indent(writer, b' ', 2);

    emit(
        &mut xml,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;

    let mut start = BytesStart::new("ProcessList");
    start.push_attribute(("id", clf.id.as_str()));
    start.push_attribute(("compCLFversion", clf.version.as_str()));
    if let Some(ref name) = clf.name {
        start.push_attribute(("name", name.as_str()));
    }
    emit(&mut xml, Event::Start(start))?;

    for desc in &clf.descriptions {
        write_text_element(&mut xml, "Description", desc)?;
    }
    if let Some(ref inp) = clf.input_descriptor {
        write_text_element(&mut xml, "InputDescriptor", inp)?;
    }
    if let Some(ref out) = clf.output_descriptor {
        write_text_element(&mut xml, "OutputDescriptor", out)?;
    }

    for node in &clf.nodes {
        write_node(&mut xml, node)?;
    }

    emit(&mut xml, Event::End(BytesEnd::new("ProcessList")))
}

fn emit<W: Write>(xml: &mut Writer<W>, event: Event<'_>) -> LutResult<()> {
    xml.write_event(event)
        .map_err(|e| LutError::Xml(e.to_string()))
}

fn write_text_element<W: Write>(xml: &mut Writer<W>, name: &str, text: &str) -> LutResult<()> {
    emit(xml, Event::Start(BytesStart::new(name)))?;
    emit(xml, Event::Text(BytesText::new(text)))?;
    emit(xml, Event::End(BytesEnd::new(name)))
}

fn write_array<W: Write>(xml: &mut Writer<W>, dim: &str, rows: Vec<String>) -> LutResult<()> {
    let mut arr = BytesStart::new("Array");
    arr.push_attribute(("dim", dim));
    emit(xml, Event::Start(arr))?;
    let body = format!("\n{}\n", rows.join("\n"));
    emit(xml, Event::Text(BytesText::new(&body)))?;
    emit(xml, Event::End(BytesEnd::new("Array")))
}

fn write_node<W: Write>(xml: &mut Writer<W>, node: &ProcessNode) -> LutResult<()> {
    let tag = match node {
        ProcessNode::Lut1D(_) => "LUT1D",
        ProcessNode::Lut3D(_) => "LUT3D",
    };
    let mut start = BytesStart::new(tag);
    start.push_attribute(("inBitDepth", "32f"));
    start.push_attribute(("outBitDepth", "32f"));
    emit(xml, Event::Start(start))?;

    match node {
        ProcessNode::Lut1D(lut) => {
            if lut.domain_min != 0.0 || lut.domain_max != 1.0 {
                return Err(LutError::Unsupported(format!(
                    "LUT1D domain [{}, {}]; CLF LUT1D input is [0, 1]",
                    lut.domain_min, lut.domain_max
                )));
            }
            let rows = (0..lut.size())
                .map(|i| {
                    format!(
                        "{} {} {}",
                        lut.channel(0)[i],
                        lut.channel(1)[i],
                        lut.channel(2)[i]
                    )
                })
                .collect();
            write_array(xml, &format!("{} 3", lut.size()), rows)?;
        }
        ProcessNode::Lut3D(lut) => {
            let n = lut.size;
            let mut rows = Vec::with_capacity(n * n * n);
            for r in 0..n {
                for g in 0..n {
                    for b in 0..n {
                        let v = lut.get(r, g, b);
                        rows.push(format!("{} {} {}", v[0], v[1], v[2]));
                    }
                }
            }
            write_array(xml, &format!("{n} {n} {n} 3"), rows)?;
        }
    }

    emit(xml, Event::End(BytesEnd::new(tag)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn curve_lut() -> Lut1D {
        let r: Vec<f32> = (0..32).map(|i| (i as f32 / 31.0).powf(2.0)).collect();
        let g: Vec<f32> = (0..32).map(|i| i as f32 / 31.0).collect();
        let b: Vec<f32> = (0..32).map(|i| (i as f32 / 31.0).sqrt()).collect();
        Lut1D::from_rgb(r, g, b, 0.0, 1.0).unwrap()
    }

    #[test]
    fn lut1d_writes_three_columns() {
        let mut pl = ProcessList::new("Wall1_CS_EOTF").with_description("EOTF correction");
        pl.nodes.push(ProcessNode::Lut1D(curve_lut()));
        let xml = to_string(&pl).unwrap();
        assert!(xml.contains("dim=\"32 3\""));
        assert!(xml.contains("id=\"Wall1_CS_EOTF\""));
        assert!(xml.contains("<Description>EOTF correction</Description>"));
    }

    #[test]
    fn lut1d_round_trip() {
        let mut pl = ProcessList::new("rt");
        pl.nodes.push(ProcessNode::Lut1D(curve_lut()));
        let back = parse_clf(to_string(&pl).unwrap().as_bytes()).unwrap();
        assert_eq!(back, pl);
    }

    #[test]
    fn lut3d_round_trip_keeps_axis_order() {
        let lut = Lut3D::from_fn(3, |[r, g, b]| [r, 0.5 * g, b * b]).unwrap();
        let mut pl = ProcessList::new("cube");
        pl.nodes.push(ProcessNode::Lut3D(lut.clone()));
        let xml = to_string(&pl).unwrap();
        let back = parse_clf(xml.as_bytes()).unwrap();
        assert_eq!(back.nodes[0], ProcessNode::Lut3D(lut));

        // blue fastest in the file: second row is (r=0, g=0, b=0.5)
        let array = xml.split("<Array").nth(1).unwrap();
        let rows: Vec<&str> = array.lines().skip(1).take(2).collect();
        assert_eq!(rows[1].trim(), "0 0 0.25");
    }

    #[test]
    fn mono_lut1d_is_accepted() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<ProcessList id="m" compCLFversion="3.0">
  <LUT1D inBitDepth="32f" outBitDepth="32f">
    <Array dim="3 1">0 0.25 1</Array>
  </LUT1D>
</ProcessList>"#;
        let pl = parse_clf(xml.as_bytes()).unwrap();
        let out = pl.apply([0.5, 0.5, 0.5]);
        assert_relative_eq!(out[0], 0.25);
        assert_relative_eq!(out[2], 0.25);
    }

    #[test]
    fn inverse_applies_lut1d_backwards() {
        let mut pl = ProcessList::new("inv");
        pl.nodes.push(ProcessNode::Lut1D(curve_lut()));
        let fwd = pl.apply([0.3, 0.6, 0.9]);
        let back = pl.apply_inverse(fwd).unwrap();
        assert_relative_eq!(back[0], 0.3, epsilon = 1e-4);
        assert_relative_eq!(back[1], 0.6, epsilon = 1e-4);
        assert_relative_eq!(back[2], 0.9, epsilon = 1e-4);

        pl.nodes.push(ProcessNode::Lut3D(Lut3D::identity(2).unwrap()));
        assert!(matches!(
            pl.apply_inverse([0.1; 3]),
            Err(LutError::Unsupported(_))
        ));
    }

    #[test]
    fn rejects_bad_documents() {
        let wrong_count = r#"<ProcessList id="x"><LUT1D><Array dim="4 3">0 0 0</Array></LUT1D></ProcessList>"#;
        assert!(matches!(
            parse_clf(wrong_count.as_bytes()),
            Err(LutError::ParseError(_))
        ));
        let matrix = r#"<ProcessList id="x"><Matrix><Array dim="3 3">1 0 0 0 1 0 0 0 1</Array></Matrix></ProcessList>"#;
        assert!(matches!(
            parse_clf(matrix.as_bytes()),
            Err(LutError::Unsupported(_))
        ));
        assert!(parse_clf("<Other/>".as_bytes()).is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eotf.clf");
        let mut pl = ProcessList::new("file");
        pl.nodes.push(ProcessNode::Lut1D(curve_lut()));
        write_clf(&path, &pl).unwrap();
        assert_eq!(read_clf(&path).unwrap(), pl);
    }
}
