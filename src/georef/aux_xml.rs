//! GDAL auxiliary XML (PAM) sidecars
//!
//! A reference's `<name>.aux.xml` is parsed once into an owned event list.
//! Each tile gets a clone of that list with only the `GeoTransform` element
//! rewritten, so the cached template is never modified.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::errors::{GeoTileError, GeoTileResult};
use crate::georef::transform::Affine;

/// Root element of GDAL PAM sidecars
pub const PAM_ROOT: &str = "PAMDataset";
/// Element holding the six GDAL geotransform values
pub const GEOTRANSFORM_TAG: &str = "GeoTransform";
/// Element holding the CRS as WKT
pub const SRS_TAG: &str = "SRS";

/// Path of the auxiliary XML sidecar for an image (`<file name>.aux.xml`)
pub fn aux_xml_path(image: &Path) -> PathBuf {
    let mut path: OsString = image.as_os_str().to_owned();
    path.push(".aux.xml");
    PathBuf::from(path)
}

/// Location of a direct child of the root element
#[derive(Debug, Clone, Copy)]
struct ChildSpan {
    /// Index of the `Start` (or `Empty`) event
    start: usize,
    /// Index of the matching `End` event; `None` for `<Tag/>`
    end: Option<usize>,
}

/// Parsed XML document kept as an owned event stream
#[derive(Debug, Clone)]
pub struct AuxXmlDocument {
    events: Vec<Event<'static>>,
}

impl AuxXmlDocument {
    /// Parse XML text, keeping whitespace so the output mirrors the input
    pub fn parse(xml: &str) -> GeoTileResult<Self> {
        let mut reader = Reader::from_str(xml);
        let mut events = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Eof) => break,
                Ok(event) => events.push(event.into_owned()),
                Err(e) => {
                    return Err(GeoTileError::XmlError(format!(
                        "{} at position {}",
                        e,
                        reader.buffer_position()
                    )))
                }
            }
        }

        let document = AuxXmlDocument { events };
        if document.root_index().is_none() {
            return Err(GeoTileError::XmlError("document has no root element".to_string()));
        }
        Ok(document)
    }

    /// Read and parse a PAM sidecar, rejecting unexpected root elements
    pub fn load(path: &Path) -> GeoTileResult<Self> {
        let content = fs::read_to_string(path)?;
        let document = Self::parse(&content)?;

        let root = document.root_name().unwrap_or_default();
        if root != PAM_ROOT {
            return Err(GeoTileError::UnexpectedRootTag {
                path: path.to_path_buf(),
                found: root,
            });
        }
        Ok(document)
    }

    fn root_index(&self) -> Option<usize> {
        self.events
            .iter()
            .position(|event| matches!(event, Event::Start(_) | Event::Empty(_)))
    }

    /// Name of the root element
    pub fn root_name(&self) -> Option<String> {
        match self.events.get(self.root_index()?)? {
            Event::Start(e) | Event::Empty(e) => {
                Some(String::from_utf8_lossy(e.name().as_ref()).into_owned())
            }
            _ => None,
        }
    }

    /// Find the first direct child of the root with the given tag
    fn find_child(&self, tag: &str) -> Option<ChildSpan> {
        let root = self.root_index()?;
        let mut depth = 0usize;
        let mut open: Option<usize> = None;

        for (index, event) in self.events.iter().enumerate().skip(root + 1) {
            match event {
                Event::Start(e) => {
                    if depth == 0 && e.name().as_ref() == tag.as_bytes() {
                        open = Some(index);
                    }
                    depth += 1;
                }
                Event::Empty(e) => {
                    if depth == 0 && e.name().as_ref() == tag.as_bytes() {
                        return Some(ChildSpan { start: index, end: None });
                    }
                }
                Event::End(_) => {
                    if depth == 0 {
                        // closing tag of the root
                        return None;
                    }
                    depth -= 1;
                    if depth == 0 {
                        if let Some(start) = open {
                            return Some(ChildSpan { start, end: Some(index) });
                        }
                    }
                }
                _ => {}
            }
        }
        None
    }

    /// Text content of a direct child of the root (entities unescaped)
    ///
    /// Returns `None` when the element is absent. Nested elements are ignored.
    pub fn child_text(&self, tag: &str) -> GeoTileResult<Option<String>> {
        let span = match self.find_child(tag) {
            Some(span) => span,
            None => return Ok(None),
        };
        let end = match span.end {
            Some(end) => end,
            None => return Ok(Some(String::new())),
        };

        let mut text = String::new();
        for event in &self.events[span.start + 1..end] {
            match event {
                Event::Text(t) => {
                    let unescaped = t
                        .unescape()
                        .map_err(|e| GeoTileError::XmlError(format!("bad text in <{}>: {}", tag, e)))?;
                    text.push_str(&unescaped);
                }
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(c)),
                _ => {}
            }
        }
        Ok(Some(text))
    }

    /// Replace the `GeoTransform` text, creating the element if needed
    ///
    /// A new element goes directly after `SRS` when present, otherwise it
    /// becomes the first child of the root.
    pub fn set_geo_transform(&mut self, value: &str) -> GeoTileResult<()> {
        let text = Event::Text(BytesText::new(value).into_owned());

        if let Some(span) = self.find_child(GEOTRANSFORM_TAG) {
            match span.end {
                Some(end) => {
                    self.events.splice(span.start + 1..end, [text]);
                }
                None => {
                    self.events.splice(span.start..span.start + 1, geo_transform_element(text));
                }
            }
            return Ok(());
        }

        if let Some(srs) = self.find_child(SRS_TAG) {
            let after = srs.end.unwrap_or(srs.start) + 1;
            let mut inserted = Vec::new();
            if let Some(indent) = srs.start.checked_sub(1).and_then(|i| self.whitespace_at(i)) {
                inserted.push(indent);
            }
            inserted.extend(geo_transform_element(text));
            self.events.splice(after..after, inserted);
            return Ok(());
        }

        let root = self
            .root_index()
            .ok_or_else(|| GeoTileError::XmlError("document has no root element".to_string()))?;

        if let Event::Empty(e) = &self.events[root] {
            let start = e.clone().into_owned();
            let end = BytesEnd::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
            self.events.splice(root..root + 1, [Event::Start(start), Event::End(end)]);
        }

        match self.whitespace_at(root + 1) {
            Some(indent) => {
                let mut inserted = geo_transform_element(text);
                inserted.push(indent);
                self.events.splice(root + 2..root + 2, inserted);
            }
            None => {
                self.events.splice(root + 1..root + 1, geo_transform_element(text));
            }
        }
        Ok(())
    }

    /// Clone of a whitespace-only text event at `index`
    fn whitespace_at(&self, index: usize) -> Option<Event<'static>> {
        match self.events.get(index)? {
            Event::Text(t) if t.iter().all(|b| b.is_ascii_whitespace()) => {
                Some(Event::Text(t.clone().into_owned()))
            }
            _ => None,
        }
    }

    /// Serialize without the XML declaration
    pub fn to_xml_string(&self) -> GeoTileResult<String> {
        let root = self.root_index().unwrap_or(0);
        let mut writer = Writer::new(Vec::new());

        for (index, event) in self.events.iter().enumerate() {
            let skip = match event {
                Event::Decl(_) => true,
                Event::Text(t) if index < root => t.iter().all(|b| b.is_ascii_whitespace()),
                _ => false,
            };
            if skip {
                continue;
            }

            writer
                .write_event(event.clone())
                .map_err(|e| GeoTileError::XmlError(format!("failed to write XML: {}", e)))?;
        }

        String::from_utf8(writer.into_inner())
            .map_err(|e| GeoTileError::XmlError(format!("serialized XML is not UTF-8: {}", e)))
    }

    /// Serialize to `path`, replacing any existing file
    pub fn write_to(&self, path: &Path) -> GeoTileResult<()> {
        debug!("Writing auxiliary XML {}", path.display());
        fs::write(path, self.to_xml_string()?)?;
        Ok(())
    }
}

fn geo_transform_element(text: Event<'static>) -> Vec<Event<'static>> {
    vec![
        Event::Start(BytesStart::new(GEOTRANSFORM_TAG)),
        text,
        Event::End(BytesEnd::new(GEOTRANSFORM_TAG)),
    ]
}

/// Reference georeferencing taken from a PAM sidecar, used as a per-tile template
#[derive(Debug, Clone)]
pub struct AuxXmlReference {
    /// The sidecar the template was read from
    pub sidecar: PathBuf,
    /// Parsed sidecar, cloned for every tile
    pub template: AuxXmlDocument,
    /// The reference's geotransform
    pub transform: Affine,
}

impl AuxXmlReference {
    /// Load `<reference>.aux.xml`
    ///
    /// # Arguments
    /// * `reference` - Path of the reference image
    ///
    /// # Returns
    /// The template and transform, or an error if the sidecar is missing,
    /// has an unexpected root, or lacks a usable `GeoTransform`
    pub fn load(reference: &Path) -> GeoTileResult<Self> {
        let sidecar = aux_xml_path(reference);
        let template = AuxXmlDocument::load(&sidecar)?;

        let text = template
            .child_text(GEOTRANSFORM_TAG)?
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| GeoTileError::MissingTransform(sidecar.clone()))?;
        let transform = Affine::parse_gdal_text(&text)?;

        debug!("Loaded template {} with transform {:?}", sidecar.display(), transform);
        Ok(AuxXmlReference {
            sidecar,
            template,
            transform,
        })
    }

    /// Write `<tile file name>.aux.xml` for a tile with the given transform
    ///
    /// Returns the path written.
    pub fn write_tile_sidecar(&self, tile: &Path, transform: &Affine) -> GeoTileResult<PathBuf> {
        let mut document = self.template.clone();
        document.set_geo_transform(&transform.to_gdal_text())?;

        let path = aux_xml_path(tile);
        document.write_to(&path)?;
        Ok(path)
    }
}
