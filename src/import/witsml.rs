//! WITSML 1.4.1.1 trajectory import
//!
//! Reads every `<trajectoryStation>` in document order and keeps its `md`,
//! `incl` and `azi` children. Unit-of-measure attributes are honoured for
//! the common cases: `rad` angles become degrees and `m` depths become feet.
//! Other station children (tvd, dls, quality data) are ignored; the
//! trajectory engine recomputes them.

use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::{read_to_string, ImportError};
use crate::types::RawSurveyPoint;

const FEET_PER_METER: f64 = 3.280_839_895;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StationField {
    Md,
    Incl,
    Azi,
}

impl StationField {
    fn from_tag(name: &[u8]) -> Option<Self> {
        match name {
            b"md" => Some(Self::Md),
            b"incl" => Some(Self::Incl),
            b"azi" => Some(Self::Azi),
            _ => None,
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Incl => "incl",
            Self::Azi => "azi",
        }
    }

    /// Scale from the declared unit to feet or degrees.
    fn scale(self, uom: Option<&str>) -> f64 {
        match (self, uom) {
            (Self::Md, Some("m")) => FEET_PER_METER,
            (Self::Incl | Self::Azi, Some("rad")) => 180.0 / std::f64::consts::PI,
            _ => 1.0,
        }
    }
}

#[derive(Debug, Default)]
struct StationBuilder {
    md: Option<f64>,
    incl: Option<f64>,
    azi: Option<f64>,
}

impl StationBuilder {
    fn set(&mut self, field: StationField, value: f64) {
        match field {
            StationField::Md => self.md = Some(value),
            StationField::Incl => self.incl = Some(value),
            StationField::Azi => self.azi = Some(value),
        }
    }

    fn finish(self) -> Result<RawSurveyPoint, ImportError> {
        Ok(RawSurveyPoint::new(
            self.md.ok_or(ImportError::MissingColumn("md"))?,
            self.incl.ok_or(ImportError::MissingColumn("incl"))?,
            self.azi.ok_or(ImportError::MissingColumn("azi"))?,
        ))
    }
}

fn uom_of(tag: &BytesStart<'_>) -> Result<Option<String>, ImportError> {
    let attr = tag.try_get_attribute("uom").map_err(quick_xml::Error::from)?;
    match attr {
        Some(a) => Ok(Some(a.unescape_value()?.into_owned())),
        None => Ok(None),
    }
}

fn line_at(xml: &str, offset: usize) -> u64 {
    let end = offset.min(xml.len());
    xml.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() as u64 + 1
}

/// Parse a WITSML trajectory document into raw survey points.
pub fn parse_witsml_trajectory(xml: &str) -> Result<Vec<RawSurveyPoint>, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut points = Vec::new();
    let mut station: Option<StationBuilder> = None;
    let mut field: Option<(StationField, f64)> = None;

    loop {
        match reader.read_event()? {
            Event::Start(tag) => {
                let name = tag.local_name();
                if name.as_ref() == b"trajectoryStation" {
                    station = Some(StationBuilder::default());
                } else if station.is_some() {
                    field = match StationField::from_tag(name.as_ref()) {
                        Some(f) => Some((f, f.scale(uom_of(&tag)?.as_deref()))),
                        None => None,
                    };
                }
            }
            Event::Text(text) => {
                if let (Some((f, scale)), Some(builder)) = (field, station.as_mut()) {
                    let raw = text.unescape()?;
                    let value = raw.trim().parse::<f64>().map_err(|_| ImportError::InvalidValue {
                        line: line_at(xml, reader.buffer_position()),
                        field: f.label(),
                        value: raw.to_string(),
                    })?;
                    builder.set(f, value * scale);
                }
            }
            Event::End(tag) => {
                if tag.local_name().as_ref() == b"trajectoryStation" {
                    if let Some(builder) = station.take() {
                        points.push(builder.finish()?);
                    }
                }
                field = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    debug!(stations = points.len(), "Parsed WITSML trajectory");
    Ok(points)
}

/// Read and parse a WITSML trajectory file.
pub fn read_witsml_file(path: &Path) -> Result<Vec<RawSurveyPoint>, ImportError> {
    parse_witsml_trajectory(&read_to_string(path)?)
}
