use super::{DataSink, FeatureRow};
use anyhow::{Context, Result};
use geojson::{Feature, GeoJson};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writes one FeatureCollection, streaming features as they arrive.
pub struct GeoJsonSink {
    writer: BufWriter<File>,
    first_feature: bool,
}

impl GeoJsonSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Sink: Failed to create {}", path.display()))?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "{{")?;
        writeln!(writer, "  \"type\": \"FeatureCollection\",")?;
        writeln!(writer, "  \"features\": [")?;

        Ok(Self {
            writer,
            first_feature: true,
        })
    }
}

pub(crate) fn to_feature(row: FeatureRow) -> GeoJson {
    GeoJson::Feature(Feature {
        bbox: None,
        geometry: Some(geojson::Geometry::from(&row.geometry)),
        id: None,
        properties: Some(row.properties),
        foreign_members: None,
    })
}

impl DataSink for GeoJsonSink {
    fn add_feature(&mut self, row: FeatureRow) -> Result<()> {
        if !self.first_feature {
            writeln!(self.writer, ",")?;
        }
        self.first_feature = false;

        serde_json::to_writer(&mut self.writer, &to_feature(row))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "  ]")?;
        writeln!(self.writer, "}}")?;
        self.writer.flush()?;
        Ok(())
    }
}
