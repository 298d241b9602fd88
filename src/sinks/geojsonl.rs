use super::geojson::to_feature;
use super::{DataSink, FeatureRow};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One GeoJSON Feature per line.
pub struct GeoJsonlSink {
    writer: BufWriter<Box<dyn Write + Send>>,
}

impl GeoJsonlSink {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)
            .with_context(|| format!("Sink: Failed to create {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(Box::new(file)),
        })
    }

    pub fn stdout() -> Result<Self> {
        Ok(Self {
            writer: BufWriter::new(Box::new(std::io::stdout())),
        })
    }
}

impl DataSink for GeoJsonlSink {
    fn add_feature(&mut self, row: FeatureRow) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &to_feature(row))?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Point;
    use serde_json::{Map, Value};
    use tempfile::NamedTempFile;

    #[test]
    fn writes_one_feature_per_line() {
        let temp_file = NamedTempFile::with_suffix(".geojsonl").unwrap();
        let mut sink = GeoJsonlSink::new(temp_file.path()).unwrap();

        for id in 1..=2 {
            let mut properties = Map::new();
            properties.insert("id".to_string(), Value::from(id));
            sink.add_feature(FeatureRow {
                geometry: geo_types::Geometry::Point(Point::new(0.0, 0.0)),
                properties,
            })
            .unwrap();
        }
        sink.finish().unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let second: Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["type"], "Feature");
        assert_eq!(second["properties"]["id"], 2);
    }
}
