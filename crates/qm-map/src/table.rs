//! Plain-text lookup tables
//!
//! One row per grid point, columns separated by a single space (loadable
//! with `numpy.loadtxt`) or a comma. A leading `#` line names the columns.
//! Values are written with the shortest representation that parses back to
//! the same `f64`.

use crate::qq_map::QqMap;
use qm_core::{Error, QuantileBand, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::debug;

/// Column layout of a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `input nominal down up`
    Correction,
    /// `X Y Xlow Xup Ylow Yup`
    QqMap,
}

impl Layout {
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Layout::Correction => &["input", "nominal", "down", "up"],
            Layout::QqMap => &["X", "Y", "Xlow", "Xup", "Ylow", "Yup"],
        }
    }

    pub fn width(&self) -> usize {
        self.columns().len()
    }
}

/// Field separator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Space,
    Comma,
}

impl Delimiter {
    fn byte(&self) -> u8 {
        match self {
            Delimiter::Space => b' ',
            Delimiter::Comma => b',',
        }
    }
}

/// Column-major table of `f64` values
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    layout: Layout,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Correction table: input values and the corrected band
    pub fn correction(input: &[f64], band: &QuantileBand) -> Result<Self> {
        if input.len() != band.len() {
            return Err(Error::size_mismatch(input.len(), band.len(), "correction table"));
        }
        Ok(Self {
            layout: Layout::Correction,
            columns: vec![
                input.to_vec(),
                band.nominal().to_vec(),
                band.down().to_vec(),
                band.up().to_vec(),
            ],
        })
    }

    /// Correction table of a map with Y uncertainty only
    pub fn correction_from_qq_map(map: &QqMap) -> Result<Self> {
        Self::correction(map.x(), map.y_band())
    }

    /// Six-column table of a map with uncertainty on both axes
    pub fn from_qq_map(map: &QqMap) -> Self {
        Self {
            layout: Layout::QqMap,
            columns: vec![
                map.x().to_vec(),
                map.y().to_vec(),
                map.x_low().to_vec(),
                map.x_up().to_vec(),
                map.y_low().to_vec(),
                map.y_up().to_vec(),
            ],
        }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Column by name, as listed in [`Layout::columns`]
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.layout
            .columns()
            .iter()
            .position(|c| *c == name)
            .map(|i| self.columns[i].as_slice())
    }

    /// `(input, band)` of a correction table
    pub fn into_correction(self) -> Result<(Vec<f64>, QuantileBand)> {
        if self.layout != Layout::Correction {
            return Err(Error::Table(
                "expected a correction table (input nominal down up)".to_string(),
            ));
        }
        let mut cols = self.columns.into_iter();
        let mut next = || cols.next().unwrap_or_default();
        let (input, nominal, down, up) = (next(), next(), next(), next());
        Ok((input, QuantileBand::new(nominal, down, up)?))
    }

    /// `(x_band, y_band)` of a q-q map table
    pub fn into_qq_bands(self) -> Result<(QuantileBand, QuantileBand)> {
        if self.layout != Layout::QqMap {
            return Err(Error::Table(
                "expected a q-q map table (X Y Xlow Xup Ylow Yup)".to_string(),
            ));
        }
        let mut cols = self.columns.into_iter();
        let mut next = || cols.next().unwrap_or_default();
        let (x, y, x_low, x_up, y_low, y_up) = (next(), next(), next(), next(), next(), next());
        Ok((
            QuantileBand::new(x, x_low, x_up)?,
            QuantileBand::new(y, y_low, y_up)?,
        ))
    }

    /// Write the table with a `#` header line
    pub fn write<W: Write>(&self, writer: W, delimiter: Delimiter) -> Result<()> {
        let mut writer = writer;
        let sep = if delimiter == Delimiter::Space { " " } else { "," };
        writeln!(writer, "# {}", self.layout.columns().join(sep))?;

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(delimiter.byte())
            .has_headers(false)
            .from_writer(writer);
        for row in 0..self.len() {
            wtr.write_record(self.columns.iter().map(|c| c[row].to_string()))
                .map_err(table_error)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Read a table, detecting the delimiter; `#` lines are skipped
    pub fn read<R: Read>(reader: R, layout: Layout) -> Result<Self> {
        let mut text = String::new();
        let mut reader = reader;
        reader.read_to_string(&mut text)?;

        let delimiter = text
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'))
            .map_or(Delimiter::Space, |l| {
                if l.contains(',') {
                    Delimiter::Comma
                } else {
                    Delimiter::Space
                }
            });

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter.byte())
            .comment(Some(b'#'))
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let width = layout.width();
        let mut columns = vec![Vec::new(); width];
        for (line, record) in rdr.records().enumerate() {
            let record = record.map_err(table_error)?;
            let fields: Vec<&str> = record.iter().filter(|f| !f.is_empty()).collect();
            if fields.is_empty() {
                continue;
            }
            if fields.len() != width {
                return Err(Error::Table(format!(
                    "record {} has {} fields, expected {} ({})",
                    line + 1,
                    fields.len(),
                    width,
                    layout.columns().join(" ")
                )));
            }
            for (column, field) in columns.iter_mut().zip(&fields) {
                let value = field.parse::<f64>().map_err(|e| {
                    Error::Table(format!("record {}: cannot parse '{field}': {e}", line + 1))
                })?;
                column.push(value);
            }
        }
        debug!("Read {} rows of a {:?} table", columns[0].len(), layout);
        Ok(Self { layout, columns })
    }

    pub fn save<P: AsRef<Path>>(&self, path: P, delimiter: Delimiter) -> Result<()> {
        let file = File::create(path)?;
        self.write(BufWriter::new(file), delimiter)
    }

    pub fn load<P: AsRef<Path>>(path: P, layout: Layout) -> Result<Self> {
        let file = File::open(path)?;
        Self::read(BufReader::new(file), layout)
    }
}

fn table_error(e: csv::Error) -> Error {
    let message = e.to_string();
    match e.into_kind() {
        csv::ErrorKind::Io(io) => Error::Io(io),
        _ => Error::Table(message),
    }
}

/// Write `X Y Xlow Xup Ylow Yup` for `map` to `writer`
pub fn write_qq_map<W: io::Write>(map: &QqMap, writer: W, delimiter: Delimiter) -> Result<()> {
    Table::from_qq_map(map).write(writer, delimiter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{QqMapConfig, Uncertainty};

    fn awkward_values() -> Vec<f64> {
        vec![0.1, -1.0 / 3.0, 1e-300, 12345.678901234567, -0.0]
    }

    #[test]
    fn test_correction_round_trip_space_and_comma() {
        let input = awkward_values();
        let nominal: Vec<f64> = input.iter().map(|v| v * 2.0).collect();
        let down: Vec<f64> = nominal.iter().map(|v| v - 0.25).collect();
        let up: Vec<f64> = nominal.iter().map(|v| v + 0.5).collect();
        let band = QuantileBand::new(nominal, down, up).unwrap();
        let table = Table::correction(&input, &band).unwrap();

        for delimiter in [Delimiter::Space, Delimiter::Comma] {
            let mut buf = Vec::new();
            table.write(&mut buf, delimiter).unwrap();
            let back = Table::read(buf.as_slice(), Layout::Correction).unwrap();
            assert_eq!(back, table);
            let (input_back, band_back) = back.into_correction().unwrap();
            assert_eq!(input_back, input);
            assert_eq!(band_back, band);
        }
    }

    #[test]
    fn test_header_and_layout() {
        let band = QuantileBand::point(vec![1.0, 2.0]);
        let table = Table::correction(&[0.5, 1.5], &band).unwrap();
        let mut buf = Vec::new();
        table.write(&mut buf, Delimiter::Space).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "# input nominal down up\n0.5 1 1 1\n1.5 2 2 2\n");
        assert_eq!(table.column("down"), Some(&[1.0, 2.0][..]));
        assert_eq!(table.column("Xlow"), None);
    }

    #[test]
    fn test_reads_headerless_numpy_output() {
        let text = "1.000000000000000000e+00 2.000000000000000000e+00 1.5e+00 2.5e+00\n\
                    3.0 4.0 3.5 4.5\n";
        let table = Table::read(text.as_bytes(), Layout::Correction).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("input"), Some(&[1.0, 3.0][..]));
    }

    #[test]
    fn test_bad_records() {
        assert!(matches!(
            Table::read("1 2 3\n".as_bytes(), Layout::Correction),
            Err(Error::Table(_))
        ));
        assert!(matches!(
            Table::read("1 2 x 4\n".as_bytes(), Layout::Correction),
            Err(Error::Table(_))
        ));
        let table = Table::read("1 2 1 3\n".as_bytes(), Layout::Correction).unwrap();
        assert!(matches!(table.into_qq_bands(), Err(Error::Table(_))));
    }

    #[test]
    fn test_qq_map_round_trip() {
        let simul: Vec<f64> = (0..200).map(|i| (i as f64 * 0.37).sin()).collect();
        let data: Vec<f64> = (0..200).map(|i| (i as f64 * 0.11).cos() * 2.0).collect();
        let config = QqMapConfig::new()
            .with_range(5.0, 95.0)
            .with_points(12)
            .with_uncertainty(Uncertainty::analytic());
        let map = QqMap::build(&simul, &data, &config).unwrap();

        let mut buf = Vec::new();
        write_qq_map(&map, &mut buf, Delimiter::Comma).unwrap();
        let (x, y) = Table::read(buf.as_slice(), Layout::QqMap)
            .unwrap()
            .into_qq_bands()
            .unwrap();
        assert_eq!(&x, map.x_band());
        assert_eq!(&y, map.y_band());
    }
}
