//! Test fixtures and temporary file handling

use std::io::Write;
use std::path::Path;

use tabsight::{Table, Value};

/// Temporary input file, deleted on drop
pub struct TempTestFile {
    file: tempfile::NamedTempFile,
}

impl TempTestFile {
    /// Create an empty file whose name ends in `.{extension}`
    pub fn new(test_name: &str, extension: &str) -> Self {
        let file = tempfile::Builder::new()
            .prefix(&format!("tabsight_test_{}_", test_name))
            .suffix(&format!(".{}", extension))
            .tempfile()
            .expect("Failed to create temporary file");
        TempTestFile { file }
    }

    /// Get the path to the temporary file
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Write `contents` to a fresh temporary file
pub fn create_test_file(test_name: &str, extension: &str, contents: &str) -> TempTestFile {
    let mut temp = TempTestFile::new(test_name, extension);
    temp.file
        .write_all(contents.as_bytes())
        .expect("Failed to write test file");
    temp.file.flush().expect("Failed to flush test file");
    temp
}

/// Helper to create a test CSV file with given data
pub fn create_test_csv(test_name: &str, headers: &[&str], rows: &[Vec<&str>]) -> TempTestFile {
    let mut contents = headers.join(",");
    contents.push('\n');
    for row in rows {
        contents.push_str(&row.join(","));
        contents.push('\n');
    }
    create_test_file(test_name, "csv", &contents)
}

/// One numeric column named `name`
pub fn single_column(name: &str, values: &[f64]) -> Table {
    Table::from_records(
        &[name],
        values.iter().map(|&v| vec![Value::from(v)]).collect(),
    )
}

/// Small equipment dataset with two categorical and three numeric columns
pub fn equipment_table() -> Table {
    let rows: Vec<(&str, &str, f64, f64, f64)> = vec![
        ("Pump-1", "Pump", 120.5, 5.2, 110.0),
        ("Pump-2", "Pump", 130.2, 5.5, 112.5),
        ("Valve-1", "Valve", 60.1, 4.1, 95.2),
        ("Valve-2", "Valve", 62.8, 4.3, 96.8),
        ("HX-1", "HeatExchanger", 150.7, 6.2, 130.1),
        ("HX-2", "HeatExchanger", 155.3, 6.4, 131.9),
        ("Pump-3", "Pump", 125.9, 5.3, 111.4),
        ("Comp-1", "Compressor", 300.5, 9.8, 140.6),
    ];
    Table::from_records(
        &["Equipment Name", "Type", "Flowrate", "Pressure", "Temperature"],
        rows.into_iter()
            .map(|(name, kind, flow, pressure, temp)| {
                vec![
                    Value::from(name),
                    Value::from(kind),
                    Value::from(flow),
                    Value::from(pressure),
                    Value::from(temp),
                ]
            })
            .collect(),
    )
}
