//! Recording of output samples and CSV serialization.

use fmu::{Common as _, Model, ModelInstance};

use crate::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub time: f64,
    pub values: Vec<f64>,
}

/// Sampled outputs of a simulation run, one row per recorded point.
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    /// Column names, starting with `time`.
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
}

impl Recording {
    pub fn new<M: Model>() -> Self {
        let columns = std::iter::once("time")
            .chain(M::output_names().iter().copied())
            .map(str::to_string)
            .collect();
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append the instance's current outputs as a new row.
    pub fn sample<M: Model>(&mut self, inst: &mut ModelInstance<M>) -> Result<(), Error> {
        let mut values = vec![0.0; M::output_names().len()];
        inst.get_outputs(&mut values)?;
        self.rows.push(Row {
            time: inst.time(),
            values,
        });
        Ok(())
    }

    pub fn last(&self) -> Option<&Row> {
        self.rows.last()
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<(), Error> {
        let mut writer = csv::Writer::from_writer(writer);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(
                std::iter::once(row.time.to_string())
                    .chain(row.values.iter().map(f64::to_string)),
            )?;
        }
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}
