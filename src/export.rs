use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use clap::ValueEnum;
use log::info;
use serde::Serialize;

use crate::{PitwallError, request::ChartData, session::Session};

/// One row of the exported lap table.
#[derive(Debug, Serialize)]
struct LapRow<'a> {
    driver: &'a str,
    team: Option<String>,
    lap_number: u32,
    lap_time_s: Option<f64>,
    sector1_s: Option<f64>,
    sector2_s: Option<f64>,
    sector3_s: Option<f64>,
    compound: Option<String>,
    stint: Option<u32>,
    tyre_life: Option<f64>,
    pit_in: bool,
    pit_out: bool,
    position: Option<u32>,
}

fn create_file(path: &Path) -> Result<BufWriter<File>, PitwallError> {
    let file = File::create(path).map_err(|e| PitwallError::WriterError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

/// Writes chart data as pretty JSON to `output`, or to stdout when no file is given.
pub fn write_chart_json(output: Option<&PathBuf>, chart: &ChartData) -> Result<(), PitwallError> {
    match output {
        Some(path) => {
            let mut writer = create_file(path)?;
            serde_json::to_writer_pretty(&mut writer, chart)
                .map_err(|e| PitwallError::ChartSerializeError { source: e })?;
            writer.flush().map_err(|e| PitwallError::WriterError {
                path: path.clone(),
                source: e,
            })?;
            info!("Chart data written to {:?}", path);
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, chart)
                .map_err(|e| PitwallError::ChartSerializeError { source: e })?;
            writeln!(writer).map_err(|e| PitwallError::WriterError {
                path: PathBuf::from("<stdout>"),
                source: e,
            })?;
        }
    }
    Ok(())
}

/// Raw session tables that can be exported as CSV.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportTable {
    Laps,
    Results,
    PitStops,
}

fn write_rows<T, I>(output: &Path, rows: I) -> Result<usize, PitwallError>
where
    T: Serialize,
    I: IntoIterator<Item = T>,
{
    let mut writer = csv::Writer::from_writer(create_file(output)?);
    let mut count = 0;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| PitwallError::CsvError { source: e })?;
        count += 1;
    }
    writer.flush().map_err(|e| PitwallError::WriterError {
        path: output.to_path_buf(),
        source: e,
    })?;
    Ok(count)
}

/// Writes every lap of the session as CSV, in driver then lap order.
pub fn export_laps_csv(output: &Path, session: &Session) -> Result<usize, PitwallError> {
    let rows = session.drivers().into_iter().flat_map(|driver| {
        let team = session.team_of(&driver);
        session
            .laps_for(&driver)
            .into_iter()
            .map(move |lap| {
                let [sector1_s, sector2_s, sector3_s] = lap.sector_times_s;
                LapRow {
                    driver: &lap.driver,
                    team: lap.team.clone().or_else(|| team.clone()),
                    lap_number: lap.lap_number,
                    lap_time_s: lap.lap_time_s,
                    sector1_s,
                    sector2_s,
                    sector3_s,
                    compound: lap.compound.as_ref().map(|c| c.to_string()),
                    stint: lap.stint,
                    tyre_life: lap.tyre_life,
                    pit_in: lap.pit_in,
                    pit_out: lap.pit_out,
                    position: lap.position,
                }
            })
            .collect::<Vec<_>>()
    });
    let count = write_rows(output, rows)?;
    info!("Exported {} laps of {} to {:?}", count, session.info, output);
    Ok(count)
}

/// Writes one raw table of the session as CSV. Results come in finishing
/// order, pit stops as recorded.
pub fn export_table_csv(
    output: &Path,
    session: &Session,
    table: ExportTable,
) -> Result<usize, PitwallError> {
    match table {
        ExportTable::Laps => export_laps_csv(output, session),
        ExportTable::Results => {
            let count = write_rows(output, session.finishing_order())?;
            info!("Exported {} results of {} to {:?}", count, session.info, output);
            Ok(count)
        }
        ExportTable::PitStops => {
            let count = write_rows(output, &session.pit_stops)?;
            info!("Exported {} pit stops of {} to {:?}", count, session.info, output);
            Ok(count)
        }
    }
}
