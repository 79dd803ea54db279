//! Writes a run's tallies to disk: one CSV row per timestep and a JSON summary of the final
//! state. These files are the hand-off to plotting and analysis tools.
use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::Path;

use csv::Writer;
use log::{info, trace};

use crate::drugs::Formulary;
use crate::error::ResistanceError;
use crate::tabulator::{FinalState, Tabulation};

// Checks that the path is valid. Creates the file and all parent directories if
// they do not exist. Returns the file if successful.
fn create_output_file(
    path: &Path,
    extension: &str,
    overwrite: bool,
) -> Result<File, ResistanceError> {
    if path.extension().and_then(OsStr::to_str) != Some(extension) {
        return Err(ResistanceError::ReportError(format!(
            "{} must be a .{extension} file",
            path.display()
        )));
    }
    if !overwrite && path.exists() {
        return Err(ResistanceError::ReportError(format!(
            "{} already exists; pass overwrite to replace it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(File::create(path)?)
}

/// Column names of the timestep report for `formulary`.
#[must_use]
pub fn timestep_header(formulary: &Formulary) -> Vec<String> {
    let mut header: Vec<String> = ["timestep", "uninfected", "immune", "dead", "isolated"]
        .into_iter()
        .map(String::from)
        .collect();
    header.extend(
        formulary
            .tiers()
            .map(|tier| format!("infected_{}", formulary.tier_name(tier))),
    );
    header
}

/// Writes every recorded timestep of `tabulation` as a CSV row.
pub fn write_timestep_csv(
    path: &Path,
    formulary: &Formulary,
    tabulation: &Tabulation,
    overwrite: bool,
) -> Result<(), ResistanceError> {
    trace!("writing timestep report to {}", path.display());
    let mut writer = Writer::from_writer(create_output_file(path, "csv", overwrite)?);
    writer.write_record(timestep_header(formulary))?;
    for row in tabulation.rows() {
        let mut record = vec![
            row.timestep.to_string(),
            row.uninfected.to_string(),
            row.immune.to_string(),
            row.dead.to_string(),
            row.isolated.to_string(),
        ];
        record.extend(row.infected_by_tier.iter().map(ToString::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    info!(
        "wrote {} timesteps to {}",
        tabulation.rows().len(),
        path.display()
    );
    Ok(())
}

pub fn write_final_state_json(
    path: &Path,
    final_state: &FinalState,
    overwrite: bool,
) -> Result<(), ResistanceError> {
    trace!("writing final state to {}", path.display());
    let file = create_output_file(path, "json", overwrite)?;
    serde_json::to_writer_pretty(file, final_state)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::parameters::Parameters;
    use tempfile::tempdir;

    fn finished_model() -> Model {
        let mut model = Model::new(&Parameters::default()).unwrap();
        model.run(5).unwrap();
        model
    }

    #[test]
    fn header_names_every_tier() {
        let config = Parameters::default().validate().unwrap();
        assert_eq!(
            timestep_header(&config.formulary),
            vec![
                "timestep",
                "uninfected",
                "immune",
                "dead",
                "isolated",
                "infected_none",
                "infected_Penicillin",
                "infected_Amoxycillin",
                "infected_Carbopenamase",
                "infected_Wonder drug",
            ]
        );
    }

    #[test]
    fn writes_one_row_per_timestep() {
        let model = finished_model();
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("timesteps.csv");
        write_timestep_csv(&path, &model.config().formulary, model.tabulation(), false).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 5);
        for (timestep, row) in rows.iter().enumerate() {
            assert_eq!(row[0].parse::<usize>().unwrap(), timestep);
            let disjoint: usize = row
                .iter()
                .enumerate()
                .filter(|(column, _)| *column != 0 && *column != 4)
                .map(|(_, value)| value.parse::<usize>().unwrap())
                .sum();
            assert_eq!(disjoint, 250);
        }
    }

    #[test]
    fn refuses_to_overwrite() {
        let model = finished_model();
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("timesteps.csv");
        let formulary = &model.config().formulary;
        write_timestep_csv(&path, formulary, model.tabulation(), false).unwrap();
        assert!(matches!(
            write_timestep_csv(&path, formulary, model.tabulation(), false),
            Err(ResistanceError::ReportError(_))
        ));
        write_timestep_csv(&path, formulary, model.tabulation(), true).unwrap();
    }

    #[test]
    fn only_csvs_allowed() {
        let model = finished_model();
        let temp_dir = tempdir().unwrap();
        let result = write_timestep_csv(
            &temp_dir.path().join("timesteps.tsv"),
            &model.config().formulary,
            model.tabulation(),
            false,
        );
        assert!(matches!(result, Err(ResistanceError::ReportError(_))));
    }

    #[test]
    fn final_state_round_trips_through_json() {
        let model = finished_model();
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("final_state.json");
        write_final_state_json(&path, &model.final_state(), false).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["deaths"], model.final_state().deaths);
        assert_eq!(value["infected_by_tier"].as_array().unwrap().len(), 5);
    }
}
