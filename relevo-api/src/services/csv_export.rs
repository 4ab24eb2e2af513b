//! CSV rendering for spreadsheet export
//!
//! Comma-separated rows with double-quote escaping for fields containing
//! commas, quotes or newlines; header row carries the Spanish column names
//! the dashboards expect.

use csv::WriterBuilder;
use relevo_common::db::models::{SubstitutionPlan, SuccessionRecord};
use relevo_common::{Error, Result};

/// Render substitution plans as CSV
pub fn plans_to_csv(plans: &[SubstitutionPlan]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record([
            "Colaborador",
            "Puesto",
            "Departamento",
            "Reemplazo",
            "Puesto Clave",
            "Riesgo de Continuidad",
            "Prioridad de Sucesion",
            "Critico",
        ])
        .map_err(csv_error)?;

    for plan in plans {
        writer
            .write_record([
                plan.colaborador.as_str(),
                plan.puesto.as_str(),
                plan.departamento.as_str(),
                plan.reemplazo.as_str(),
                plan.puesto_clave.as_str(),
                plan.riesgo_continuidad.as_str(),
                plan.prioridad_sucesion.as_str(),
                plan.critico.as_str(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// Render succession records as CSV
pub fn succession_to_csv(records: &[SuccessionRecord]) -> Result<String> {
    let mut writer = WriterBuilder::new().from_writer(Vec::new());

    writer
        .write_record([
            "Colaborador",
            "Puesto",
            "Departamento",
            "Reemplazo",
            "Riesgo de Continuidad",
            "Prioridad de Sucesion",
            "Critico",
        ])
        .map_err(csv_error)?;

    for record in records {
        writer
            .write_record([
                record.colaborador.as_str(),
                record.puesto.as_str(),
                record.departamento.as_str(),
                record.reemplazo.as_str(),
                record.riesgo_continuidad.as_str(),
                record.prioridad_sucesion.as_str(),
                record.critico.as_str(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().map_err(|e| Error::Internal(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| Error::Internal(e.to_string()))
}

fn csv_error(e: csv::Error) -> Error {
    Error::Internal(format!("CSV write error: {}", e))
}
