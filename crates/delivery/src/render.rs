//! CSV rendering of a [`LedgerSnapshot`].
//!
//! Each ledger becomes two files named after its key: `<key>_conteo.csv`
//! with the aggregate table and `<key>_historial.csv` with the history.

use csv::Writer;
use engine::LedgerSnapshot;

use crate::DeliveryError;

const DATE_FORMAT: &str = "%d-%m-%Y";
const TIME_FORMAT: &str = "%H:%M:%S";

const AGGREGATE_HEADERS: [&str; 4] = ["Categoría", "Conteo", "Fecha", "Ruta"];
const HISTORY_HEADERS: [&str; 7] = [
    "Fecha",
    "Hora",
    "Ruta",
    "Usuario",
    "Categoría",
    "Cantidad",
    "N° Vehículos",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Attachment {
    pub const CONTENT_TYPE: &'static str = "text/csv";
}

/// A snapshot ready to ship: who and where, plus the rendered files.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLedger {
    pub key: String,
    pub operator: String,
    pub route: String,
    pub attachments: Vec<Attachment>,
}

pub fn render(snapshot: &LedgerSnapshot) -> Result<RenderedLedger, DeliveryError> {
    let mut aggregate = Writer::from_writer(vec![]);
    write(&mut aggregate, AGGREGATE_HEADERS)?;
    for row in &snapshot.aggregate {
        let date = row
            .last_date
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default();
        let count = row.accumulated_count.to_string();
        write(
            &mut aggregate,
            [
                row.category.as_str(),
                count.as_str(),
                date.as_str(),
                row.last_route.as_deref().unwrap_or_default(),
            ],
        )?;
    }

    let mut history = Writer::from_writer(vec![]);
    write(&mut history, HISTORY_HEADERS)?;
    for entry in &snapshot.history {
        let date = entry.date.format(DATE_FORMAT).to_string();
        let time = entry.time.format(TIME_FORMAT).to_string();
        let quantity = entry.quantity.to_string();
        let running_total = entry.running_total_at_commit.to_string();
        write(
            &mut history,
            [
                date.as_str(),
                time.as_str(),
                entry.route.as_str(),
                entry.operator.as_str(),
                entry.category.as_str(),
                quantity.as_str(),
                running_total.as_str(),
            ],
        )?;
    }

    let key = snapshot.key.to_string();
    Ok(RenderedLedger {
        attachments: vec![
            Attachment {
                file_name: format!("{key}_conteo.csv"),
                bytes: finish(aggregate)?,
            },
            Attachment {
                file_name: format!("{key}_historial.csv"),
                bytes: finish(history)?,
            },
        ],
        key,
        operator: snapshot.operator.clone(),
        route: snapshot.route.clone(),
    })
}

fn write<const N: usize>(writer: &mut Writer<Vec<u8>>, record: [&str; N]) -> Result<(), DeliveryError> {
    writer
        .write_record(record)
        .map_err(|err| DeliveryError::Render(err.to_string()))
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>, DeliveryError> {
    writer
        .into_inner()
        .map_err(|err| DeliveryError::Render(err.to_string()))
}
