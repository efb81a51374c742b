use crate::parcel::Parcel;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct ParcelRow {
    #[tabled(rename = "Number")]
    pub number: i64,
    #[tabled(rename = "Client")]
    pub client: i64,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Address")]
    pub address: String,
    #[tabled(rename = "Created")]
    pub created_at: String,
}

impl From<&Parcel> for ParcelRow {
    fn from(parcel: &Parcel) -> Self {
        Self {
            number: parcel.number,
            client: parcel.client,
            status: parcel.status.to_string(),
            address: parcel.address.clone(),
            created_at: parcel.created_at.clone(),
        }
    }
}

/// Render parcels as a rounded table, empty string for no parcels
pub fn parcel_table(parcels: &[Parcel]) -> String {
    if parcels.is_empty() {
        return String::new();
    }

    let rows: Vec<ParcelRow> = parcels.iter().map(ParcelRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
