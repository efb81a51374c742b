pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, header, info, section, status_label, success, summary_row, warn};
pub use table::{parcel_table, ParcelRow};
pub use theme::{theme, Theme};
