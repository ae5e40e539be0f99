pub mod record;
pub mod table;

pub use record::FireRecord;
pub use table::DistrictTable;
