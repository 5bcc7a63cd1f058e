// Decoders for the raw text each system tool prints
pub mod dhcp;
pub mod dmidecode;
pub mod fields;
pub mod lldp;
pub mod lshw;

pub use dmidecode::DmiTables;
pub use lshw::LshwReport;
