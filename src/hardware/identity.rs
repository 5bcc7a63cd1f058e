//! Hardware identity key: `<vendor code>-<serial>`, the API's addressing key.

use tracing::debug;

use crate::error::IdentityError;
use crate::hardware::context::RunContext;
use crate::parsers::fields;

/// Serial that some Supermicro BIOSes report for every board.
pub const BROKEN_SERIAL: &str = "0123456789";

pub const UNKNOWN_VENDOR_CODE: &str = "UKN";

/// Short code for a manufacturer string; exact match after dropping spaces
/// and periods (`Dell Inc.` -> `DellInc`).
pub fn vendor_code(vendor: &str) -> &'static str {
    let normalized: String = vendor
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '.')
        .collect();
    match normalized.as_str() {
        "DellInc" => "DEL",
        "Supermicro" => "SPM",
        _ => UNKNOWN_VENDOR_CODE,
    }
}

fn usable_serial(serial: Option<String>) -> Option<String> {
    serial.filter(|s| s != BROKEN_SERIAL && !s.eq_ignore_ascii_case("unknown"))
}

/// Derive the identity key. First match wins for both vendor and serial.
pub fn derive_sku(ctx: &mut RunContext) -> Result<String, IdentityError> {
    let vendor = ctx
        .read_dmi("baseboard-manufacturer")
        .or_else(|| ctx.read_dmi("system-manufacturer"))
        .unwrap_or_else(|| "Unknown".to_string());

    let serial = usable_serial(ctx.read_dmi("baseboard-serial-number"))
        .or_else(|| usable_serial(ctx.read_dmi("system-serial-number")))
        .or_else(|| usable_serial(fields::field_token(ctx.ipmi_fru(), "Board Serial")))
        .ok_or(IdentityError::NoSerial)?;

    let sku = format_sku(vendor_code(&vendor), &serial);
    debug!(%vendor, %sku, "derived identity key");
    Ok(sku)
}

/// `{code}-{serial}` with periods and whitespace removed.
pub fn format_sku(code: &str, serial: &str) -> String {
    format!("{}-{}", code, serial)
        .chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect()
}
